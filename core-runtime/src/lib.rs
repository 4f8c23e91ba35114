//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the reels media core:
//! - Logging and tracing bootstrap
//! - Configuration management (`CoreConfig` builder)
//!
//! ## Overview
//!
//! Every other crate logs through `tracing`; this crate decides where those
//! events go (stdout via `tracing-subscriber` natively, the browser console
//! via `tracing-wasm`) and collects the host bridges the core is built from.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
