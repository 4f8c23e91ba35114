//! Workspace umbrella crate.
//!
//! Exposes the `desktop-shims` and `wasm` features that map onto
//! `core-service`, so host applications can depend on `reels-workspace` and
//! pick a bridge stack with a single feature flag.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;

#[cfg(all(feature = "wasm", not(feature = "desktop-shims")))]
pub use core_service::*;
