//! # Google Drive Provider
//!
//! Media listing for the feed from Google Drive API v3.
//!
//! ## Overview
//!
//! This module provides:
//! - Folder lookup by name (default `MentalBiriyani`)
//! - Paginated image/video listing, newest first
//! - Single-file metadata
//! - Rate limiting and exponential backoff
//!
//! Authentication lives in the host; this crate only sends the bearer token
//! it is given.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{GoogleDriveMediaSource, DEFAULT_FOLDER_NAME};
pub use error::{GoogleDriveError, Result};
pub use types::{DriveFile, FilesListResponse};
