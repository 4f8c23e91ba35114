//! # Media Library Module
//!
//! Owns the feed's view of the media collection.
//!
//! ## Overview
//!
//! This module manages:
//! - The [`MediaItem`] model shared by every media source
//! - Content manifest parsing (`media-list.json`, envelope and legacy forms)
//! - A settings-backed snapshot of the last loaded media list
//! - The likes list

pub mod error;
pub mod likes;
pub mod manifest;
pub mod models;
pub mod snapshot;

pub use error::{LibraryError, Result};
pub use likes::{LikesStore, LIKED_MEDIA_KEY};
pub use manifest::{content_url, ContentManifest, ManifestEntry, ManifestLoader};
pub use models::{LikedMedia, MediaItem, MediaKind};
pub use snapshot::ManifestSnapshotStore;
