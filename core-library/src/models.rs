//! Domain models for the media feed
//!
//! A [`MediaItem`] is the unit every source produces (local manifest, cloud
//! drive) and every consumer reads (feed, grid, cache prefetcher). The serde
//! shape matches the JSON the web app has always persisted, so snapshots and
//! likes written by older builds stay readable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse media classification derived from the MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
    Other,
}

impl MediaKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type.starts_with("video/") {
            MediaKind::Video
        } else if mime_type.starts_with("image/") {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }
}

/// A photo or video shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
    /// Size in bytes as a decimal string, the way drive listings report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub is_video: bool,
    pub is_image: bool,
}

impl MediaItem {
    /// Create an item with the video/image flags derived from `mime_type`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        let kind = MediaKind::from_mime(&mime_type);
        Self {
            id: id.into(),
            name: name.into(),
            is_video: kind == MediaKind::Video,
            is_image: kind == MediaKind::Image,
            mime_type,
            thumbnail_link: None,
            web_content_link: None,
            web_view_link: None,
            modified_time: None,
            size: None,
        }
    }

    /// Point content, view and thumbnail links at the same URL.
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        let link = link.into();
        self.thumbnail_link = Some(link.clone());
        self.web_content_link = Some(link.clone());
        self.web_view_link = Some(link);
        self
    }

    pub fn with_modified_time(mut self, modified_time: impl Into<String>) -> Self {
        self.modified_time = Some(modified_time.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn kind(&self) -> MediaKind {
        if self.is_video {
            MediaKind::Video
        } else if self.is_image {
            MediaKind::Image
        } else {
            MediaKind::Other
        }
    }

    /// URL of the full media payload.
    pub fn media_url(&self) -> Option<&str> {
        self.web_content_link
            .as_deref()
            .or(self.web_view_link.as_deref())
    }

    /// URL of the preview image, if the source provides one.
    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_link.as_deref()
    }

    /// Parsed byte size, `None` when missing or not a number.
    pub fn size_bytes(&self) -> Option<u64> {
        self.size.as_deref().and_then(|s| s.parse().ok())
    }
}

/// A liked item as persisted in the likes list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedMedia {
    pub id: String,
    pub liked_at: DateTime<Utc>,
}
