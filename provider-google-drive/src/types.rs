//! Google Drive API response types
//!
//! Data structures for deserializing Google Drive API v3 responses.

use core_library::MediaItem;
use serde::{Deserialize, Serialize};

/// MIME type Drive uses for folders
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Google Drive API file resource
///
/// See: https://developers.google.com/drive/api/v3/reference/files#resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    /// File ID
    pub id: String,

    /// File name
    pub name: String,

    /// MIME type
    #[serde(default)]
    pub mime_type: String,

    /// Short-lived thumbnail URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_link: Option<String>,

    /// Download URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_content_link: Option<String>,

    /// Browser view URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_view_link: Option<String>,

    /// Modification time (RFC 3339)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,

    /// File size in bytes (omitted for folders and native docs)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl DriveFile {
    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME_TYPE
    }

    /// Images and videos are the only files the feed shows.
    pub fn is_media(&self) -> bool {
        self.mime_type.starts_with("image/") || self.mime_type.starts_with("video/")
    }
}

impl From<DriveFile> for MediaItem {
    fn from(file: DriveFile) -> Self {
        let mut item = MediaItem::new(file.id, file.name, file.mime_type);
        item.thumbnail_link = file.thumbnail_link;
        item.web_content_link = file.web_content_link;
        item.web_view_link = file.web_view_link;
        item.modified_time = file.modified_time;
        item.size = Some(file.size.unwrap_or_else(|| "0".to_string()));
        item
    }
}

/// Google Drive API files.list response
///
/// See: https://developers.google.com/drive/api/v3/reference/files/list
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesListResponse {
    /// List of files
    #[serde(default)]
    pub files: Vec<DriveFile>,

    /// Token for next page
    pub next_page_token: Option<String>,

    /// Whether there are more results
    #[serde(default)]
    pub incomplete_search: bool,
}
