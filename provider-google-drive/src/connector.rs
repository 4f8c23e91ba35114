//! Google Drive API connector implementation
//!
//! Lists the image and video files the feed shows, using Google Drive API v3.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use core_library::MediaItem;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::error::{GoogleDriveError, Result};
use crate::types::{DriveFile, FilesListResponse, FOLDER_MIME_TYPE};

/// Google Drive API base URL
const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";

/// Maximum results per page (Google Drive API limit)
const MAX_PAGE_SIZE: u32 = 1000;

/// Folder the feed reads from unless told otherwise
pub const DEFAULT_FOLDER_NAME: &str = "MentalBiriyani";

/// Fields to request for file resources
const FILE_FIELDS: &str =
    "id,name,mimeType,thumbnailLink,webContentLink,webViewLink,modifiedTime,size";

const MEDIA_QUERY: &str = "(mimeType contains 'image/' or mimeType contains 'video/')";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Google Drive media source
///
/// # Features
///
/// - Paginated listing filtered to image and video MIME types
/// - Folder lookup by name
/// - Exponential backoff for rate limiting and server errors
/// - Bearer-token authentication supplied by the host
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveMediaSource;
///
/// let drive = GoogleDriveMediaSource::new(http_client, access_token);
/// if let Some(folder) = drive.find_default_folder().await? {
///     let items = drive.fetch_all_media(&folder).await?;
/// }
/// ```
pub struct GoogleDriveMediaSource {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// OAuth 2.0 access token with `drive.readonly` scope
    access_token: String,

    retry_policy: RetryPolicy,
}

impl GoogleDriveMediaSource {
    pub fn new(http_client: Arc<dyn HttpClient>, access_token: impl Into<String>) -> Self {
        Self {
            http_client,
            access_token: access_token.into(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Direct download URL for a file, authenticated by query parameter.
    ///
    /// The URL embeds the access token; log it only through
    /// `core_runtime::logging::redact_url`.
    pub fn direct_media_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}?alt=media&access_token={}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            urlencoding::encode(&self.access_token)
        )
    }

    /// One page of media files, newest first.
    ///
    /// Restricted to `folder_id` when given.
    #[instrument(skip(self))]
    pub async fn list_media(
        &self,
        folder_id: Option<&str>,
        page_token: Option<&str>,
    ) -> Result<(Vec<MediaItem>, Option<String>)> {
        let query = match folder_id {
            Some(folder) => format!(
                "'{}' in parents and {} and trashed=false",
                escape_query_value(folder),
                MEDIA_QUERY
            ),
            None => format!("{} and trashed=false", MEDIA_QUERY),
        };

        let mut url = format!(
            "{}/files?q={}&pageSize={}&orderBy={}&fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(&query),
            MAX_PAGE_SIZE,
            urlencoding::encode("modifiedTime desc"),
            urlencoding::encode(&format!("nextPageToken,files({})", FILE_FIELDS))
        );
        if let Some(token) = page_token {
            url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
        }

        let list: FilesListResponse = self.get_json(url).await?;
        let items: Vec<MediaItem> = list
            .files
            .into_iter()
            .filter(DriveFile::is_media)
            .map(MediaItem::from)
            .collect();

        debug!("Listed {} media files", items.len());
        Ok((items, list.next_page_token))
    }

    /// Every media file in `folder_id`, following page tokens to the end.
    #[instrument(skip(self))]
    pub async fn fetch_all_media(&self, folder_id: &str) -> Result<Vec<MediaItem>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let (page, next) = self
                .list_media(Some(folder_id), page_token.as_deref())
                .await?;
            items.extend(page);

            match next {
                Some(token) if page_token.as_deref() != Some(token.as_str()) => {
                    page_token = Some(token)
                }
                _ => break,
            }
        }

        info!("Fetched {} media files from Google Drive", items.len());
        Ok(items)
    }

    /// ID of the first folder named exactly `name`.
    #[instrument(skip(self))]
    pub async fn find_folder(&self, name: &str) -> Result<Option<String>> {
        let query = format!(
            "name='{}' and mimeType='{}' and trashed=false",
            escape_query_value(name),
            FOLDER_MIME_TYPE
        );
        let url = format!(
            "{}/files?q={}&pageSize=1&fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(&query),
            urlencoding::encode("files(id,name,mimeType)")
        );

        let list: FilesListResponse = self.get_json(url).await?;
        let folder = list.files.into_iter().next().map(|f| f.id);
        if folder.is_none() {
            info!("Folder {} not found", name);
        }
        Ok(folder)
    }

    pub async fn find_default_folder(&self) -> Result<Option<String>> {
        self.find_folder(DEFAULT_FOLDER_NAME).await
    }

    /// Metadata for a single file.
    #[instrument(skip(self))]
    pub async fn get_file(&self, file_id: &str) -> Result<MediaItem> {
        let url = format!(
            "{}/files/{}?fields={}",
            DRIVE_API_BASE,
            urlencoding::encode(file_id),
            urlencoding::encode(FILE_FIELDS)
        );

        match self.get_json::<DriveFile>(url).await {
            Ok(file) => Ok(file.into()),
            Err(GoogleDriveError::ApiError {
                status_code: 404, ..
            }) => Err(GoogleDriveError::FileNotFound {
                file_id: file_id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        let response = self.execute_with_retry(url).await?;
        serde_json::from_slice(&response.body).map_err(|e| {
            GoogleDriveError::ParseError(format!("Failed to parse Drive response: {}", e))
        })
    }

    /// Execute API request with retry logic
    ///
    /// Rate limiting (429), server errors (5xx) and transport failures are
    /// retried with exponential backoff; other statuses fail immediately.
    #[instrument(skip(self, url), fields(url = %core_runtime::logging::redact_url(&url)))]
    async fn execute_with_retry(&self, url: String) -> Result<HttpResponse> {
        let max_attempts = self.retry_policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let request = HttpRequest::get(url.clone())
                .bearer_token(self.access_token.clone())
                .header("Accept", "application/json")
                .timeout(REQUEST_TIMEOUT);

            let failure = match self.http_client.execute(request).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) => {
                    let status = response.status;
                    if status == 401 || status == 403 {
                        return Err(GoogleDriveError::AuthenticationFailed(format!(
                            "Drive returned {}",
                            status
                        )));
                    }
                    if status != 429 && !response.is_server_error() {
                        return Err(GoogleDriveError::ApiError {
                            status_code: status,
                            message: String::from_utf8_lossy(&response.body).to_string(),
                        });
                    }
                    if attempt >= max_attempts {
                        warn!("API request failed after {} attempts: status={}", attempt, status);
                        return Err(exhausted_error(&response));
                    }
                    format!("status={}", status)
                }
                Err(e) => {
                    if attempt >= max_attempts {
                        warn!("API request failed after {} attempts: {}", attempt, e);
                        return Err(GoogleDriveError::NetworkError(e.to_string()));
                    }
                    e.to_string()
                }
            };

            let backoff = self.retry_policy.delay_for(attempt);
            warn!(
                "API request failed (attempt {}/{}): {}, retrying in {:?}",
                attempt, max_attempts, failure, backoff
            );
            core_async::sleep(backoff).await;
        }
    }
}

impl std::fmt::Debug for GoogleDriveMediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleDriveMediaSource")
            .field("access_token", &"[REDACTED]")
            .field("retry_policy", &self.retry_policy)
            .finish()
    }
}

fn exhausted_error(response: &HttpResponse) -> GoogleDriveError {
    if response.status == 429 {
        let retry_after_seconds = response
            .header("retry-after")
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(0);
        GoogleDriveError::RateLimitExceeded {
            retry_after_seconds,
        }
    } else {
        GoogleDriveError::ApiError {
            status_code: response.status,
            message: String::from_utf8_lossy(&response.body).to_string(),
        }
    }
}

/// Escape a value for use inside a single-quoted Drive query literal.
fn escape_query_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
