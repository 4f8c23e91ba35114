//! Media fetcher
//!
//! Bounded GET for media payloads. The request carries its own timeout, and
//! an outer timer guards hosts that ignore it.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{CacheMode, HttpClient, HttpRequest, HttpResponse};
use bytes::Bytes;
use tracing::{debug, instrument};

use crate::error::{CacheError, Result};

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// A downloaded payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub data: Bytes,
    pub mime_type: String,
}

impl FetchedMedia {
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

#[derive(Clone)]
pub struct MediaFetcher {
    http: Arc<dyn HttpClient>,
}

impl MediaFetcher {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    pub async fn fetch(&self, url: &str, timeout: Duration, cache_mode: CacheMode) -> Result<FetchedMedia> {
        let request = HttpRequest::get(url)
            .timeout(timeout)
            .cache_mode(cache_mode);
        let response = self.send(request, url, timeout).await?;

        if response.body.is_empty() {
            return Err(CacheError::EmptyBody {
                url: url.to_string(),
            });
        }

        let mime_type = response
            .content_type()
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());
        debug!(size = response.body.len(), %mime_type, "Fetched media");

        Ok(FetchedMedia {
            data: response.body,
            mime_type,
        })
    }

    /// Download `url` through the host HTTP cache without keeping the payload.
    #[instrument(skip(self), fields(url = %core_runtime::logging::redact_url(url)))]
    pub async fn warm(&self, url: &str, timeout: Duration) -> Result<()> {
        let request = HttpRequest::get(url)
            .timeout(timeout)
            .cache_mode(CacheMode::ForceCache)
            .discard_body();
        let response = self.send(request, url, timeout).await?;
        debug!(status = response.status, "Warmed HTTP cache");
        Ok(())
    }

    async fn send(&self, request: HttpRequest, url: &str, timeout: Duration) -> Result<HttpResponse> {
        let response = core_async::timeout(timeout, self.http.execute(request))
            .await
            .map_err(|_| CacheError::FetchTimeout {
                url: url.to_string(),
                timeout,
            })?
            .map_err(|e| match e {
                bridge_traits::BridgeError::Timeout(_) => CacheError::FetchTimeout {
                    url: url.to_string(),
                    timeout,
                },
                other => CacheError::FetchFailure {
                    url: url.to_string(),
                    status: None,
                    message: other.to_string(),
                },
            })?;

        if !response.is_success() {
            return Err(CacheError::FetchFailure {
                url: url.to_string(),
                status: Some(response.status),
                message: "non-success response".to_string(),
            });
        }

        Ok(response)
    }
}

impl std::fmt::Debug for MediaFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaFetcher").finish_non_exhaustive()
    }
}
