//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Reqwest-based HTTP client implementation
///
/// - Connection pooling via reqwest
/// - Per-request timeouts mapped to [`BridgeError::Timeout`]
/// - Optional retry with exponential backoff through
///   [`HttpClient::execute_with_retry`]
///
/// Desktop hosts have no shared HTTP cache, so [`HttpRequest::cache_mode`] is
/// ignored.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("reels-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn map_send_error(error: reqwest::Error, url: &str) -> BridgeError {
        if error.is_timeout() {
            BridgeError::Timeout(format!("Request to {} timed out", url))
        } else if error.is_connect() {
            BridgeError::OperationFailed(format!("Connection failed: {}", error))
        } else {
            BridgeError::OperationFailed(error.to_string())
        }
    }

    async fn send_once(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        let response = self
            .build_request(request)
            .send()
            .await
            .map_err(|e| Self::map_send_error(e, &url))?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_send_error(e, &url))?;

        debug!(status, url = %url, bytes = body.len(), "HTTP request completed");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.send_once(request).await
    }

    async fn execute_with_retry(
        &self,
        request: HttpRequest,
        policy: RetryPolicy,
    ) -> Result<HttpResponse> {
        let max_attempts = policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(attempt, max_attempts, url = %request.url, "Executing HTTP request");

            let outcome = self.send_once(request.clone()).await;
            let retryable = match &outcome {
                Ok(response) => response.is_server_error() || response.status == 429,
                Err(BridgeError::Timeout(_)) | Err(BridgeError::OperationFailed(_)) => true,
                Err(_) => false,
            };

            if !retryable || attempt >= max_attempts {
                return outcome;
            }

            let delay = policy.delay_for(attempt);
            match &outcome {
                Ok(response) => warn!(
                    status = response.status,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "HTTP request failed with retryable status"
                ),
                Err(e) => warn!(
                    error = %e,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "HTTP request failed"
                ),
            }
            sleep(delay).await;
        }
    }

    async fn is_connected(&self) -> bool {
        self.client
            .head("https://www.google.com")
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .is_ok()
    }
}
