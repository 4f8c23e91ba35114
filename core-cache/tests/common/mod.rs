//! Shared fakes for cache integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    CacheMode, Clock, HttpClient, HttpRequest, HttpResponse, ManualClock, ObjectUrlFactory,
    PlatformSignals,
};
use bytes::Bytes;
use core_cache::{CacheConfig, CacheDependencies, MediaBlobCache, MemoryBlobStore};
use parking_lot::Mutex;

pub const NOW_MS: i64 = 1_714_557_600_000;
pub const HOUR_MS: i64 = 60 * 60 * 1000;
pub const DAY_MS: i64 = 24 * HOUR_MS;
pub const MB: usize = 1024 * 1024;

pub const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";
pub const DESKTOP_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub fn restricted_signals() -> PlatformSignals {
    PlatformSignals::new(IPHONE_UA).with_platform("iPhone")
}

pub fn permissive_signals() -> PlatformSignals {
    PlatformSignals::new(DESKTOP_UA).with_platform("Linux x86_64")
}

// ============================================================================
// HTTP
// ============================================================================

#[derive(Clone)]
struct Route {
    status: u16,
    body: Bytes,
    content_type: String,
    delay: Option<Duration>,
}

/// Canned responses per URL; unknown URLs get a 404.
#[derive(Default)]
pub struct FakeHttp {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<(String, CacheMode, bool)>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: impl Into<Bytes>, content_type: &str) {
        self.route(url, 200, body.into(), content_type, None);
    }

    pub fn serve_bytes(&self, url: &str, len: usize, content_type: &str) {
        self.serve(url, vec![0xAB; len], content_type);
    }

    pub fn serve_status(&self, url: &str, status: u16) {
        self.route(url, status, Bytes::from_static(b"error"), "text/plain", None);
    }

    pub fn serve_slowly(&self, url: &str, delay: Duration) {
        self.route(url, 200, Bytes::from_static(b"late"), "image/png", Some(delay));
    }

    fn route(&self, url: &str, status: u16, body: Bytes, content_type: &str, delay: Option<Duration>) {
        self.routes.lock().insert(
            url.to_string(),
            Route {
                status,
                body,
                content_type: content_type.to_string(),
                delay,
            },
        );
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests_for(&self, url: &str) -> usize {
        self.requests.lock().iter().filter(|(u, _, _)| u == url).count()
    }

    pub fn cache_modes(&self) -> Vec<CacheMode> {
        self.requests.lock().iter().map(|(_, mode, _)| *mode).collect()
    }

    pub fn discarded_bodies(&self) -> Vec<bool> {
        self.requests.lock().iter().map(|(_, _, discard)| *discard).collect()
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        self.requests
            .lock()
            .push((request.url.clone(), request.cache_mode, request.discard_body));
        let route = self.routes.lock().get(&request.url).cloned();

        let Some(route) = route else {
            return Ok(HttpResponse {
                status: 404,
                headers: HashMap::new(),
                body: Bytes::new(),
            });
        };

        if let Some(delay) = route.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(HttpResponse {
            status: route.status,
            headers: HashMap::from([("Content-Type".to_string(), route.content_type)]),
            body: route.body,
        })
    }
}

/// Client whose every request fails at the transport level.
pub struct OfflineHttp;

#[async_trait]
impl HttpClient for OfflineHttp {
    async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
        Err(BridgeError::OperationFailed("network unreachable".into()))
    }
}

// ============================================================================
// Object URLs
// ============================================================================

#[derive(Default)]
pub struct RecordingUrls {
    created: Mutex<Vec<(String, usize)>>,
    revoked: Mutex<Vec<String>>,
    fail: Mutex<bool>,
}

impl RecordingUrls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_creates(&self) {
        *self.fail.lock() = true;
    }

    /// Payload size behind each created URL.
    pub fn created(&self) -> Vec<(String, usize)> {
        self.created.lock().clone()
    }

    pub fn revoked(&self) -> Vec<String> {
        self.revoked.lock().clone()
    }
}

impl ObjectUrlFactory for RecordingUrls {
    fn create(&self, data: &Bytes, _mime_type: &str) -> BridgeResult<String> {
        if *self.fail.lock() {
            return Err(BridgeError::OperationFailed("createObjectURL threw".into()));
        }
        let mut created = self.created.lock();
        let url = format!("blob:reels/{}", created.len() + 1);
        created.push((url.clone(), data.len()));
        Ok(url)
    }

    fn revoke(&self, url: &str) {
        self.revoked.lock().push(url.to_string());
    }

    fn live_count(&self) -> Option<usize> {
        Some(self.created.lock().len() - self.revoked.lock().len())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub http: Arc<FakeHttp>,
    pub store: Arc<MemoryBlobStore>,
    pub urls: Arc<RecordingUrls>,
    pub clock: Arc<ManualClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(MemoryBlobStore::new())
    }

    pub fn with_store(store: MemoryBlobStore) -> Self {
        Self {
            http: Arc::new(FakeHttp::new()),
            store: Arc::new(store),
            urls: Arc::new(RecordingUrls::new()),
            clock: Arc::new(ManualClock::new(NOW_MS)),
        }
    }

    pub fn deps(&self) -> CacheDependencies {
        CacheDependencies {
            http: self.http.clone(),
            store: self.store.clone(),
            object_urls: self.urls.clone(),
            storage_manager: None,
            clock: self.clock.clone() as Arc<dyn Clock>,
        }
    }

    pub fn cache(&self, signals: &PlatformSignals) -> MediaBlobCache {
        self.cache_with(signals, CacheConfig::default())
    }

    pub fn cache_with(&self, signals: &PlatformSignals, config: CacheConfig) -> MediaBlobCache {
        MediaBlobCache::for_platform(signals, self.deps(), config).unwrap()
    }
}
