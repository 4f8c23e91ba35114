#![cfg(not(target_arch = "wasm32"))]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bridge_desktop::{DesktopStorageManager, ObjectUrlRegistry, SqliteSettingsStore};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{
    BlobStore, Clock, HttpClient, HttpRequest, HttpResponse, ManualClock, PlatformSignals,
};
use bytes::Bytes;
use core_cache::{CacheConfig, MemoryBlobStore};
use core_runtime::config::CoreConfig;
use core_service::{CoreError, CoreService};
use mockall::mock;

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

const START_MS: i64 = 1_714_557_600_000;
const IPHONE_UA: &str =
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_4 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

fn response(status: u16, content_type: &str, body: impl Into<Bytes>) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::from([("Content-Type".to_string(), content_type.to_string())]),
        body: body.into(),
    }
}

/// Routes requests by URL: manifest, drive folder lookup, drive listing, media.
fn routed_http(drive_folder: &'static str, drive_files: &'static str) -> MockHttpClient {
    let mut http = MockHttpClient::new();
    http.expect_execute().returning(move |request: HttpRequest| {
        let url = request.url.as_str();
        if url.starts_with("/content/media-list.json") {
            return Ok(response(
                200,
                "application/json",
                r#"{"version":"v2","items":[
                    {"id":"a","name":"a.jpg","file":"a.jpg","mimeType":"image/jpeg"},
                    {"id":"b","name":"b.mp4","file":"b.mp4","mimeType":"video/mp4"},
                    {"id":"c","name":"c.jpg","file":"c.jpg","mimeType":"image/jpeg"}
                ]}"#,
            ));
        }
        if url.contains("googleapis.com") && url.contains("pageSize=1&") {
            return Ok(response(200, "application/json", drive_folder));
        }
        if url.contains("googleapis.com") {
            return Ok(response(200, "application/json", drive_files));
        }
        if url.starts_with("/content/") {
            return Ok(response(200, "image/jpeg", vec![7u8; 64]));
        }
        Err(BridgeError::OperationFailed(format!("unrouted {url}")))
    });
    http
}

struct Fixture {
    store: Arc<MemoryBlobStore>,
    service: CoreService,
}

impl Fixture {
    async fn new(http: MockHttpClient, signals: PlatformSignals) -> Self {
        Self::with_cache_config(http, signals, CacheConfig::default())
            .await
            .expect("service")
    }

    async fn with_cache_config(
        http: MockHttpClient,
        signals: PlatformSignals,
        cache_config: CacheConfig,
    ) -> core_service::Result<Self> {
        let store = Arc::new(MemoryBlobStore::new());
        let config = CoreConfig::builder()
            .database_path("unused.db")
            .http_client(Arc::new(http))
            .blob_store(store.clone() as Arc<dyn BlobStore>)
            .settings_store(Arc::new(SqliteSettingsStore::in_memory().await.unwrap()))
            .object_urls(Arc::new(ObjectUrlRegistry::new()))
            .storage_manager(Arc::new(DesktopStorageManager::detached()))
            .platform_signals(signals)
            .clock(Arc::new(ManualClock::new(START_MS)) as Arc<dyn Clock>)
            .build()?;
        let service = CoreService::new(config, cache_config)?;
        Ok(Self { store, service })
    }
}

fn desktop() -> PlatformSignals {
    PlatformSignals::new("Mozilla/5.0 (X11; Linux x86_64) Firefox/125.0")
        .with_platform("Linux x86_64")
}

fn iphone() -> PlatformSignals {
    PlatformSignals::new(IPHONE_UA).with_platform("iPhone")
}

#[tokio::test]
async fn test_feed_items_are_cached_on_permissive_hosts() {
    let fx = Fixture::new(routed_http("{}", "{}"), desktop()).await;

    let feed = fx.service.load_feed().await;
    assert_eq!(feed.len(), 3);
    assert_eq!(feed[0].media_url(), Some("/content/a.jpg"));

    let reference = fx.service.cache().fetch_and_cache("/content/a.jpg").await;
    assert!(reference.is_local());
    assert!(fx.store.peek("/content/a.jpg").is_some());
    assert_eq!(fx.service.prefetcher().fan_out(), 5);
}

#[tokio::test]
async fn test_restricted_hosts_pass_media_through() {
    let fx = Fixture::new(routed_http("{}", "{}"), iphone()).await;

    let reference = fx.service.cache().fetch_and_cache("/content/a.jpg").await;

    assert!(!reference.is_local());
    assert_eq!(reference.as_str(), "/content/a.jpg");
    assert!(fx.store.is_empty());
    assert_eq!(fx.service.prefetcher().fan_out(), 2);
}

#[tokio::test]
async fn test_loading_a_new_feed_resets_prefetch_record() {
    let fx = Fixture::new(routed_http("{}", "{}"), desktop()).await;
    let feed = fx.service.load_feed().await;

    fx.service.prefetcher().run(0, &feed).await;
    assert!(fx.service.prefetcher().was_attempted(1));

    fx.service.load_feed().await;
    assert!(!fx.service.prefetcher().was_attempted(1));
}

#[tokio::test]
async fn test_likes_are_shared_through_the_service() {
    let fx = Fixture::new(routed_http("{}", "{}"), desktop()).await;

    assert!(fx.service.likes().toggle("a").await.unwrap());
    assert!(fx.service.likes().is_liked("a").await.unwrap());
    assert!(!fx.service.likes().toggle("a").await.unwrap());
}

#[tokio::test]
async fn test_drive_feed_from_named_folder() {
    let fx = Fixture::new(
        routed_http(
            r#"{"files":[{"id":"folder-1","name":"MentalBiriyani","mimeType":"application/vnd.google-apps.folder"}]}"#,
            r#"{"files":[
                {"id":"v1","name":"clip.mp4","mimeType":"video/mp4","webContentLink":"https://drive.google.com/uc?id=v1"},
                {"id":"d1","name":"notes.txt","mimeType":"text/plain"}
            ]}"#,
        ),
        desktop(),
    )
    .await;

    let items = fx
        .service
        .load_drive_feed("token", "MentalBiriyani")
        .await
        .unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "v1");
    assert!(items[0].is_video);
}

#[tokio::test]
async fn test_drive_feed_missing_folder() {
    let fx = Fixture::new(routed_http(r#"{"files":[]}"#, "{}"), desktop()).await;

    let err = fx
        .service
        .load_drive_feed("token", "MentalBiriyani")
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::FolderNotFound(name) if name == "MentalBiriyani"));
}

#[tokio::test]
async fn test_drive_feed_empty_folder() {
    let fx = Fixture::new(
        routed_http(
            r#"{"files":[{"id":"folder-1","name":"Reels","mimeType":"application/vnd.google-apps.folder"}]}"#,
            r#"{"files":[]}"#,
        ),
        desktop(),
    )
    .await;

    let err = fx.service.load_drive_feed("token", "Reels").await.unwrap_err();

    assert!(matches!(err, CoreError::EmptyFolder(_)));
}

#[tokio::test]
async fn test_invalid_cache_config_fails_startup() {
    let result = Fixture::with_cache_config(
        routed_http("{}", "{}"),
        desktop(),
        CacheConfig::default().with_max_size(0),
    )
    .await;

    assert!(matches!(result, Err(CoreError::Cache(_))));
}
