//! # Media Cache Module
//!
//! Client-side media blob cache and prefetch pipeline.
//!
//! ## Overview
//!
//! This module manages:
//! - Platform classification (restricted hosts bypass persistent storage)
//! - Persistent blob caching keyed by source URL
//! - Quota enforcement with age-based eviction
//! - Object URL ownership for loaded media
//! - Background prefetching of upcoming feed items
//!
//! ## Components
//!
//! - [`MediaBlobCache`]: the UI-facing façade; every operation resolves
//! - [`StorageStrategy`]: persistent vs. pass-through policy
//! - [`QuotaManager`]: keeps the store under its ceiling
//! - [`PrefetchScheduler`]: once-per-session warming of upcoming items

pub mod classifier;
pub mod config;
pub mod error;
pub mod facade;
pub mod fetch;
pub mod object_url;
pub mod prefetch;
pub mod quota;
pub mod stats;
pub mod store;
pub mod strategy;

pub use classifier::{is_restricted_platform, PlatformClass};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use facade::{CacheDependencies, MediaBlobCache};
pub use fetch::{FetchedMedia, MediaFetcher};
pub use object_url::{MediaReference, MediaSlot, ObjectUrlHandle};
pub use prefetch::{upcoming_indices, PrefetchReport, PrefetchScheduler};
pub use quota::{QuotaManager, WriteOutcome};
pub use stats::{CacheStats, StorageQuota};
pub use store::{MemoryBlobStore, StoreCallCounts};
pub use strategy::{PassthroughStrategy, PersistentCacheStrategy, StorageStrategy};
