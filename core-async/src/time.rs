//! Time-related abstractions.
//!
//! - Native: re-exports `tokio::time` and `std::time`.
//! - WASM: `sleep` is backed by `setTimeout` (gloo-timers), `Instant` by
//!   `performance.now()`, and `timeout` races the future against a sleep.
//!
//! Wall-clock helpers ([`now_millis`], [`now_secs`]) avoid `SystemTime::now`
//! on wasm, where it is unsupported, and read `Date.now()` instead.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{timeout, Duration};
//!
//! async fn example() {
//!     let result = timeout(Duration::from_millis(50), async { 42 }).await;
//!     assert!(result.is_ok());
//! }
//! ```

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::{error::Elapsed as TimeoutError, sleep, timeout};

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use std::time::Duration;

#[cfg(target_arch = "wasm32")]
/// Sleeps for the specified duration using the browser's `setTimeout`.
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

#[cfg(target_arch = "wasm32")]
/// A monotonic instant backed by `performance.now()`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Instant {
    millis: f64,
}

#[cfg(target_arch = "wasm32")]
impl Instant {
    /// Returns the current instant.
    ///
    /// Falls back to `Date.now()` in contexts without a `window` (workers).
    pub fn now() -> Self {
        let millis = web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| performance.now())
            .unwrap_or_else(js_sys::Date::now);
        Self { millis }
    }

    /// Time elapsed since this instant; saturates at zero.
    pub fn elapsed(&self) -> Duration {
        Self::now().saturating_duration_since(*self)
    }

    /// Duration since `earlier`, or zero if `earlier` is later.
    pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
        let delta = (self.millis - earlier.millis).max(0.0);
        Duration::from_secs_f64(delta / 1000.0)
    }
}

#[cfg(target_arch = "wasm32")]
/// Requires a future to complete before `duration` elapses.
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, TimeoutError>
where
    F: std::future::Future,
{
    let sleep_fut = sleep(duration);

    futures::pin_mut!(future);
    futures::pin_mut!(sleep_fut);

    match futures::future::select(future, sleep_fut).await {
        futures::future::Either::Left((output, _)) => Ok(output),
        futures::future::Either::Right(_) => Err(TimeoutError),
    }
}

#[cfg(target_arch = "wasm32")]
/// Error returned when a timeout expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutError;

#[cfg(target_arch = "wasm32")]
impl std::fmt::Display for TimeoutError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation timed out")
    }
}

#[cfg(target_arch = "wasm32")]
impl std::error::Error for TimeoutError {}

// ============================================================================
// Common Utilities
// ============================================================================

/// Current wall-clock time in milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> i64 {
    js_sys::Date::now() as i64
}

/// Current wall-clock time in seconds since the Unix epoch.
pub fn now_secs() -> i64 {
    now_millis() / 1000
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_now_secs_tracks_millis() {
        let millis = now_millis();
        let secs = now_secs();
        assert!(millis > 1_600_000_000_000);
        assert!((secs - millis / 1000).abs() <= 1);
    }
}
