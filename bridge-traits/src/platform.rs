//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` to allow bridge implementations to be
//! shared freely across async tasks. WebAssembly builds run entirely on a
//! single thread and cannot satisfy those bounds because browser-provided
//! objects (`web_sys` types) are not thread-safe.
//!
//! This module also carries [`PlatformSignals`], the raw runtime description a
//! host reports so the core can pick a storage strategy.

use serde::{Deserialize, Serialize};

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Marker trait equivalent to `Send` on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSend for T where T: Send {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSend {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSend for T {}

/// Runtime signals used to classify the host platform.
///
/// Browsers fill these from `navigator.userAgent`, `navigator.platform` and
/// `navigator.maxTouchPoints`. Any field may be empty when the host cannot
/// report it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSignals {
    pub user_agent: String,
    pub platform: String,
    pub max_touch_points: u32,
}

impl PlatformSignals {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_max_touch_points(mut self, points: u32) -> Self {
        self.max_touch_points = points;
        self
    }

    /// True when no signal was reported at all.
    pub fn is_empty(&self) -> bool {
        self.user_agent.trim().is_empty()
            && self.platform.trim().is_empty()
            && self.max_touch_points == 0
    }
}

/// Source of [`PlatformSignals`] for the running host.
pub trait PlatformProbe: PlatformSendSync {
    fn signals(&self) -> PlatformSignals;
}

/// Probe returning a fixed set of signals (desktop shells, tests).
#[derive(Debug, Clone, Default)]
pub struct StaticPlatformProbe {
    signals: PlatformSignals,
}

impl StaticPlatformProbe {
    pub fn new(signals: PlatformSignals) -> Self {
        Self { signals }
    }
}

impl PlatformProbe for StaticPlatformProbe {
    fn signals(&self) -> PlatformSignals {
        self.signals.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_signals() {
        assert!(PlatformSignals::default().is_empty());
        assert!(!PlatformSignals::new("Mozilla/5.0").is_empty());
        assert!(!PlatformSignals::default().with_max_touch_points(5).is_empty());
    }

    #[test]
    fn test_static_probe_returns_signals() {
        let signals = PlatformSignals::new("ua").with_platform("Linux x86_64");
        let probe = StaticPlatformProbe::new(signals.clone());
        assert_eq!(probe.signals(), signals);
    }
}
