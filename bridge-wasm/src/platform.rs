//! Platform signals read from `navigator`.

use bridge_traits::platform::{PlatformProbe, PlatformSignals};

/// Reads `navigator.userAgent`, `navigator.platform` and
/// `navigator.maxTouchPoints` on every call.
#[derive(Debug, Default, Clone)]
pub struct NavigatorPlatformProbe;

impl NavigatorPlatformProbe {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformProbe for NavigatorPlatformProbe {
    fn signals(&self) -> PlatformSignals {
        let Some(window) = web_sys::window() else {
            return PlatformSignals::default();
        };
        let navigator = window.navigator();

        PlatformSignals {
            user_agent: navigator.user_agent().unwrap_or_default(),
            platform: navigator.platform().unwrap_or_default(),
            max_touch_points: navigator.max_touch_points().max(0) as u32,
        }
    }
}
