//! Platform signals for desktop hosts

use bridge_traits::platform::{PlatformSignals, StaticPlatformProbe};

/// Signals describing the current desktop OS.
///
/// Desktop shells never report touch points, so they always classify as a
/// permissive platform.
pub fn desktop_platform_signals() -> PlatformSignals {
    PlatformSignals::new(format!(
        "reels-core/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    ))
    .with_platform(std::env::consts::OS)
}

/// Probe returning [`desktop_platform_signals`].
pub fn desktop_platform_probe() -> StaticPlatformProbe {
    StaticPlatformProbe::new(desktop_platform_signals())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_signals_have_no_touch_points() {
        let signals = desktop_platform_signals();
        assert_eq!(signals.max_touch_points, 0);
        assert_eq!(signals.platform, std::env::consts::OS);
    }
}
