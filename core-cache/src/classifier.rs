//! Environment classification
//!
//! iOS-family browsers purge script-writable storage aggressively and cap it
//! tightly, so the cache stays out of their way: those platforms are
//! *restricted* and get a pass-through strategy. Everything else, including
//! hosts that report nothing, is *permissive*.

use bridge_traits::PlatformSignals;

const RESTRICTED_DEVICE_TOKENS: &[&str] = &["iphone", "ipad", "ipod"];

/// Storage capability class of the running host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformClass {
    Restricted,
    Permissive,
}

impl PlatformClass {
    pub fn classify(signals: &PlatformSignals) -> Self {
        if is_restricted_platform(signals) {
            PlatformClass::Restricted
        } else {
            PlatformClass::Permissive
        }
    }

    pub fn is_restricted(&self) -> bool {
        matches!(self, PlatformClass::Restricted)
    }
}

/// True for iPhone/iPad/iPod user agents and for iPadOS reporting a Mac
/// platform with multi-touch.
pub fn is_restricted_platform(signals: &PlatformSignals) -> bool {
    let user_agent = signals.user_agent.to_ascii_lowercase();
    if RESTRICTED_DEVICE_TOKENS
        .iter()
        .any(|token| user_agent.contains(token))
    {
        return true;
    }

    signals.platform.contains("Mac") && signals.max_touch_points > 1
}
