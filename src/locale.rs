//! Localization lookup contract.
//!
//! Title strings are resolved through an opaque key→string lookup owned by
//! the embedding UI. The lookup never influences controller logic.

/// Translates a fixed set of title keys to display strings.
pub trait Localizer {
    fn format(&self, key: &str) -> String;
}

/// Fallback localizer that echoes keys unchanged. Used in tests and when
/// the host provides no translation table.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLocalizer;

impl Localizer for KeyLocalizer {
    fn format(&self, key: &str) -> String {
        key.to_string()
    }
}

/// Title keys for the primary speed readout.
pub mod keys {
    pub const SPEED_SURFACE: &str = "hud.speed.surface";
    pub const SPEED_TAS: &str = "hud.speed.tas";
    pub const SPEED_IAS: &str = "hud.speed.ias";
    pub const SPEED_EAS: &str = "hud.speed.eas";
    pub const SPEED_Q: &str = "hud.speed.q";
    pub const SPEED_VERTICAL: &str = "hud.speed.vertical";
    pub const SPEED_ORBIT: &str = "hud.speed.orbit";
    pub const SPEED_TARGET: &str = "hud.speed.target";

    pub const NAVBALL_SURFACE: &str = "hud.navball.surface";
    pub const NAVBALL_ORBIT: &str = "hud.navball.orbit";
    pub const NAVBALL_TARGET: &str = "hud.navball.target";
}
