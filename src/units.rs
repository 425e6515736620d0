//! Display-unit selection for the speed readout.
//!
//! Owns the active unit and enforces the validity rule: a unit must be
//! enabled in the settings and compatible with the active speed mode
//! (Mach is meaningless for vertical, orbital and target-relative speeds).

use crate::config::UnitSettings;
use crate::speed_mode::SpeedMode;
use tracing::debug;

/// Closed set of selectable display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeedUnit {
    Ms,
    Kmh,
    Mph,
    Knots,
    Fts,
    Mach,
}

/// Fixed cycling order. Cycling scans forward from the active unit and
/// wraps exactly once.
pub const UNIT_ORDER: [SpeedUnit; 6] = [
    SpeedUnit::Ms,
    SpeedUnit::Kmh,
    SpeedUnit::Mph,
    SpeedUnit::Knots,
    SpeedUnit::Fts,
    SpeedUnit::Mach,
];

const M_TO_KMH: f64 = 3.6;
const M_TO_MPH: f64 = 2.236_936_29;
const M_TO_KNOTS: f64 = 1.943_844_49;
const M_TO_FTS: f64 = 3.280_839_9;

impl SpeedUnit {
    /// Conversion factor from the base m/s value. Mach ignores the factor
    /// entirely and reads the measured Mach number instead.
    pub fn multiplier(self) -> f64 {
        match self {
            SpeedUnit::Ms => 1.0,
            SpeedUnit::Kmh => M_TO_KMH,
            SpeedUnit::Mph => M_TO_MPH,
            SpeedUnit::Knots => M_TO_KNOTS,
            SpeedUnit::Fts => M_TO_FTS,
            SpeedUnit::Mach => 1.0,
        }
    }

    /// Suffix appended to the formatted value.
    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::Ms => " m/s",
            SpeedUnit::Kmh => " km/h",
            SpeedUnit::Mph => " mph",
            SpeedUnit::Knots => " knots",
            SpeedUnit::Fts => " ft/s",
            SpeedUnit::Mach => " Mach",
        }
    }

    /// Standard units are everything except Mach; only they may serve as
    /// the configured default.
    pub fn is_standard(self) -> bool {
        !matches!(self, SpeedUnit::Mach)
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedUnit::Ms => "ms",
            SpeedUnit::Kmh => "kmh",
            SpeedUnit::Mph => "mph",
            SpeedUnit::Knots => "knots",
            SpeedUnit::Fts => "fts",
            SpeedUnit::Mach => "mach",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "ms" => Some(SpeedUnit::Ms),
            "kmh" => Some(SpeedUnit::Kmh),
            "mph" => Some(SpeedUnit::Mph),
            "knots" => Some(SpeedUnit::Knots),
            "fts" => Some(SpeedUnit::Fts),
            "mach" => Some(SpeedUnit::Mach),
            _ => None,
        }
    }

    fn order_index(self) -> usize {
        UNIT_ORDER.iter().position(|u| *u == self).unwrap_or(0)
    }
}

/// Owns the active display unit for a session.
#[derive(Debug, Clone)]
pub struct UnitSelector {
    active: SpeedUnit,
}

impl UnitSelector {
    pub fn new(active: SpeedUnit) -> Self {
        Self { active }
    }

    pub fn active(&self) -> SpeedUnit {
        self.active
    }

    /// A unit is valid when it is enabled and, for Mach, the active mode
    /// measures an airspeed rather than a rate or relative speed.
    pub fn is_valid(unit: SpeedUnit, mode: SpeedMode, units: &UnitSettings) -> bool {
        if !units.unit_enabled(unit) {
            return false;
        }
        if unit == SpeedUnit::Mach
            && matches!(mode, SpeedMode::Vertical | SpeedMode::Orbit | SpeedMode::Target)
        {
            return false;
        }
        true
    }

    /// Deterministic fallback unit: the configured default when it is
    /// valid for `mode`, otherwise the first enabled standard unit in
    /// cycle order. Validation guarantees at least one standard unit is
    /// enabled; m/s is the absolute last resort.
    pub fn preferred(mode: SpeedMode, units: &UnitSettings) -> SpeedUnit {
        let default = units.default_unit;
        if default.is_standard() && Self::is_valid(default, mode, units) {
            return default;
        }
        UNIT_ORDER
            .iter()
            .copied()
            .find(|u| u.is_standard() && units.unit_enabled(*u))
            .unwrap_or(SpeedUnit::Ms)
    }

    /// Advance to the next valid unit in the fixed order.
    ///
    /// No-op while dynamic pressure is displayed: Q has a fixed kPa
    /// symbol and no unit choice. Returns true if the unit changed.
    pub fn cycle(&mut self, mode: SpeedMode, units: &UnitSettings) -> bool {
        if mode == SpeedMode::SurfaceQ {
            return false;
        }

        let start = self.active.order_index();
        for step in 1..=UNIT_ORDER.len() {
            let candidate = UNIT_ORDER[(start + step) % UNIT_ORDER.len()];
            if Self::is_valid(candidate, mode, units) {
                let changed = candidate != self.active;
                self.active = candidate;
                debug!(unit = candidate.name(), "unit cycled");
                return changed;
            }
        }

        // No valid candidate at all; fall back to the preferred unit.
        let fallback = Self::preferred(mode, units);
        let changed = fallback != self.active;
        self.active = fallback;
        changed
    }

    /// Replace an invalid active unit with the preferred one. Called after
    /// every mode change and settings refresh. Returns true if replaced.
    pub fn fix_if_invalid(&mut self, mode: SpeedMode, units: &UnitSettings) -> bool {
        if Self::is_valid(self.active, mode, units) {
            return false;
        }
        let old = self.active;
        self.active = Self::preferred(mode, units);
        debug!(from = old.name(), to = self.active.name(), "unit fixed");
        true
    }
}
