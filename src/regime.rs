//! Altitude-regime classifier with per-body hysteresis.
//!
//! Decides every tick whether the vehicle is in the surface regime or the
//! orbital regime. The decision drives automatic speed-mode switching, so
//! it applies an asymmetric threshold: the boundary sits lower when the
//! readout is already on an orbital-side mode, which keeps the mode from
//! chattering while the vehicle hovers near the crossing altitude.

use crate::config::{BodyThresholds, GeneralSettings};
use crate::telemetry::VesselSample;
use tracing::debug;

/// Automatic speed-mode switching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoSwitchMode {
    /// No automatic switching; the regime is pinned to surface.
    Off,
    /// Reference altitude from the body radius alone.
    Stock,
    /// Per-body overrides with a physics-derived fallback.
    #[default]
    Custom,
}

/// Hysteresis factor applied while the active mode is outside the surface
/// group. 5.5/6 of the reference altitude must be crossed downward before
/// the classifier flips back to surface.
pub const ORBITAL_HYSTERESIS: f64 = 5.5 / 6.0;

/// Stock reference altitude as a fraction of the body radius.
const RADIUS_FACTOR: f64 = 0.06;

/// Custom-policy fallback as a fraction of the atmosphere depth.
const ATMOSPHERE_FACTOR: f64 = 0.8;

#[derive(Debug, Clone)]
struct BodyCache {
    body: String,
    ref_alt: f64,
}

/// Outcome of one classification step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeUpdate {
    /// True when the vehicle is in the surface regime.
    pub surface: bool,
    /// True when this step flipped the regime.
    pub crossed: bool,
}

/// Stateful regime classifier.
///
/// Holds the previous decision (for crossing detection) and a per-body
/// reference-altitude cache recomputed only when the body changes.
#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    surface: bool,
    cache: Option<BodyCache>,
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RegimeClassifier {
    /// New classifier starting in the surface regime.
    pub fn new() -> Self {
        Self {
            surface: true,
            cache: None,
        }
    }

    pub fn in_surface_regime(&self) -> bool {
        self.surface
    }

    /// Classify the current sample and record the crossing, if any.
    ///
    /// `mode_in_surface_group` reflects the active speed mode and selects
    /// which side of the hysteresis dead-zone applies.
    pub fn update(
        &mut self,
        sample: &VesselSample,
        general: &GeneralSettings,
        thresholds: &BodyThresholds,
        mode_in_surface_group: bool,
    ) -> RegimeUpdate {
        let surface = self.classify(sample, general, thresholds, mode_in_surface_group);
        let crossed = surface != self.surface;
        if crossed {
            debug!(surface, altitude = sample.altitude, "regime crossing");
            self.surface = surface;
        }
        RegimeUpdate { surface, crossed }
    }

    /// Pure decision for one sample, updating only the body cache.
    pub fn classify(
        &mut self,
        sample: &VesselSample,
        general: &GeneralSettings,
        thresholds: &BodyThresholds,
        mode_in_surface_group: bool,
    ) -> bool {
        // A landed or splashed vehicle is on the surface regardless of
        // configuration.
        if sample.landed_or_splashed {
            return true;
        }

        let ref_alt = match general.auto_switch {
            AutoSwitchMode::Off => return true,
            AutoSwitchMode::Stock => sample.body_radius * RADIUS_FACTOR,
            AutoSwitchMode::Custom => self.reference_altitude(sample, thresholds),
        };

        let hysteresis = if mode_in_surface_group {
            1.0
        } else {
            ORBITAL_HYSTERESIS
        };
        let pct = f64::from(general.threshold_pct) / 100.0;

        sample.altitude < ref_alt * hysteresis * pct
    }

    /// Cached per-body reference altitude for the custom policy: the
    /// configured override if present, else 0.8 x atmosphere depth for
    /// atmospheric bodies, else 0.06 x radius.
    fn reference_altitude(&mut self, sample: &VesselSample, thresholds: &BodyThresholds) -> f64 {
        let stale = match &self.cache {
            Some(cache) => cache.body != sample.body_name,
            None => true,
        };

        if stale {
            let ref_alt = match thresholds.get(&sample.body_name) {
                Some(alt) => alt,
                None if sample.body_has_atmosphere => sample.atmosphere_depth * ATMOSPHERE_FACTOR,
                None => sample.body_radius * RADIUS_FACTOR,
            };
            debug!(body = %sample.body_name, ref_alt, "body reference altitude cached");
            self.cache = Some(BodyCache {
                body: sample.body_name.clone(),
                ref_alt,
            });
        }

        self.cache.as_ref().map(|c| c.ref_alt).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BodyThresholds;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn sample(altitude: f64) -> VesselSample {
        VesselSample {
            altitude,
            landed_or_splashed: false,
            body_name: "Kerbin".to_string(),
            body_radius: 600_000.0,
            body_has_atmosphere: true,
            atmosphere_depth: 70_000.0,
            ..VesselSample::default()
        }
    }

    fn general(auto_switch: AutoSwitchMode, threshold_pct: u32) -> GeneralSettings {
        GeneralSettings {
            auto_switch,
            threshold_pct,
            ..GeneralSettings::default()
        }
    }

    fn thresholds_1000m() -> BodyThresholds {
        BodyThresholds::from_map(HashMap::from([("Kerbin".to_string(), 1000.0)]))
    }

    #[test]
    fn test_landed_always_surface() {
        let mut classifier = RegimeClassifier::new();
        let mut s = sample(1_000_000.0);
        s.landed_or_splashed = true;
        assert!(classifier.classify(&s, &general(AutoSwitchMode::Custom, 100), &thresholds_1000m(), false));
    }

    #[test]
    fn test_auto_off_pins_surface() {
        let mut classifier = RegimeClassifier::new();
        let s = sample(1_000_000.0);
        assert!(classifier.classify(&s, &general(AutoSwitchMode::Off, 100), &BodyThresholds::default(), false));
    }

    #[test]
    fn test_stock_policy_uses_radius() {
        let mut classifier = RegimeClassifier::new();
        let g = general(AutoSwitchMode::Stock, 100);
        let t = BodyThresholds::default();
        // 0.06 x 600km = 36km boundary.
        assert!(classifier.classify(&sample(35_999.0), &g, &t, true));
        assert!(!classifier.classify(&sample(36_001.0), &g, &t, true));
    }

    #[test]
    fn test_custom_policy_fallback_chain() {
        let mut classifier = RegimeClassifier::new();
        let g = general(AutoSwitchMode::Custom, 100);

        // Atmospheric body, no override: 0.8 x 70km = 56km.
        let t = BodyThresholds::default();
        assert!(classifier.classify(&sample(55_999.0), &g, &t, true));
        assert!(!classifier.classify(&sample(56_001.0), &g, &t, true));

        // Airless body, no override: 0.06 x radius = 36km.
        let mut classifier = RegimeClassifier::new();
        let mut s = sample(40_000.0);
        s.body_has_atmosphere = false;
        assert!(!classifier.classify(&s, &g, &t, true));
        s.altitude = 35_000.0;
        assert!(classifier.classify(&s, &g, &t, true));
    }

    #[test]
    fn test_hysteresis_boundaries() {
        // Reference 1000m, threshold 100%: while a surface-group mode is
        // active the crossing sits at 1000m; while an orbital-side mode
        // is active it sits at 1000 x 5.5/6 = 916.67m.
        let mut classifier = RegimeClassifier::new();
        let g = general(AutoSwitchMode::Custom, 100);
        let t = thresholds_1000m();

        assert!(classifier.classify(&sample(999.9), &g, &t, true));
        assert!(!classifier.classify(&sample(1000.0), &g, &t, true));

        assert!(classifier.classify(&sample(916.0), &g, &t, false));
        assert!(!classifier.classify(&sample(917.0), &g, &t, false));
        assert!(!classifier.classify(&sample(999.9), &g, &t, false));
    }

    #[test]
    fn test_threshold_percentage_scales_boundary() {
        let mut classifier = RegimeClassifier::new();
        let t = thresholds_1000m();
        let g = general(AutoSwitchMode::Custom, 50);
        assert!(classifier.classify(&sample(499.0), &g, &t, true));
        assert!(!classifier.classify(&sample(501.0), &g, &t, true));

        let g = general(AutoSwitchMode::Custom, 150);
        assert!(classifier.classify(&sample(1499.0), &g, &t, true));
        assert!(!classifier.classify(&sample(1501.0), &g, &t, true));
    }

    #[test]
    fn test_body_cache_recomputed_on_body_change() {
        let mut classifier = RegimeClassifier::new();
        let g = general(AutoSwitchMode::Custom, 100);
        let t = thresholds_1000m();

        // Prime the cache on Kerbin (override 1000m).
        assert!(!classifier.classify(&sample(5_000.0), &g, &t, true));

        // Same altitude on an airless un-configured body: 36km boundary.
        let mut s = sample(5_000.0);
        s.body_name = "Mun".to_string();
        s.body_has_atmosphere = false;
        s.body_radius = 200_000.0;
        assert!(classifier.classify(&s, &g, &t, true));
    }

    #[test]
    fn test_update_reports_crossing_once() {
        let mut classifier = RegimeClassifier::new();
        let g = general(AutoSwitchMode::Custom, 100);
        let t = thresholds_1000m();

        let up = classifier.update(&sample(500.0), &g, &t, true);
        assert!(up.surface && !up.crossed);

        let up = classifier.update(&sample(1500.0), &g, &t, true);
        assert!(!up.surface && up.crossed);

        let up = classifier.update(&sample(1500.0), &g, &t, false);
        assert!(!up.surface && !up.crossed);
    }

    proptest! {
        // Property: the orbital-side boundary is never above the
        // surface-side boundary, so the dead-zone cannot invert.
        #[test]
        fn prop_hysteresis_dead_zone_never_inverts(
            altitude in 0.0f64..100_000.0,
            threshold_pct in 50u32..=150u32,
        ) {
            let g = general(AutoSwitchMode::Custom, threshold_pct);
            let t = thresholds_1000m();
            let s = sample(altitude);

            let mut a = RegimeClassifier::new();
            let mut b = RegimeClassifier::new();
            let surface_side = a.classify(&s, &g, &t, true);
            let orbital_side = b.classify(&s, &g, &t, false);

            // If the tighter orbital-side test says surface, the looser
            // surface-side test must agree.
            if orbital_side {
                prop_assert!(surface_side);
            }
        }
    }
}
