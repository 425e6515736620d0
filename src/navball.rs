//! Secondary attitude-reference indicator (navball) mode control.
//!
//! The indicator itself is external; this module owns the mode we last
//! commanded and keeps the external state honest. Under the sync policy
//! the indicator is a pure function of the speed mode. Under the
//! independent policy it has its own cycle and auto-switch rules, plus a
//! per-tick anti-flicker enforcement step that re-issues the command
//! whenever something out of band moved the indicator.

use crate::locale::keys;
use crate::speed_mode::SpeedMode;
use tracing::debug;

/// Closed set of indicator modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavBallMode {
    Surface,
    Orbit,
    Target,
}

impl NavBallMode {
    pub fn title_key(self) -> &'static str {
        match self {
            NavBallMode::Surface => keys::NAVBALL_SURFACE,
            NavBallMode::Orbit => keys::NAVBALL_ORBIT,
            NavBallMode::Target => keys::NAVBALL_TARGET,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NavBallMode::Surface => "surface",
            NavBallMode::Orbit => "orbit",
            NavBallMode::Target => "target",
        }
    }
}

/// Handle to the external indicator. `mode()` is the externally-observed
/// state, which other systems may move out of band.
pub trait NavBallIndicator {
    fn mode(&self) -> NavBallMode;
    fn set_mode(&mut self, mode: NavBallMode);
}

/// In-process indicator for hosts where this controller owns the display
/// outright (and for tests).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalNavBall {
    mode: NavBallMode,
}

impl LocalNavBall {
    pub fn new(mode: NavBallMode) -> Self {
        Self { mode }
    }
}

impl Default for LocalNavBall {
    fn default() -> Self {
        Self::new(NavBallMode::Surface)
    }
}

impl NavBallIndicator for LocalNavBall {
    fn mode(&self) -> NavBallMode {
        self.mode
    }

    fn set_mode(&mut self, mode: NavBallMode) {
        self.mode = mode;
    }
}

/// Controller owning the last-commanded indicator mode.
#[derive(Debug, Clone)]
pub struct NavBallController {
    commanded: NavBallMode,
}

impl NavBallController {
    pub fn new(initial: NavBallMode) -> Self {
        Self { commanded: initial }
    }

    pub fn commanded(&self) -> NavBallMode {
        self.commanded
    }

    /// Sync-policy mapping from speed mode to indicator mode.
    pub fn sync_target(mode: SpeedMode) -> NavBallMode {
        match mode {
            SpeedMode::Orbit => NavBallMode::Orbit,
            SpeedMode::Target => NavBallMode::Target,
            _ => NavBallMode::Surface,
        }
    }

    /// Single transition entry point. No-op when both the commanded and
    /// the observed mode already match, so title side effects and external
    /// commands fire only on real changes.
    pub fn set_mode(&mut self, indicator: &mut dyn NavBallIndicator, mode: NavBallMode) -> bool {
        if self.commanded == mode && indicator.mode() == mode {
            return false;
        }
        debug!(mode = mode.name(), "navball mode set");
        self.commanded = mode;
        indicator.set_mode(mode);
        true
    }

    /// Apply the sync mapping for the given speed mode. Idempotent.
    pub fn apply_sync(&mut self, indicator: &mut dyn NavBallIndicator, mode: SpeedMode) -> bool {
        self.set_mode(indicator, Self::sync_target(mode))
    }

    /// Independent-policy manual cycle over the observed mode:
    /// Surface -> Orbit -> Target (lock permitting) -> Surface.
    pub fn cycle(&mut self, indicator: &mut dyn NavBallIndicator, target_locked: bool) -> bool {
        let next = match indicator.mode() {
            NavBallMode::Surface => NavBallMode::Orbit,
            NavBallMode::Orbit => {
                if target_locked {
                    NavBallMode::Target
                } else {
                    NavBallMode::Surface
                }
            }
            NavBallMode::Target => NavBallMode::Surface,
        };
        self.set_mode(indicator, next)
    }

    /// Independent-policy target acquisition.
    pub fn on_target_acquired(
        &mut self,
        indicator: &mut dyn NavBallIndicator,
        auto_switch: bool,
    ) -> bool {
        if auto_switch {
            self.set_mode(indicator, NavBallMode::Target)
        } else {
            false
        }
    }

    /// Independent-policy target loss: leave a stale `Target` mode for
    /// the regime default.
    pub fn on_target_lost(
        &mut self,
        indicator: &mut dyn NavBallIndicator,
        in_surface_regime: bool,
    ) -> bool {
        if self.commanded == NavBallMode::Target {
            self.set_mode(indicator, Self::regime_default(in_surface_regime))
        } else {
            false
        }
    }

    /// Independent-policy regime crossing, inactive while the indicator
    /// tracks a target.
    pub fn on_regime_crossing(
        &mut self,
        indicator: &mut dyn NavBallIndicator,
        to_surface: bool,
    ) -> bool {
        if self.commanded == NavBallMode::Target {
            return false;
        }
        if to_surface {
            if self.commanded == NavBallMode::Orbit {
                return self.set_mode(indicator, NavBallMode::Surface);
            }
        } else if self.commanded == NavBallMode::Surface {
            return self.set_mode(indicator, NavBallMode::Orbit);
        }
        false
    }

    /// Anti-flicker enforcement: re-issue the command when the observed
    /// mode drifted from the commanded one.
    pub fn enforce(&mut self, indicator: &mut dyn NavBallIndicator) -> bool {
        if indicator.mode() != self.commanded {
            debug!(
                observed = indicator.mode().name(),
                commanded = self.commanded.name(),
                "navball drifted, re-commanding"
            );
            indicator.set_mode(self.commanded);
            return true;
        }
        false
    }

    /// Post-settings-change fix. Sync policy re-applies the mapping;
    /// independent policy demotes a lock-less `Target` mode and otherwise
    /// just corrects drift.
    pub fn fix(
        &mut self,
        indicator: &mut dyn NavBallIndicator,
        sync: bool,
        speed_mode: SpeedMode,
        target_locked: bool,
        in_surface_regime: bool,
    ) -> bool {
        if sync {
            self.apply_sync(indicator, speed_mode)
        } else if self.commanded == NavBallMode::Target && !target_locked {
            self.set_mode(indicator, Self::regime_default(in_surface_regime))
        } else {
            self.enforce(indicator)
        }
    }

    fn regime_default(in_surface_regime: bool) -> NavBallMode {
        if in_surface_regime {
            NavBallMode::Surface
        } else {
            NavBallMode::Orbit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sync_mapping() {
        assert_eq!(NavBallController::sync_target(SpeedMode::Orbit), NavBallMode::Orbit);
        assert_eq!(NavBallController::sync_target(SpeedMode::Target), NavBallMode::Target);
        for mode in [
            SpeedMode::SurfaceTas,
            SpeedMode::SurfaceIas,
            SpeedMode::SurfaceEas,
            SpeedMode::SurfaceQ,
            SpeedMode::Vertical,
        ] {
            assert_eq!(NavBallController::sync_target(mode), NavBallMode::Surface);
        }
    }

    #[test]
    fn test_set_mode_is_idempotent() {
        let mut indicator = LocalNavBall::default();
        let mut controller = NavBallController::new(NavBallMode::Surface);
        assert!(!controller.set_mode(&mut indicator, NavBallMode::Surface));
        assert!(controller.set_mode(&mut indicator, NavBallMode::Orbit));
        assert!(!controller.set_mode(&mut indicator, NavBallMode::Orbit));
        assert_eq!(indicator.mode(), NavBallMode::Orbit);
    }

    #[test]
    fn test_set_mode_corrects_external_divergence() {
        // Commanded matches but the external indicator was moved.
        let mut indicator = LocalNavBall::new(NavBallMode::Orbit);
        let mut controller = NavBallController::new(NavBallMode::Surface);
        assert!(controller.set_mode(&mut indicator, NavBallMode::Surface));
        assert_eq!(indicator.mode(), NavBallMode::Surface);
    }

    #[test]
    fn test_enforce_reissues_after_drift() {
        let mut indicator = LocalNavBall::default();
        let mut controller = NavBallController::new(NavBallMode::Surface);
        controller.set_mode(&mut indicator, NavBallMode::Orbit);

        // External system forces the indicator elsewhere.
        indicator.set_mode(NavBallMode::Target);
        assert!(controller.enforce(&mut indicator));
        assert_eq!(indicator.mode(), NavBallMode::Orbit);

        // No drift: no command.
        assert!(!controller.enforce(&mut indicator));
    }

    #[test]
    fn test_cycle_skips_target_without_lock() {
        let mut indicator = LocalNavBall::default();
        let mut controller = NavBallController::new(NavBallMode::Surface);

        controller.cycle(&mut indicator, false);
        assert_eq!(indicator.mode(), NavBallMode::Orbit);
        controller.cycle(&mut indicator, false);
        assert_eq!(indicator.mode(), NavBallMode::Surface);

        controller.cycle(&mut indicator, true);
        controller.cycle(&mut indicator, true);
        assert_eq!(indicator.mode(), NavBallMode::Target);
        controller.cycle(&mut indicator, true);
        assert_eq!(indicator.mode(), NavBallMode::Surface);
    }

    #[test]
    fn test_regime_crossing_inactive_on_target() {
        let mut indicator = LocalNavBall::new(NavBallMode::Target);
        let mut controller = NavBallController::new(NavBallMode::Target);
        assert!(!controller.on_regime_crossing(&mut indicator, false));
        assert!(!controller.on_regime_crossing(&mut indicator, true));
        assert_eq!(indicator.mode(), NavBallMode::Target);
    }

    #[test]
    fn test_regime_crossing_moves_surface_and_orbit() {
        let mut indicator = LocalNavBall::default();
        let mut controller = NavBallController::new(NavBallMode::Surface);
        assert!(controller.on_regime_crossing(&mut indicator, false));
        assert_eq!(indicator.mode(), NavBallMode::Orbit);
        assert!(controller.on_regime_crossing(&mut indicator, true));
        assert_eq!(indicator.mode(), NavBallMode::Surface);
        // Already on the implied side: nothing to do.
        assert!(!controller.on_regime_crossing(&mut indicator, true));
    }

    #[test]
    fn test_fix_demotes_stale_target() {
        let mut indicator = LocalNavBall::new(NavBallMode::Target);
        let mut controller = NavBallController::new(NavBallMode::Target);
        assert!(controller.fix(&mut indicator, false, SpeedMode::Orbit, false, false));
        assert_eq!(indicator.mode(), NavBallMode::Orbit);
    }

    #[test]
    fn test_fix_sync_reapplies_mapping() {
        let mut indicator = LocalNavBall::new(NavBallMode::Surface);
        let mut controller = NavBallController::new(NavBallMode::Surface);
        assert!(controller.fix(&mut indicator, true, SpeedMode::Target, true, false));
        assert_eq!(indicator.mode(), NavBallMode::Target);
    }

    fn speed_mode_strategy() -> impl Strategy<Value = SpeedMode> {
        prop_oneof![
            Just(SpeedMode::SurfaceTas),
            Just(SpeedMode::SurfaceIas),
            Just(SpeedMode::SurfaceEas),
            Just(SpeedMode::SurfaceQ),
            Just(SpeedMode::Vertical),
            Just(SpeedMode::Orbit),
            Just(SpeedMode::Target),
        ]
    }

    fn navball_mode_strategy() -> impl Strategy<Value = NavBallMode> {
        prop_oneof![
            Just(NavBallMode::Surface),
            Just(NavBallMode::Orbit),
            Just(NavBallMode::Target),
        ]
    }

    proptest! {
        // Property: after apply_sync, commanded and observed both equal
        // the mapping of the speed mode, regardless of prior drift.
        #[test]
        fn prop_apply_sync_converges(
            speed_mode in speed_mode_strategy(),
            observed in navball_mode_strategy(),
            commanded in navball_mode_strategy(),
        ) {
            let mut indicator = LocalNavBall::new(observed);
            let mut controller = NavBallController::new(commanded);
            controller.apply_sync(&mut indicator, speed_mode);

            let expected = NavBallController::sync_target(speed_mode);
            prop_assert_eq!(controller.commanded(), expected);
            prop_assert_eq!(indicator.mode(), expected);
        }

        // Property: enforcement always restores observed == commanded.
        #[test]
        fn prop_enforce_restores_commanded(
            observed in navball_mode_strategy(),
            commanded in navball_mode_strategy(),
        ) {
            let mut indicator = LocalNavBall::new(observed);
            let mut controller = NavBallController::new(commanded);
            controller.enforce(&mut indicator);
            prop_assert_eq!(indicator.mode(), controller.commanded());
        }
    }
}
