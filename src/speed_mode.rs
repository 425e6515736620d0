//! Speed-mode state machine for the primary readout.
//!
//! Owns the active speed mode and defines every transition: the manual
//! cycle with gated skips, target acquired/lost overrides, regime-crossing
//! auto switches, and the validity sweep that demotes a mode whose
//! enabling condition disappeared. Each transition reports whether it
//! changed the mode so the session can run the follow-up effects (unit
//! fix, navball sync) exactly once.

use crate::config::ModeSettings;
use crate::locale::keys;
use tracing::debug;

/// Closed set of speed modes for the primary readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMode {
    SurfaceTas,
    SurfaceIas,
    SurfaceEas,
    SurfaceQ,
    Vertical,
    Orbit,
    Target,
}

impl SpeedMode {
    /// The surface group: true airspeed plus the aerodynamics sub-modes.
    pub fn is_surface_group(self) -> bool {
        matches!(
            self,
            SpeedMode::SurfaceTas | SpeedMode::SurfaceIas | SpeedMode::SurfaceEas | SpeedMode::SurfaceQ
        )
    }

    /// Localization key for the readout title. The plain surface mode is
    /// titled "TAS" only when the aerodynamics capability can distinguish
    /// it from indicated airspeed.
    pub fn title_key(self, aero_available: bool) -> &'static str {
        match self {
            SpeedMode::SurfaceTas if aero_available => keys::SPEED_TAS,
            SpeedMode::SurfaceTas => keys::SPEED_SURFACE,
            SpeedMode::SurfaceIas => keys::SPEED_IAS,
            SpeedMode::SurfaceEas => keys::SPEED_EAS,
            SpeedMode::SurfaceQ => keys::SPEED_Q,
            SpeedMode::Vertical => keys::SPEED_VERTICAL,
            SpeedMode::Orbit => keys::SPEED_ORBIT,
            SpeedMode::Target => keys::SPEED_TARGET,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedMode::SurfaceTas => "surface_tas",
            SpeedMode::SurfaceIas => "surface_ias",
            SpeedMode::SurfaceEas => "surface_eas",
            SpeedMode::SurfaceQ => "surface_q",
            SpeedMode::Vertical => "vertical",
            SpeedMode::Orbit => "orbit",
            SpeedMode::Target => "target",
        }
    }
}

/// Preconditions for entering each optional mode, derived fresh from the
/// settings and the current capability state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeGates {
    pub ias: bool,
    pub eas: bool,
    pub q: bool,
    pub vertical: bool,
}

impl ModeGates {
    /// The aerodynamics sub-modes require both the enable flag and a live
    /// capability; vertical only its flag.
    pub fn new(modes: &ModeSettings, aero_available: bool) -> Self {
        Self {
            ias: modes.enable_ias && aero_available,
            eas: modes.enable_eas && aero_available,
            q: modes.enable_q && aero_available,
            vertical: modes.enable_vertical,
        }
    }

    /// Whether `mode` may be active under these gates. Always-available
    /// modes pass unconditionally.
    pub fn allows(&self, mode: SpeedMode) -> bool {
        match mode {
            SpeedMode::SurfaceIas => self.ias,
            SpeedMode::SurfaceEas => self.eas,
            SpeedMode::SurfaceQ => self.q,
            SpeedMode::Vertical => self.vertical,
            _ => true,
        }
    }
}

/// Owns the active speed mode for a session.
#[derive(Debug, Clone)]
pub struct SpeedModeController {
    mode: SpeedMode,
}

impl SpeedModeController {
    pub fn new(initial: SpeedMode) -> Self {
        Self { mode: initial }
    }

    pub fn mode(&self) -> SpeedMode {
        self.mode
    }

    /// Single write point. Equal-mode writes are no-ops, so follow-up
    /// effects never fire redundantly.
    pub fn set_mode(&mut self, new_mode: SpeedMode) -> bool {
        if self.mode == new_mode {
            return false;
        }
        debug!(from = self.mode.name(), to = new_mode.name(), "speed mode changed");
        self.mode = new_mode;
        true
    }

    /// Manual cycle in fixed order, skipping gated-out modes. `Target`
    /// only enters while a lock exists; the chain always terminates at
    /// `Orbit` or `SurfaceTas`.
    pub fn cycle(&mut self, gates: &ModeGates, target_locked: bool) -> bool {
        let next = match self.mode {
            SpeedMode::SurfaceTas => Self::first_surface_successor(
                gates,
                &[SpeedMode::SurfaceIas, SpeedMode::SurfaceEas, SpeedMode::SurfaceQ],
            ),
            SpeedMode::SurfaceIas => {
                Self::first_surface_successor(gates, &[SpeedMode::SurfaceEas, SpeedMode::SurfaceQ])
            }
            SpeedMode::SurfaceEas => Self::first_surface_successor(gates, &[SpeedMode::SurfaceQ]),
            SpeedMode::SurfaceQ => Self::first_surface_successor(gates, &[]),
            SpeedMode::Vertical => SpeedMode::Orbit,
            SpeedMode::Orbit => {
                if target_locked {
                    SpeedMode::Target
                } else {
                    SpeedMode::SurfaceTas
                }
            }
            SpeedMode::Target => SpeedMode::SurfaceTas,
        };
        self.set_mode(next)
    }

    /// Next mode after a surface-group member: the first gated-in
    /// candidate, then vertical, then orbit.
    fn first_surface_successor(gates: &ModeGates, candidates: &[SpeedMode]) -> SpeedMode {
        for candidate in candidates {
            if gates.allows(*candidate) {
                return *candidate;
            }
        }
        if gates.vertical {
            SpeedMode::Vertical
        } else {
            SpeedMode::Orbit
        }
    }

    /// Target lock appeared. Forces `Target` unless automatic switching
    /// is disabled.
    pub fn on_target_acquired(&mut self, auto_switch_enabled: bool) -> bool {
        if auto_switch_enabled {
            self.set_mode(SpeedMode::Target)
        } else {
            false
        }
    }

    /// Target lock disappeared. Reverts out of `Target` to the mode the
    /// current regime implies.
    pub fn on_target_lost(&mut self, in_surface_regime: bool) -> bool {
        if self.mode == SpeedMode::Target {
            self.set_mode(Self::regime_default(in_surface_regime))
        } else {
            false
        }
    }

    /// Regime crossing. Downward crossings pull `Orbit` back to surface
    /// TAS; upward crossings push any surface-group mode to `Orbit`.
    pub fn on_regime_crossing(&mut self, to_surface: bool) -> bool {
        if to_surface {
            if self.mode == SpeedMode::Orbit {
                return self.set_mode(SpeedMode::SurfaceTas);
            }
        } else if self.mode.is_surface_group() {
            return self.set_mode(SpeedMode::Orbit);
        }
        false
    }

    /// Validity sweep after settings or capability changes: demote a mode
    /// whose enabling condition no longer holds.
    pub fn revalidate(&mut self, gates: &ModeGates, in_surface_regime: bool) -> bool {
        if gates.allows(self.mode) {
            return false;
        }
        debug!(mode = self.mode.name(), "active mode no longer valid, demoting");
        self.set_mode(Self::regime_default(in_surface_regime))
    }

    fn regime_default(in_surface_regime: bool) -> SpeedMode {
        if in_surface_regime {
            SpeedMode::SurfaceTas
        } else {
            SpeedMode::Orbit
        }
    }
}
