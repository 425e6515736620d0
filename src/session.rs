//! Active-session state bundle and orchestration.
//!
//! [`HudSession`] owns every piece of mode state for the active vehicle
//! and advances the whole machine once per simulation frame. There is no
//! ambient global: collaborators inject the aerodynamics capability, the
//! localization lookup and the external indicator handle once at session
//! start, and the host drives the session by reference.
//!
//! Tick order matches the per-frame flow: regime classification, target
//! transitions, regime crossings, validity sweep, navball sync or
//! enforcement, then rendering. Every mutation completes synchronously
//! inside the tick that triggers it.

use crate::config::{BodyThresholds, Settings};
use crate::locale::Localizer;
use crate::navball::{NavBallController, NavBallIndicator, NavBallMode};
use crate::regime::{AutoSwitchMode, RegimeClassifier};
use crate::render::Renderer;
use crate::speed_mode::{ModeGates, SpeedMode, SpeedModeController};
use crate::telemetry::{AeroSource, VesselSample};
use crate::units::{SpeedUnit, UnitSelector};
use tracing::{debug, info};

/// Clickable screen regions exposed by the HUD layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickRegion {
    SpeedReadout,
    IndicatorArea,
}

/// Mouse buttons the HUD forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickButton {
    Left,
    Right,
}

/// Read-only snapshot of the mode state, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSnapshot {
    pub mode: SpeedMode,
    pub unit: SpeedUnit,
    pub navball: NavBallMode,
}

/// Output of one tick: the formatted readout and the two title strings.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub readout: String,
    pub speed_title: String,
    pub navball_title: String,
}

/// Session state for the active vehicle.
pub struct HudSession {
    settings: Settings,
    thresholds: BodyThresholds,
    aero: Box<dyn AeroSource>,
    locale: Box<dyn Localizer>,
    indicator: Box<dyn NavBallIndicator>,
    speed: SpeedModeController,
    units: UnitSelector,
    navball: NavBallController,
    regime: RegimeClassifier,
    renderer: Renderer,
    target_present: bool,
}

impl HudSession {
    /// Start a session, deriving the initial mode state from the first
    /// telemetry sample: a lock forces `Target`, otherwise the regime
    /// picks `SurfaceTas` or `Orbit`. The navball is seeded from the
    /// indicator's observed mode and corrected out of a stale `Target`.
    pub fn new(
        settings: Settings,
        thresholds: BodyThresholds,
        aero: Box<dyn AeroSource>,
        locale: Box<dyn Localizer>,
        mut indicator: Box<dyn NavBallIndicator>,
        first: &VesselSample,
    ) -> Self {
        let mut regime = RegimeClassifier::new();
        // No mode exists yet; classify on the surface side of the
        // dead-zone, as a fresh readout starts in the surface group.
        let surface = regime
            .update(first, &settings.general, &thresholds, true)
            .surface;

        let mode = if first.target_present {
            SpeedMode::Target
        } else if surface {
            SpeedMode::SurfaceTas
        } else {
            SpeedMode::Orbit
        };

        let mut navball = NavBallController::new(indicator.mode());
        if first.target_present {
            if settings.general.navball_sync || settings.general.navball_auto_switch {
                navball.set_mode(indicator.as_mut(), NavBallMode::Target);
            }
        } else if navball.commanded() == NavBallMode::Target {
            // Indicator stuck in target mode with no lock.
            let fallback = if surface {
                NavBallMode::Surface
            } else {
                NavBallMode::Orbit
            };
            navball.set_mode(indicator.as_mut(), fallback);
        }

        let mut session = Self {
            units: UnitSelector::new(UnitSelector::preferred(mode, &settings.units)),
            speed: SpeedModeController::new(mode),
            settings,
            thresholds,
            aero,
            locale,
            indicator,
            navball,
            regime,
            renderer: Renderer::new(),
            target_present: first.target_present,
        };

        // Full validity pass before the first tick.
        let gates = session.gates();
        if session.speed.revalidate(&gates, surface) {
            session.after_mode_change();
        }
        session
            .units
            .fix_if_invalid(session.speed.mode(), &session.settings.units);
        session.fix_navball();

        info!(
            mode = session.speed.mode().name(),
            unit = session.units.active().name(),
            navball = session.navball.commanded().name(),
            "session started"
        );
        session
    }

    /// Advance the state machine by one frame and produce the readout.
    pub fn on_tick(&mut self, sample: &VesselSample) -> TickOutput {
        let gates = self.gates();
        let auto_switch = self.settings.general.auto_switch != AutoSwitchMode::Off;
        let sync = self.settings.general.navball_sync;
        let navball_auto = self.settings.general.navball_auto_switch;

        let regime = self.regime.update(
            sample,
            &self.settings.general,
            &self.thresholds,
            self.speed.mode().is_surface_group(),
        );

        // Target lock transitions. Only presence changes are observable;
        // a lock that swaps identity without a loss step is not an event.
        if sample.target_present != self.target_present {
            self.target_present = sample.target_present;
            if sample.target_present {
                debug!("target acquired");
                if self.speed.on_target_acquired(auto_switch) {
                    self.after_mode_change();
                }
                if !sync {
                    self.navball
                        .on_target_acquired(self.indicator.as_mut(), navball_auto);
                }
            } else {
                debug!("target lost");
                if self.speed.on_target_lost(regime.surface) {
                    self.after_mode_change();
                }
                if !sync {
                    self.navball
                        .on_target_lost(self.indicator.as_mut(), regime.surface);
                }
            }
        }

        // Altitude-regime crossings.
        if regime.crossed {
            if auto_switch && self.speed.on_regime_crossing(regime.surface) {
                self.after_mode_change();
            }
            if !sync && navball_auto {
                self.navball
                    .on_regime_crossing(self.indicator.as_mut(), regime.surface);
            }
        }

        // Validity sweep: demotes a surface sub-mode whose capability
        // disappeared mid-session.
        if self.speed.revalidate(&gates, regime.surface) {
            self.after_mode_change();
        }

        // Navball steady state: sync mirrors the speed mode, independent
        // policy corrects external drift.
        if sync {
            self.navball
                .apply_sync(self.indicator.as_mut(), self.speed.mode());
        } else {
            self.navball.enforce(self.indicator.as_mut());
        }

        let readout = self
            .renderer
            .render(
                sample,
                self.aero.as_ref(),
                self.speed.mode(),
                self.units.active(),
                &self.settings,
            )
            .to_string();

        TickOutput {
            readout,
            speed_title: self
                .locale
                .format(self.speed.mode().title_key(self.aero.available())),
            navball_title: self.locale.format(self.navball.commanded().title_key()),
        }
    }

    /// Handle a click on one of the two HUD regions.
    pub fn on_click(&mut self, region: ClickRegion, button: ClickButton) {
        match (region, button) {
            (ClickRegion::SpeedReadout, ClickButton::Left) => {
                let gates = self.gates();
                if self.speed.cycle(&gates, self.target_present) {
                    self.after_mode_change();
                }
            }
            (ClickRegion::SpeedReadout, ClickButton::Right) => {
                self.units
                    .cycle(self.speed.mode(), &self.settings.units);
            }
            (ClickRegion::IndicatorArea, ClickButton::Left) => {
                if !self.settings.general.navball_sync {
                    self.navball
                        .cycle(self.indicator.as_mut(), self.target_present);
                }
            }
            (ClickRegion::IndicatorArea, ClickButton::Right) => {}
        }
    }

    /// Apply refreshed settings and run the validity sweep.
    pub fn on_configuration_changed(&mut self, settings: Settings) {
        info!("settings applied, refreshing state");
        self.settings = settings;

        let gates = self.gates();
        if self
            .speed
            .revalidate(&gates, self.regime.in_surface_regime())
        {
            self.after_mode_change();
        }
        self.units
            .fix_if_invalid(self.speed.mode(), &self.settings.units);
        self.fix_navball();
    }

    /// Read-only snapshot for diagnostics and tests.
    pub fn state(&self) -> StateSnapshot {
        StateSnapshot {
            mode: self.speed.mode(),
            unit: self.units.active(),
            navball: self.navball.commanded(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn gates(&self) -> ModeGates {
        ModeGates::new(&self.settings.modes, self.aero.available())
    }

    /// Follow-up effects of an accepted speed-mode change: re-validate
    /// the unit and, under the sync policy, mirror the navball.
    fn after_mode_change(&mut self) {
        self.units
            .fix_if_invalid(self.speed.mode(), &self.settings.units);
        if self.settings.general.navball_sync {
            self.navball
                .apply_sync(self.indicator.as_mut(), self.speed.mode());
        }
    }

    fn fix_navball(&mut self) {
        self.navball.fix(
            self.indicator.as_mut(),
            self.settings.general.navball_sync,
            self.speed.mode(),
            self.target_present,
            self.regime.in_surface_regime(),
        );
    }
}
