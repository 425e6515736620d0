//! Speed readout and navball mode controller for flight-simulation HUDs.
//!
//! The crate owns the mode state behind a HUD speed indicator: which speed
//! is displayed (surface, vertical, orbital, target-relative or an
//! aerodynamics sub-mode), in which unit, and which reference frame the
//! attitude indicator (navball) shows. The host feeds one telemetry
//! sample per frame and forwards clicks; the session returns the
//! formatted readout and title strings.
//!
//! Highlights:
//! - Hysteresis-driven altitude-regime classification with per-body
//!   reference altitudes, so automatic mode switching never chatters.
//! - A navball controller that either mirrors the speed mode or runs its
//!   own cycle with anti-flicker enforcement against external writes.
//! - Validated, JSON-persisted settings with atomic writes.
//!
//! Entry point: build a [`session::HudSession`] from settings and the
//! injected host capabilities, then drive it with
//! [`session::HudSession::on_tick`] and [`session::HudSession::on_click`].

pub mod config;
pub mod error;
pub mod locale;
pub mod logging;
pub mod navball;
pub mod regime;
pub mod render;
pub mod session;
pub mod speed_mode;
pub mod telemetry;
pub mod units;

pub use config::{BodyThresholds, Settings, SettingsStore};
pub use error::ConfigError;
pub use locale::{KeyLocalizer, Localizer};
pub use navball::{LocalNavBall, NavBallIndicator, NavBallMode};
pub use regime::AutoSwitchMode;
pub use session::{ClickButton, ClickRegion, HudSession, StateSnapshot, TickOutput};
pub use speed_mode::SpeedMode;
pub use telemetry::{AeroSource, NoAero, Vec3, VesselSample};
pub use units::SpeedUnit;
