//! Readout formatting.
//!
//! Pure function from the telemetry sample and the active mode/unit to a
//! formatted string. Values are truncated toward zero (never rounded) at
//! the configured digit precision, and signed modes get an explicit `+`
//! for non-negative values.

use crate::config::Settings;
use crate::speed_mode::SpeedMode;
use crate::telemetry::{AeroSource, VesselSample};
use crate::units::SpeedUnit;
use std::fmt::Write;

/// Dynamic pressure has no unit choice; the symbol is fixed.
pub const Q_SYMBOL: &str = " kPa";

const POW10: [f64; 5] = [1.0, 10.0, 100.0, 1000.0, 10000.0];

/// Truncate toward zero at `digits` decimal places. Negative zero is
/// normalized to zero, so -0.5 at 0 digits displays as "+0"/"0", not "-0".
pub fn truncate(value: f64, digits: u32) -> f64 {
    let digits = (digits as usize).min(POW10.len() - 1);
    let factor = POW10[digits];
    (value * factor).trunc() / factor + 0.0
}

/// Formats the speed readout. Holds a reusable output buffer.
#[derive(Debug, Default)]
pub struct Renderer {
    buf: String,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the readout for one tick. The returned slice borrows the
    /// internal buffer and is valid until the next call.
    pub fn render(
        &mut self,
        sample: &VesselSample,
        aero: &dyn AeroSource,
        mode: SpeedMode,
        unit: SpeedUnit,
        settings: &Settings,
    ) -> &str {
        self.buf.clear();

        let (value, digits, symbol) = match mode {
            SpeedMode::SurfaceQ => (
                aero.dynamic_pressure(),
                settings.modes.digits_q,
                Q_SYMBOL,
            ),
            _ => {
                let base = Self::base_value(sample, aero, mode);
                if unit == SpeedUnit::Mach {
                    // Mach is measured directly, not derived from the
                    // base speed.
                    (sample.mach_number, settings.units.unit_digits(unit), unit.symbol())
                } else {
                    (
                        base * unit.multiplier(),
                        settings.units.unit_digits(unit),
                        unit.symbol(),
                    )
                }
            }
        };

        let digits = (digits as usize).min(POW10.len() - 1);
        let value = truncate(value, digits as u32);

        if value >= 0.0 && matches!(mode, SpeedMode::Vertical | SpeedMode::Target) {
            self.buf.push('+');
        }

        // Writing to a String cannot fail.
        let _ = write!(self.buf, "{:.*}{}", digits, value, symbol);
        &self.buf
    }

    /// Raw m/s value for the active mode, before unit conversion.
    fn base_value(sample: &VesselSample, aero: &dyn AeroSource, mode: SpeedMode) -> f64 {
        match mode {
            SpeedMode::SurfaceTas => sample.surface_speed,
            SpeedMode::SurfaceIas => aero.indicated_airspeed(),
            SpeedMode::SurfaceEas => aero.equivalent_airspeed(),
            SpeedMode::SurfaceQ => aero.dynamic_pressure(),
            SpeedMode::Vertical => sample.vertical_speed,
            SpeedMode::Orbit => sample.orbital_speed,
            SpeedMode::Target => Self::signed_target_speed(sample),
        }
    }

    /// Relative speed to the lock, negated while the target approaches:
    /// positive dot product between the relative velocity and the
    /// line of sight means closing.
    fn signed_target_speed(sample: &VesselSample) -> f64 {
        let mut value = sample.target_relative_speed;
        if sample.target_present {
            let rel_velocity = sample.ship_velocity.sub(sample.target_velocity);
            let to_target = sample.target_position.sub(sample.ship_position);
            if rel_velocity.dot(to_target) > 0.0 {
                value = -value;
            }
        }
        value
    }
}
