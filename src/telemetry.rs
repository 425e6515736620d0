//! Telemetry contracts consumed from the simulation.
//!
//! The controller never reaches into the simulation itself; it receives one
//! [`VesselSample`] per tick and an optional aerodynamics data source
//! injected once at session start.

/// Minimal 3-component vector, enough for the target approach-sign rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Per-tick kinematic snapshot of the active vehicle.
///
/// All speeds are in m/s, altitudes and distances in meters. `target_*`
/// fields are only meaningful while `target_present` is true.
#[derive(Debug, Clone, PartialEq)]
pub struct VesselSample {
    pub surface_speed: f64,
    pub vertical_speed: f64,
    pub orbital_speed: f64,
    pub mach_number: f64,
    pub altitude: f64,
    pub landed_or_splashed: bool,
    pub body_name: String,
    pub body_radius: f64,
    pub body_has_atmosphere: bool,
    pub atmosphere_depth: f64,
    pub target_present: bool,
    pub target_relative_speed: f64,
    pub ship_velocity: Vec3,
    pub target_velocity: Vec3,
    pub ship_position: Vec3,
    pub target_position: Vec3,
}

impl Default for VesselSample {
    fn default() -> Self {
        Self {
            surface_speed: 0.0,
            vertical_speed: 0.0,
            orbital_speed: 0.0,
            mach_number: 0.0,
            altitude: 0.0,
            landed_or_splashed: true,
            body_name: String::new(),
            body_radius: 0.0,
            body_has_atmosphere: false,
            atmosphere_depth: 0.0,
            target_present: false,
            target_relative_speed: 0.0,
            ship_velocity: Vec3::ZERO,
            target_velocity: Vec3::ZERO,
            ship_position: Vec3::ZERO,
            target_position: Vec3::ZERO,
        }
    }
}

/// Optional aerodynamics-analysis capability.
///
/// Availability may change mid-session; callers re-check `available()`
/// every tick. Implementations never fail: an absent capability reports
/// `false` and zeros.
pub trait AeroSource {
    fn available(&self) -> bool;

    /// Indicated airspeed in m/s.
    fn indicated_airspeed(&self) -> f64;

    /// Equivalent airspeed in m/s.
    fn equivalent_airspeed(&self) -> f64;

    /// Dynamic pressure in kPa.
    fn dynamic_pressure(&self) -> f64;
}

/// The absent capability: everything reads as unavailable/zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAero;

impl AeroSource for NoAero {
    fn available(&self) -> bool {
        false
    }

    fn indicated_airspeed(&self) -> f64 {
        0.0
    }

    fn equivalent_airspeed(&self) -> f64 {
        0.0
    }

    fn dynamic_pressure(&self) -> f64 {
        0.0
    }
}
