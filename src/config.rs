//! Configuration module for persistent settings.
//!
//! Settings mirror the three pages the host exposes to the user: general
//! behavior (automatic switching, navball policy), display modes, and
//! per-unit enable/precision flags. The body-threshold table is loaded
//! once at startup and stays immutable for the session.
//!
//! The configuration boundary enforces the invariants the runtime relies
//! on: at least one standard unit enabled, a standard and enabled default
//! unit, threshold percentage within 50-150.

use crate::error::ConfigError;
use crate::regime::AutoSwitchMode;
use crate::units::{SpeedUnit, UNIT_ORDER};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Maximum digit precision the renderer supports.
pub const MAX_DIGITS: u32 = 4;

/// General behavior settings.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralSettings {
    /// Automatic speed-mode switching policy.
    pub auto_switch: AutoSwitchMode,
    /// Altitude threshold percentage applied on top of the reference
    /// altitude (50-150, default 100).
    pub threshold_pct: u32,
    /// When true the navball mirrors the speed mode; when false it cycles
    /// independently.
    pub navball_sync: bool,
    /// Independent-policy navball auto-switching on regime crossings and
    /// target events.
    pub navball_auto_switch: bool,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            auto_switch: AutoSwitchMode::Custom,
            threshold_pct: 100,
            navball_sync: true,
            navball_auto_switch: true,
        }
    }
}

/// Per-mode enable flags for the manual cycle.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModeSettings {
    pub enable_vertical: bool,
    pub enable_ias: bool,
    pub enable_eas: bool,
    pub enable_q: bool,
    /// Digit precision for the dynamic-pressure readout.
    pub digits_q: u32,
}

impl Default for ModeSettings {
    fn default() -> Self {
        Self {
            enable_vertical: true,
            enable_ias: false,
            enable_eas: false,
            enable_q: false,
            digits_q: 1,
        }
    }
}

/// Per-unit enable flags and digit precision, plus the default unit.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UnitSettings {
    pub default_unit: SpeedUnit,
    pub enable_ms: bool,
    pub digits_ms: u32,
    pub enable_kmh: bool,
    pub digits_kmh: u32,
    pub enable_mph: bool,
    pub digits_mph: u32,
    pub enable_knots: bool,
    pub digits_knots: u32,
    pub enable_fts: bool,
    pub digits_fts: u32,
    pub enable_mach: bool,
    pub digits_mach: u32,
}

impl Default for UnitSettings {
    fn default() -> Self {
        Self {
            default_unit: SpeedUnit::Ms,
            enable_ms: true,
            digits_ms: 1,
            enable_kmh: true,
            digits_kmh: 0,
            enable_mph: false,
            digits_mph: 0,
            enable_knots: false,
            digits_knots: 0,
            enable_fts: false,
            digits_fts: 1,
            enable_mach: true,
            digits_mach: 2,
        }
    }
}

impl UnitSettings {
    pub fn unit_enabled(&self, unit: SpeedUnit) -> bool {
        match unit {
            SpeedUnit::Ms => self.enable_ms,
            SpeedUnit::Kmh => self.enable_kmh,
            SpeedUnit::Mph => self.enable_mph,
            SpeedUnit::Knots => self.enable_knots,
            SpeedUnit::Fts => self.enable_fts,
            SpeedUnit::Mach => self.enable_mach,
        }
    }

    pub fn set_unit_enabled(&mut self, unit: SpeedUnit, enabled: bool) {
        match unit {
            SpeedUnit::Ms => self.enable_ms = enabled,
            SpeedUnit::Kmh => self.enable_kmh = enabled,
            SpeedUnit::Mph => self.enable_mph = enabled,
            SpeedUnit::Knots => self.enable_knots = enabled,
            SpeedUnit::Fts => self.enable_fts = enabled,
            SpeedUnit::Mach => self.enable_mach = enabled,
        }
    }

    pub fn unit_digits(&self, unit: SpeedUnit) -> u32 {
        match unit {
            SpeedUnit::Ms => self.digits_ms,
            SpeedUnit::Kmh => self.digits_kmh,
            SpeedUnit::Mph => self.digits_mph,
            SpeedUnit::Knots => self.digits_knots,
            SpeedUnit::Fts => self.digits_fts,
            SpeedUnit::Mach => self.digits_mach,
        }
    }

    fn enabled_standard_count(&self) -> usize {
        UNIT_ORDER
            .iter()
            .filter(|u| u.is_standard() && self.unit_enabled(**u))
            .count()
    }

    fn max_digits(&self) -> u32 {
        [
            self.digits_ms,
            self.digits_kmh,
            self.digits_mph,
            self.digits_knots,
            self.digits_fts,
            self.digits_mach,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Complete controller configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub modes: ModeSettings,
    pub units: UnitSettings,
}

impl Settings {
    /// Validate configuration values.
    /// Returns Ok(()) if valid, Err with descriptive message if invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(50..=150).contains(&self.general.threshold_pct) {
            return Err(ConfigError::ValidationError(format!(
                "threshold_pct ({}) must be within 50-150",
                self.general.threshold_pct
            )));
        }

        if self.units.max_digits() > MAX_DIGITS || self.modes.digits_q > MAX_DIGITS {
            return Err(ConfigError::ValidationError(format!(
                "digit precision must not exceed {}",
                MAX_DIGITS
            )));
        }

        if self.units.enabled_standard_count() == 0 {
            return Err(ConfigError::ValidationError(
                "at least one standard unit must remain enabled".to_string(),
            ));
        }

        if !self.units.default_unit.is_standard() {
            return Err(ConfigError::ValidationError(format!(
                "default unit '{}' must be a standard unit",
                self.units.default_unit.name()
            )));
        }

        if !self.units.unit_enabled(self.units.default_unit) {
            return Err(ConfigError::ValidationError(format!(
                "default unit '{}' is disabled",
                self.units.default_unit.name()
            )));
        }

        Ok(())
    }
}

/// Settings store with file I/O.
///
/// Mutations are serialized with ticks by the host, so no interior
/// locking is needed.
pub struct SettingsStore {
    settings: Settings,
    path: PathBuf,
}

impl SettingsStore {
    /// Load settings from file or use defaults.
    /// If the file doesn't exist, returns a store with default settings.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        let settings = if path.exists() {
            let contents = fs::read_to_string(path).map_err(|e| {
                ConfigError::ParseError(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(format!("Invalid JSON: {}", e)))?;

            settings.validate()?;
            settings
        } else {
            Settings::default()
        };

        Ok(Self {
            settings,
            path: path.to_path_buf(),
        })
    }

    /// Save settings to file using atomic write.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Atomic write: write to temp file, then rename.
        let temp_path = self.path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(&self.settings)
            .map_err(|e| ConfigError::ParseError(format!("Failed to serialize settings: {}", e)))?;

        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }

        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }

    pub fn get(&self) -> Settings {
        self.settings.clone()
    }

    /// Update settings with validation and persist.
    pub fn update(&mut self, settings: Settings) -> Result<(), ConfigError> {
        settings.validate()?;
        self.settings = settings;
        self.save()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default settings path under the user config directory.
    pub fn default_path() -> PathBuf {
        config_dir().join("settings.json")
    }
}

/// Per-body altitude overrides for the custom switching policy, in meters.
///
/// Populated once at startup; lookup misses fall back to the
/// physics-derived default inside the regime classifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyThresholds {
    map: HashMap<String, f64>,
}

impl BodyThresholds {
    pub fn from_map(map: HashMap<String, f64>) -> Self {
        Self { map }
    }

    /// Load the table from a JSON object of body name to altitude.
    /// Missing or malformed files yield an empty table.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No body-threshold table at {:?}, using physics defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, f64>>(&contents) {
                Ok(map) => {
                    info!("Loaded {} body thresholds from {:?}", map.len(), path);
                    Self { map }
                }
                Err(e) => {
                    warn!("Failed to parse body thresholds: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read body thresholds: {}, using defaults", e);
                Self::default()
            }
        }
    }

    pub fn get(&self, body: &str) -> Option<f64> {
        self.map.get(body).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Default table path under the user config directory.
    pub fn default_path() -> PathBuf {
        config_dir().join("bodies.json")
    }
}

/// Get the config directory path.
fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("speedhud")
}

// Custom serialization for SpeedUnit: settings files use the short names.
impl Serialize for SpeedUnit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SpeedUnit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SpeedUnit::from_name(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid unit: {}, expected one of: ms, kmh, mph, knots, fts, mach",
                s
            ))
        })
    }
}

impl Serialize for AutoSwitchMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let s = match self {
            AutoSwitchMode::Off => "off",
            AutoSwitchMode::Stock => "stock",
            AutoSwitchMode::Custom => "custom",
        };
        serializer.serialize_str(s)
    }
}

impl<'de> Deserialize<'de> for AutoSwitchMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "off" => Ok(AutoSwitchMode::Off),
            "stock" => Ok(AutoSwitchMode::Stock),
            "custom" => Ok(AutoSwitchMode::Custom),
            _ => Err(serde::de::Error::custom(format!(
                "invalid auto-switch mode: {}, expected one of: off, stock, custom",
                s
            ))),
        }
    }
}
