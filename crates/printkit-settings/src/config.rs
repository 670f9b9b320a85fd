//! Configuration for PrintKit
//!
//! Supports JSON and TOML files; the format is chosen from the file
//! extension. The default file lives in the platform configuration
//! directory.
//!
//! Configuration is organized into sections:
//! - Kinematic limits used by the print-time estimator
//! - Loading defaults (progress interval, filament assumptions)
//! - Bed leveling geometry

use printkit_core::KinematicLimits;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Directory name under the platform configuration directory
pub const APP_DIR_NAME: &str = "printkit";

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// File loading defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingSettings {
    /// Minimum time between progress reports, in milliseconds
    pub progress_interval_ms: u64,
    /// Filament diameter used when a file does not state one
    pub default_filament_diameter_mm: f64,
    /// Material density for weight estimates
    pub filament_density_g_per_cm3: f64,
}

impl Default for LoadingSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 200,
            default_filament_diameter_mm: 1.75,
            filament_density_g_per_cm3: 1.24,
        }
    }
}

impl LoadingSettings {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

/// Bed leveling geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelingSettings {
    /// Printable bed size [x, y] in mm
    pub bed_size_mm: [f64; 2],
    /// Height of the probe trigger point above the nozzle tip
    pub probe_z_offset_mm: f64,
}

impl Default for LevelingSettings {
    fn default() -> Self {
        Self {
            bed_size_mm: [200.0, 200.0],
            probe_z_offset_mm: 0.0,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Print-time estimator limits
    pub kinematics: KinematicLimits,
    /// Loading defaults
    pub loading: LoadingSettings,
    /// Bed leveling geometry
    pub leveling: LevelingSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no platform configuration directory".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            ConfigFormat::Json => serde_json::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded {} config from {}", format, path.display());
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = ConfigFormat::from_path(path)?;

        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        tracing::debug!("Saved {} config to {}", format, path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.kinematics.validate()?;

        if self.loading.progress_interval_ms == 0 {
            return Err(ConfigError::out_of_range(
                "loading.progress_interval_ms",
                self.loading.progress_interval_ms,
            ));
        }
        if !(self.loading.default_filament_diameter_mm > 0.0) {
            return Err(ConfigError::out_of_range(
                "loading.default_filament_diameter_mm",
                self.loading.default_filament_diameter_mm,
            ));
        }
        if !(self.loading.filament_density_g_per_cm3 > 0.0) {
            return Err(ConfigError::out_of_range(
                "loading.filament_density_g_per_cm3",
                self.loading.filament_density_g_per_cm3,
            ));
        }

        let [bed_x, bed_y] = self.leveling.bed_size_mm;
        if !(bed_x > 0.0 && bed_y > 0.0) {
            return Err(ConfigError::out_of_range(
                "leveling.bed_size_mm",
                format!("[{}, {}]", bed_x, bed_y),
            ));
        }
        if !self.leveling.probe_z_offset_mm.is_finite() {
            return Err(ConfigError::out_of_range(
                "leveling.probe_z_offset_mm",
                self.leveling.probe_z_offset_mm,
            ));
        }

        Ok(())
    }
}
