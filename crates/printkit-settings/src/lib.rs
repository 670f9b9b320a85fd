//! PrintKit Settings Crate
//!
//! Handles application configuration: kinematic limits, loading defaults and
//! leveling geometry, persisted as TOML or JSON.

pub mod config;
pub mod error;

pub use config::{
    Config, ConfigFormat, LevelingSettings, LoadingSettings, APP_DIR_NAME, CONFIG_FILE_NAME,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
