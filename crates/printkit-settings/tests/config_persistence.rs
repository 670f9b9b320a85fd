//! Saving and loading configuration files

use printkit_core::AxisLimits;
use printkit_settings::{Config, SettingsError};
use tempfile::tempdir;

fn customized() -> Config {
    let mut config = Config::new();
    config.kinematics.max_velocity = AxisLimits::new(300.0, 300.0, 10.0, 40.0);
    config.loading.progress_interval_ms = 100;
    config.leveling.bed_size_mm = [250.0, 210.0];
    config.leveling.probe_z_offset_mm = 0.35;
    config
}

#[test]
fn test_toml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let config = customized();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_json_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = customized();
    config.save_to_file(&path).unwrap();
    assert_eq!(Config::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_unsupported_extension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.ini");

    let err = Config::new().save_to_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Config(_)));
    assert!(!path.exists());
}

#[test]
fn test_invalid_file_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[leveling]\nbed_size_mm = [0.0, 100.0]\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::Config(_))
    ));

    std::fs::write(&path, "[loading\n").unwrap();
    assert!(matches!(
        Config::load_from_file(&path),
        Err(SettingsError::TomlError(_))
    ));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = Config::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}
