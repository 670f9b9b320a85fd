//! # PrintKit
//!
//! A G-code ingestion and print-time analysis engine for 3D printer hosts:
//! - Line tokenizer and command parser with layer detection
//! - Kinematic print-time estimation with per-axis limits
//! - Read-only file model for progress, layer and filament queries
//! - Probe-mesh bed leveling for outbound motion commands
//!
//! ## Architecture
//!
//! PrintKit is organized as a workspace with multiple crates:
//!
//! 1. **printkit-core** - Errors, kinematic limits, progress and cancellation
//! 2. **printkit-gcode** - Tokenizer, parser, timing analyzer, file model
//! 3. **printkit-leveling** - Delaunay leveling surface and line rewriting
//! 4. **printkit-settings** - TOML/JSON configuration
//! 5. **printkit** - This crate: re-exports, logging setup and the CLI

use std::fmt;
use std::path::{Path, PathBuf};

pub use printkit_core::{
    AxisLimits, CancellationToken, Error, KinematicLimits, KinematicsError, LevelingError, LoadError,
    ProgressCallback, ProgressMonitor, Result,
};
pub use printkit_gcode::{Bounds, GcodeFile, Instruction, LayerDetection, MovementType};
pub use printkit_leveling::{LevelingData, LevelingFunctions};
pub use printkit_settings::{Config, LevelingSettings, LoadingSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Environment variable that switches log output to JSON lines
pub const LOG_JSON_ENV: &str = "PRINTKIT_LOG_JSON";

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - stderr output, so stdout stays free for reports
/// - RUST_LOG environment variable support (default `info`)
/// - JSON lines instead of text when `PRINTKIT_LOG_JSON` is set
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if std::env::var_os(LOG_JSON_ENV).is_some() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_thread_names(true);
        registry.with(fmt_layer).try_init()?;
    }

    Ok(())
}

/// Build a leveling surface using the bed geometry from `config`
pub fn leveling_from_config(
    data: &LevelingData,
    config: &Config,
) -> std::result::Result<LevelingFunctions, LevelingError> {
    let [bed_x, bed_y] = config.leveling.bed_size_mm;
    LevelingFunctions::new(
        data,
        glam::DVec2::new(bed_x, bed_y),
        config.leveling.probe_z_offset_mm,
    )
}

/// Headline numbers for a loaded job
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub path: PathBuf,
    pub line_count: usize,
    pub layer_count: usize,
    pub total_seconds: f64,
    pub filament_diameter_mm: f64,
    pub filament_mm: f64,
    pub filament_cubic_mm: f64,
    pub filament_grams: f64,
    pub bounds: Option<Bounds>,
}

impl JobSummary {
    /// Summarize `file` using the loading defaults from `config`
    pub fn new(path: &Path, file: &GcodeFile, config: &Config) -> Self {
        let diameter = file
            .detected_filament_diameter()
            .unwrap_or(config.loading.default_filament_diameter_mm);

        Self {
            path: path.to_path_buf(),
            line_count: file.line_count(),
            layer_count: file.layer_count(),
            total_seconds: file.total_seconds(),
            filament_diameter_mm: diameter,
            filament_mm: file.filament_used_mm(diameter),
            filament_cubic_mm: file.filament_cubic_mm(diameter),
            filament_grams: file
                .filament_weight_grams(diameter, config.loading.filament_density_g_per_cm3),
            bounds: file.bounds(),
        }
    }
}

/// Format seconds as `H:MM:SS`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File:            {}", self.path.display())?;
        writeln!(f, "Instructions:    {}", self.line_count)?;
        writeln!(f, "Layers:          {}", self.layer_count)?;
        writeln!(f, "Estimated time:  {}", format_duration(self.total_seconds))?;
        writeln!(
            f,
            "Filament:        {:.1} mm ({:.2} mm), {:.1} cm³, {:.1} g",
            self.filament_mm,
            self.filament_diameter_mm,
            self.filament_cubic_mm / 1000.0,
            self.filament_grams
        )?;
        match self.bounds {
            Some(bounds) => write!(
                f,
                "Bounds:          X {:.2}..{:.2}  Y {:.2}..{:.2}",
                bounds.min.x, bounds.max.x, bounds.min.y, bounds.max.y
            ),
            None => write!(f, "Bounds:          (empty)"),
        }
    }
}
