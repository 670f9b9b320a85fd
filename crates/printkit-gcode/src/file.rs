//! Loaded G-code file model
//!
//! A [`GcodeFile`] is produced by one load (parse, then timing analysis) and
//! is read-only afterwards. It answers the questions a progress display or a
//! printer connection asks: which layer an instruction belongs to, how far
//! through the print it is, how much filament the job uses and how long it
//! has left.
//!
//! Derived values that need a full pass over the file are computed on first
//! use and cached, so the model can be shared between threads as-is.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Instant;

use glam::DVec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use printkit_core::{KinematicLimits, LoadError, ProgressMonitor};

use crate::instruction::{Instruction, MovementType};
use crate::parser::{GcodeParser, LayerDetection, ParsedGcode};
use crate::timing::KinematicAnalyzer;
use crate::tokenizer::{command_code, first_number_after, first_number_after_in, ScanScope};

/// Extension accepted by [`GcodeFile::load`], compared case-insensitively
pub const GCODE_EXTENSION: &str = "gcode";

/// Filament diameter assumed when the file does not state one (mm)
pub const DEFAULT_FILAMENT_DIAMETER: f64 = 1.75;

/// Layer height assumed when neither comments nor geometry give one (mm)
pub const DEFAULT_LAYER_HEIGHT: f64 = 0.5;

/// Highest value [`GcodeFile::percent_complete`] reports for a non-empty file
pub const MAX_PERCENT_IN_PROGRESS: f64 = 99.9;

/// Comment written by the slicer after the last printing move
pub const PRINT_END_SENTINEL: &str = "; MatterSlice Completed Successfully";

/// Number of lines at each end of the file searched for a diameter comment
const DIAMETER_SCAN_LINES: usize = 100;

const DIAMETER_MARKERS: [&str; 2] = ["filamentDiameter = ", "; filament_diameter = "];

/// Buffer size for reading large files (256 KB)
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Axis-aligned XY extent of all instructions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl Bounds {
    /// Width and depth of the box
    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Whether `point` lies inside the box, edges included
    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Immutable result of loading a G-code file
#[derive(Debug)]
pub struct GcodeFile {
    instructions: Vec<Instruction>,
    layer_starts: Vec<usize>,
    layer_heights: Vec<f64>,
    speeds: Vec<f64>,
    detection: LayerDetection,
    /// (diameter, filament length) of the last filament query
    filament_used: Mutex<Option<(f64, f64)>>,
    detected_diameter: OnceLock<Option<f64>>,
    print_end_index: OnceLock<usize>,
    bounds: OnceLock<Option<Bounds>>,
}

impl GcodeFile {
    /// Parse and analyze in-memory text.
    pub fn parse(text: &str, limits: &KinematicLimits) -> Self {
        let mut parsed = GcodeParser::parse_all(text);
        KinematicAnalyzer::new(*limits).annotate(&mut parsed.instructions);
        Self::from_parsed(parsed)
    }

    /// Parse and analyze in-memory text, reporting progress to `monitor`.
    ///
    /// # Errors
    /// Returns [`LoadError::Cancelled`] if the monitor observes cancellation.
    pub fn parse_with_monitor(
        text: &str,
        limits: &KinematicLimits,
        monitor: &mut ProgressMonitor,
    ) -> Result<Self, LoadError> {
        let mut parsed = GcodeParser::parse_str(text, monitor)?;
        KinematicAnalyzer::new(*limits).analyze(&mut parsed.instructions, monitor)?;
        monitor.ensure_not_cancelled()?;
        Ok(Self::from_parsed(parsed))
    }

    /// Read the whole stream and load it.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    ///
    /// # Errors
    /// Returns [`LoadError::Io`] if reading fails, or
    /// [`LoadError::Cancelled`] if the monitor observes cancellation.
    pub fn load_reader<R: Read>(
        mut reader: R,
        limits: &KinematicLimits,
        monitor: &mut ProgressMonitor,
    ) -> Result<Self, LoadError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let text = String::from_utf8_lossy(&bytes);
        if let std::borrow::Cow::Owned(_) = text {
            tracing::warn!("Input is not valid UTF-8; invalid bytes were replaced");
        }

        Self::parse_with_monitor(&text, limits, monitor)
    }

    /// Load a `.gcode` file from disk.
    ///
    /// # Errors
    /// Returns [`LoadError::UnsupportedExtension`] for any other extension,
    /// [`LoadError::Io`] if the file cannot be read, or
    /// [`LoadError::Cancelled`] if the monitor observes cancellation.
    pub fn load(
        path: impl AsRef<Path>,
        limits: &KinematicLimits,
        monitor: &mut ProgressMonitor,
    ) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !has_gcode_extension(path) {
            tracing::warn!("Refusing to load {}: not a .gcode file", path.display());
            return Err(LoadError::UnsupportedExtension {
                path: path.display().to_string(),
            });
        }

        let started = Instant::now();
        let result = File::open(path).map_err(LoadError::from).and_then(|file| {
            Self::load_reader(
                BufReader::with_capacity(READ_BUFFER_SIZE, file),
                limits,
                monitor,
            )
        });

        match &result {
            Ok(model) => tracing::info!(
                "Loaded {} ({} instructions, {} layers) in {:?}",
                path.display(),
                model.line_count(),
                model.layer_count(),
                started.elapsed()
            ),
            Err(LoadError::Cancelled) => {
                tracing::warn!("Load of {} cancelled", path.display())
            }
            Err(err) => tracing::warn!("Failed to load {}: {}", path.display(), err),
        }

        result
    }

    /// Load a file on the blocking thread pool.
    ///
    /// Yields `None` on any failure, cancellation included; the reason is
    /// logged.
    pub async fn load_async(
        path: impl Into<PathBuf>,
        limits: KinematicLimits,
        mut monitor: ProgressMonitor,
    ) -> Option<Self> {
        let path = path.into();
        let task = tokio::task::spawn_blocking(move || Self::load(&path, &limits, &mut monitor));

        match task.await {
            Ok(result) => result.ok(),
            Err(err) => {
                tracing::error!("Load task failed: {}", err);
                None
            }
        }
    }

    /// Re-run only the timing pass with different limits
    pub fn with_kinematics(mut self, limits: &KinematicLimits) -> Self {
        KinematicAnalyzer::new(*limits).annotate(&mut self.instructions);
        self
    }

    fn from_parsed(parsed: ParsedGcode) -> Self {
        Self {
            instructions: parsed.instructions,
            layer_starts: parsed.layer_starts,
            layer_heights: parsed.layer_heights,
            speeds: parsed.speeds,
            detection: parsed.detection,
            filament_used: Mutex::new(None),
            detected_diameter: OnceLock::new(),
            print_end_index: OnceLock::new(),
            bounds: OnceLock::new(),
        }
    }

    /// Number of instructions
    pub fn line_count(&self) -> usize {
        self.instructions.len()
    }

    /// Instruction at `index`.
    ///
    /// # Panics
    /// Panics if `index >= line_count()`; use [`GcodeFile::get`] for a
    /// checked lookup.
    pub fn instruction(&self, index: usize) -> &Instruction {
        &self.instructions[index]
    }

    pub fn get(&self, index: usize) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn detection(&self) -> LayerDetection {
        self.detection
    }

    /// Number of layers, at least 1
    pub fn layer_count(&self) -> usize {
        self.layer_starts.len()
    }

    /// Instruction index where each layer starts
    pub fn layer_starts(&self) -> &[usize] {
        &self.layer_starts
    }

    /// Heights recorded from `; LAYER_HEIGHT:` comments
    pub fn layer_heights(&self) -> &[f64] {
        &self.layer_heights
    }

    /// Distinct extruding feed rates, ascending (mm/min)
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// First instruction of `layer`, or the last instruction when the layer
    /// does not exist
    pub fn first_layer_instruction(&self, layer: usize) -> usize {
        self.layer_starts
            .get(layer)
            .copied()
            .unwrap_or_else(|| self.line_count().saturating_sub(1))
    }

    /// Layer containing `index`, or `None` past `line_count()`
    pub fn layer_index(&self, index: usize) -> Option<usize> {
        if index > self.line_count() {
            return None;
        }
        // layer_starts[0] == 0, so at least one start is <= index
        Some(self.layer_starts.partition_point(|&start| start <= index) - 1)
    }

    /// How far `index` is through its layer, in [0, 1]
    pub fn ratio_into_contained_layer(&self, index: usize) -> f64 {
        let Some(layer) = self.layer_index(index) else {
            return 0.0;
        };

        let start = self.layer_starts[layer];
        let end = match self.layer_starts.get(layer + 1) {
            Some(&next) => next,
            None => self.print_end_index(),
        };
        if end <= start {
            return 0.0;
        }

        ((index - start) as f64 / (end - start) as f64).clamp(0.0, 1.0)
    }

    /// Index where printing ends: the end sentinel at or after the last layer
    /// start, else the last instruction
    fn print_end_index(&self) -> usize {
        *self.print_end_index.get_or_init(|| {
            let last_start = self.layer_starts.last().copied().unwrap_or(0);
            self.instructions
                .get(last_start..)
                .and_then(|tail| {
                    tail.iter()
                        .position(|instruction| instruction.line.contains(PRINT_END_SENTINEL))
                })
                .map(|offset| last_start + offset)
                .unwrap_or_else(|| self.line_count().saturating_sub(1))
        })
    }

    /// Percentage of the file before `index`.
    ///
    /// Capped at [`MAX_PERCENT_IN_PROGRESS`]; an empty file reports 100.
    pub fn percent_complete(&self, index: usize) -> f64 {
        let count = self.line_count();
        if count == 0 {
            return 100.0;
        }
        (index as f64 / count as f64 * 100.0).min(MAX_PERCENT_IN_PROGRESS)
    }

    /// Net filament pushed through the extruder (mm).
    ///
    /// Re-walks the E words rather than trusting the resolved positions.
    /// Cached for the most recent `diameter`.
    pub fn filament_used_mm(&self, diameter: f64) -> f64 {
        let mut cache = self.filament_used.lock();
        if let Some((cached_diameter, length)) = *cache {
            if cached_diameter == diameter {
                return length;
            }
        }

        let length = self.walk_filament_length();
        *cache = Some((diameter, length));
        length
    }

    fn walk_filament_length(&self) -> f64 {
        let mut last_e = 0.0;
        let mut length = 0.0;

        for instruction in &self.instructions {
            let line = instruction.line.as_str();
            match command_code(line) {
                Some(code) if code.is_linear_move() => {
                    if let Some(e) = first_number_after("E", line) {
                        match instruction.movement_type {
                            MovementType::Absolute => {
                                length += e - last_e;
                                last_e = e;
                            }
                            MovementType::Relative => {
                                length += e;
                                last_e += e;
                            }
                        }
                    }
                }
                Some(code) if code.is_g(92) => {
                    if let Some(e) = first_number_after("E", line) {
                        last_e = e;
                    }
                }
                _ => {}
            }
        }

        length
    }

    /// Filament volume (mm³)
    pub fn filament_cubic_mm(&self, diameter: f64) -> f64 {
        let radius = diameter / 2.0;
        std::f64::consts::PI * radius * radius * self.filament_used_mm(diameter)
    }

    /// Filament weight (g) for a material density in g/cm³
    pub fn filament_weight_grams(&self, diameter: f64, density_g_per_cm3: f64) -> f64 {
        self.filament_cubic_mm(diameter) * density_g_per_cm3 / 1000.0
    }

    /// Diameter stated in the file's header or footer comments.
    ///
    /// The header is read top down and the footer bottom up, so the first
    /// header value or the last footer value wins.
    pub fn detected_filament_diameter(&self) -> Option<f64> {
        *self.detected_diameter.get_or_init(|| {
            let count = self.line_count();
            let head = self.instructions.iter().take(DIAMETER_SCAN_LINES);
            let tail_start = count
                .saturating_sub(DIAMETER_SCAN_LINES)
                .max(DIAMETER_SCAN_LINES)
                .min(count);
            let tail = self.instructions[tail_start..].iter().rev();

            head.chain(tail).find_map(|instruction| {
                DIAMETER_MARKERS.iter().find_map(|marker| {
                    first_number_after_in(marker, &instruction.line, ScanScope::WholeLine)
                })
            })
        })
    }

    /// Stated filament diameter, or [`DEFAULT_FILAMENT_DIAMETER`]
    pub fn filament_diameter(&self) -> f64 {
        self.detected_filament_diameter()
            .unwrap_or(DEFAULT_FILAMENT_DIAMETER)
    }

    /// XY extent of every instruction position, `None` for an empty file
    pub fn bounds(&self) -> Option<Bounds> {
        *self.bounds.get_or_init(|| {
            let mut positions = self.instructions.iter().map(|i| i.position.truncate());
            let first = positions.next()?;
            Some(positions.fold(Bounds { min: first, max: first }, |bounds, point| Bounds {
                min: bounds.min.min(point),
                max: bounds.max.max(point),
            }))
        })
    }

    /// Mean XY position of all instructions
    pub fn weighted_center(&self) -> DVec2 {
        if self.instructions.is_empty() {
            return DVec2::ZERO;
        }
        let sum: DVec2 = self
            .instructions
            .iter()
            .map(|instruction| instruction.position.truncate())
            .sum();
        sum / self.instructions.len() as f64
    }

    /// Whether the extruder advanced on line `index`
    pub fn is_extruding(&self, index: usize) -> bool {
        if index == 0 || index >= self.line_count() {
            return false;
        }
        self.instructions[index].e_position > self.instructions[index - 1].e_position
    }

    /// Height of `layer` (mm).
    ///
    /// Files with `LAYER_HEIGHT:` annotations answer from them alone, and a
    /// layer past the annotated ones has height 0.
    pub fn layer_height(&self, layer: usize) -> f64 {
        if !self.layer_heights.is_empty() {
            return self.layer_heights.get(layer).copied().unwrap_or(0.0);
        }

        match self.layer_starts.get(1..=2) {
            Some(&[second, third]) => {
                self.instructions[third].z() - self.instructions[second].z()
            }
            _ => DEFAULT_LAYER_HEIGHT,
        }
    }

    /// Top of `layer` above the bed (mm)
    pub fn layer_top(&self, layer: usize) -> f64 {
        (0..=layer).map(|index| self.layer_height(index)).sum()
    }

    /// Estimated duration of the whole file (s)
    pub fn total_seconds(&self) -> f64 {
        self.seconds_remaining(0)
    }

    /// Estimated time from the start of line `index` to the end (s)
    pub fn seconds_remaining(&self, index: usize) -> f64 {
        self.instructions
            .get(index)
            .map_or(0.0, |instruction| instruction.seconds_to_end_from_here)
    }

    /// Write every instruction's text back to `path`, one per line
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        tracing::debug!("Saved {} lines to {}", self.line_count(), path.display());
        Ok(())
    }

    /// Write every instruction's text to `writer`, one per line
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for instruction in &self.instructions {
            writeln!(writer, "{}", instruction.line)?;
        }
        Ok(())
    }
}

fn has_gcode_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case(GCODE_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO_A: &str = "G90\nG1 X0 Y0 Z0.2 F1200\nG1 X10 Y0 E1 F1200\n; LAYER:\nG1 X10 Y10 Z0.4 E2 F1200\n";

    fn parse(text: &str) -> GcodeFile {
        GcodeFile::parse(text, &KinematicLimits::default())
    }

    #[test]
    fn test_scenario_a_queries() {
        let file = parse(SCENARIO_A);
        assert_eq!(file.line_count(), 5);
        assert_eq!(file.layer_count(), 2);
        assert_eq!(file.layer_starts(), &[0, 3]);
        assert_eq!(file.instruction(4).z(), 0.4);
        assert_eq!(file.instruction(4).e_position, 2.0);
    }

    #[test]
    fn test_first_layer_instruction_clamps() {
        let file = parse(SCENARIO_A);
        assert_eq!(file.first_layer_instruction(0), 0);
        assert_eq!(file.first_layer_instruction(1), 3);
        assert_eq!(file.first_layer_instruction(7), 4);
    }

    #[test]
    fn test_layer_index_lookup() {
        let file = parse(SCENARIO_A);
        assert_eq!(file.layer_index(0), Some(0));
        assert_eq!(file.layer_index(2), Some(0));
        assert_eq!(file.layer_index(3), Some(1));
        assert_eq!(file.layer_index(5), Some(1));
        assert_eq!(file.layer_index(6), None);
    }

    #[test]
    fn test_percent_complete_bounds() {
        let file = parse(SCENARIO_A);
        assert_eq!(file.percent_complete(0), 0.0);
        assert!(file.percent_complete(4) < 100.0);
        assert_eq!(file.percent_complete(500), MAX_PERCENT_IN_PROGRESS);
        assert_eq!(parse("").percent_complete(0), 100.0);
    }

    #[test]
    fn test_ratio_into_layer() {
        let text = "G1 X1 E1 F600\n;LAYER:1\nG1 X2 E2\nG1 X3 E3\nG1 X4 E4\n; MatterSlice Completed Successfully\nM84\n";
        let file = parse(text);
        assert_eq!(file.layer_starts(), &[0, 1]);
        assert_eq!(file.ratio_into_contained_layer(0), 0.0);
        // Final layer runs from 1 to the sentinel at 5
        assert!((file.ratio_into_contained_layer(3) - 0.5).abs() < 1e-12);
        assert_eq!(file.ratio_into_contained_layer(6), 1.0);
        assert_eq!(file.ratio_into_contained_layer(99), 0.0);
    }

    #[test]
    fn test_ratio_without_sentinel_uses_last_line() {
        let file = parse("G1 Z0.2\nG1 X1\nG1 Z0.4\nG1 X1\nG1 X2\n");
        assert_eq!(file.layer_starts(), &[0, 2]);
        assert!((file.ratio_into_contained_layer(3) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_filament_accounting() {
        let file = parse("G1 X10 E5 F600\nG1 X20 E4\nG92 E0\nG1 X30 E3\nG91\nG1 X1 E2\n");
        // 5 - 1 + 3 + 2
        assert!((file.filament_used_mm(1.75) - 9.0).abs() < 1e-12);
        assert!((file.filament_used_mm(2.85) - 9.0).abs() < 1e-12);

        let cubic = file.filament_cubic_mm(2.0);
        assert!((cubic - std::f64::consts::PI * 9.0).abs() < 1e-9);
        let grams = file.filament_weight_grams(2.0, 1.24);
        assert!((grams - cubic * 1.24 / 1000.0).abs() < 1e-12);
    }

    #[test]
    fn test_filament_diameter_detection() {
        assert_eq!(parse("G28\n").filament_diameter(), DEFAULT_FILAMENT_DIAMETER);
        assert_eq!(parse("G28\n").detected_filament_diameter(), None);

        let header = parse("; filamentDiameter = 2.85\nG28\n");
        assert_eq!(header.filament_diameter(), 2.85);

        let mut text = String::from("G28\n");
        for index in 0..300 {
            text.push_str(&format!("G1 X{index}\n"));
        }
        text.push_str("; filament_diameter = 3\n");
        assert_eq!(parse(&text).filament_diameter(), 3.0);
    }

    #[test]
    fn test_last_footer_diameter_wins() {
        let mut text = String::new();
        for index in 0..300 {
            text.push_str(&format!("G1 X{index}\n"));
        }
        text.push_str("; filament_diameter = 2.85\nM84\n; filament_diameter = 1.75\n");
        assert_eq!(parse(&text).detected_filament_diameter(), Some(1.75));
    }

    #[test]
    fn test_diameter_in_middle_is_not_found() {
        let mut text = String::new();
        for index in 0..150 {
            text.push_str(&format!("G1 X{index}\n"));
        }
        text.push_str("; filament_diameter = 3\n");
        for index in 0..150 {
            text.push_str(&format!("G1 Y{index}\n"));
        }
        assert_eq!(parse(&text).detected_filament_diameter(), None);
    }

    #[test]
    fn test_bounds_and_center() {
        let file = parse("G1 X10 Y20\nG1 X-4 Y2\nG1 X6 Y8\n");
        let bounds = file.bounds().unwrap();
        assert_eq!(bounds.min, DVec2::new(-4.0, 2.0));
        assert_eq!(bounds.max, DVec2::new(10.0, 20.0));
        assert!(bounds.contains(DVec2::new(0.0, 10.0)));
        assert_eq!(bounds.size(), DVec2::new(14.0, 18.0));
        assert_eq!(file.weighted_center(), DVec2::new(4.0, 10.0));

        let empty = parse("");
        assert!(empty.bounds().is_none());
        assert_eq!(empty.weighted_center(), DVec2::ZERO);
    }

    #[test]
    fn test_is_extruding() {
        let file = parse("G1 X1 E1 F600\nG1 X2 E2\nG1 X3\nG1 X4 E1.5\n");
        assert!(!file.is_extruding(0));
        assert!(file.is_extruding(1));
        assert!(!file.is_extruding(2));
        assert!(!file.is_extruding(3));
        assert!(!file.is_extruding(40));
    }

    #[test]
    fn test_layer_heights() {
        let explicit = parse("; LAYER_HEIGHT:0.3\n;LAYER:0\nG1 Z0.3\n; LAYER_HEIGHT:0.2\n;LAYER:1\nG1 Z0.5\n");
        assert_eq!(explicit.layer_height(0), 0.3);
        assert_eq!(explicit.layer_height(1), 0.2);
        assert!((explicit.layer_top(1) - 0.5).abs() < 1e-12);
        assert_eq!(explicit.layer_height(2), 0.0);
        assert!((explicit.layer_top(4) - 0.5).abs() < 1e-12);

        let derived = parse("G1 Z0.3\nG1 X1\nG1 Z0.5\nG1 X2\nG1 Z0.7\n");
        assert_eq!(derived.layer_starts(), &[0, 2, 4]);
        assert!((derived.layer_height(5) - 0.2).abs() < 1e-12);

        assert_eq!(parse("G28\n").layer_height(0), DEFAULT_LAYER_HEIGHT);
    }

    #[test]
    fn test_timing_totals() {
        let file = parse("G1 X10 F1200\nG1 X20\nG1 X30\n");
        assert!(file.total_seconds() > 0.0);
        assert_eq!(file.total_seconds(), file.instruction(0).seconds_to_end_from_here);
        assert!(file.seconds_remaining(1) < file.total_seconds());
        assert_eq!(file.seconds_remaining(10), 0.0);
    }

    #[test]
    fn test_with_kinematics_rescales() {
        let file = parse("G1 X100 F6000\nG1 X200\n");
        let before = file.total_seconds();

        let mut limits = KinematicLimits::default();
        limits.speed_multiplier = printkit_core::AxisLimits::splat(0.5);
        let file = file.with_kinematics(&limits);
        assert!((file.total_seconds() - before * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_write_to_round_trips_text() {
        let file = parse("G90\r\n  G1 X1 ; move\n\nM84");
        let mut out = Vec::new();
        file.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "G90\nG1 X1 ; move\nM84\n");
    }

    #[test]
    fn test_extension_check() {
        assert!(has_gcode_extension(Path::new("part.gcode")));
        assert!(has_gcode_extension(Path::new("PART.GCode")));
        assert!(!has_gcode_extension(Path::new("part.nc")));
        assert!(!has_gcode_extension(Path::new("gcode")));
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GcodeFile>();
    }
}
