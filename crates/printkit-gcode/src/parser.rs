//! G-code command parser and layer detection
//!
//! First pass of a load: turns text into [`Instruction`]s, each one a copy of
//! the previous resolved state with this line's words applied, and records
//! where layers start.

use regex::Regex;
use std::sync::OnceLock;

use printkit_core::{LoadError, ProgressMonitor};

use crate::instruction::{Instruction, MovementType};
use crate::tokenizer::{
    code_portion, command_code, first_number_after, first_number_after_in, split_lines,
    MoveFields, ScanScope,
};

/// How layer boundaries are found in a file
///
/// Chosen once per file before parsing starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDetection {
    /// The file carries `;LAYER:` comments written by the slicer
    ExplicitMarkers,
    /// Infer a new layer whenever a move changes Z
    ZChange,
}

impl LayerDetection {
    /// Pick the detection mode by looking for any layer marker comment
    pub fn sniff(text: &str) -> Self {
        static SNIFF_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = SNIFF_REGEX
            .get_or_init(|| Regex::new(r"(?m)^\s*;\s*LAYER:").expect("invalid regex pattern"));

        if regex.is_match(text) {
            Self::ExplicitMarkers
        } else {
            Self::ZChange
        }
    }
}

/// Whether a comment line marks the start of a layer
pub fn is_layer_change(line: &str) -> bool {
    static MARKER_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex =
        MARKER_REGEX.get_or_init(|| Regex::new(r"^\s*;\s*LAYER:").expect("invalid regex pattern"));
    regex.is_match(line)
}

/// Result of the parsing pass
#[derive(Debug, Clone)]
pub struct ParsedGcode {
    pub instructions: Vec<Instruction>,
    /// Strictly increasing, always starts with 0
    pub layer_starts: Vec<usize>,
    /// Values of `; LAYER_HEIGHT:` comments in file order
    pub layer_heights: Vec<f64>,
    /// Distinct feed rates of extruding XY moves, ascending
    pub speeds: Vec<f64>,
    pub detection: LayerDetection,
}

/// Line-by-line G-code parser
///
/// Feed it lines with [`GcodeParser::parse_line`] and collect the result with
/// [`GcodeParser::finish`].
pub struct GcodeParser {
    detection: LayerDetection,
    instructions: Vec<Instruction>,
    layer_starts: Vec<usize>,
    layer_heights: Vec<f64>,
    speeds: Vec<f64>,
    /// E given up by the last `G92 E`, added to later absolute E words
    accumulated_e_offset: f64,
    last_z: f64,
    found_first_layer_marker: bool,
    seen_extruding_move: bool,
}

impl GcodeParser {
    /// Create a parser using the given layer detection mode
    pub fn new(detection: LayerDetection) -> Self {
        Self {
            detection,
            instructions: Vec::new(),
            layer_starts: vec![0],
            layer_heights: Vec::new(),
            speeds: Vec::new(),
            accumulated_e_offset: 0.0,
            last_z: 0.0,
            found_first_layer_marker: false,
            seen_extruding_move: false,
        }
    }

    /// Parse a whole text, sniffing the layer detection mode first.
    ///
    /// Reports progress in the range [0, 0.5).
    ///
    /// # Errors
    /// Returns [`LoadError::Cancelled`] if the monitor observes cancellation.
    pub fn parse_str(text: &str, monitor: &mut ProgressMonitor) -> Result<ParsedGcode, LoadError> {
        let detection = LayerDetection::sniff(text);
        tracing::debug!("Layer detection mode: {:?}", detection);

        let total_lines = text.bytes().filter(|b| *b == b'\n').count() + 1;
        let mut parser = Self::new(detection);

        for (line_index, line) in split_lines(text).enumerate() {
            parser.parse_line(line);
            monitor.checkpoint(line_index as f64 / total_lines as f64 / 2.0, "Parsing")?;
        }

        Ok(parser.finish())
    }

    /// Parse a whole text without progress reporting
    pub fn parse_all(text: &str) -> ParsedGcode {
        let mut parser = Self::new(LayerDetection::sniff(text));
        split_lines(text).for_each(|line| parser.parse_line(line));
        parser.finish()
    }

    /// Number of instructions recorded so far
    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }

    /// Parse one source line. Blank lines are skipped.
    pub fn parse_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        let index = self.instructions.len();
        let mut instruction = match self.instructions.last() {
            Some(previous) => Instruction::carried_from(previous, line),
            None => Instruction::new(line),
        };

        if let Some(code) = command_code(line) {
            match code.letter {
                'G' => self.parse_g_line(code.number, line, &mut instruction, index),
                'M' => {
                    // Temperature, fan and motor commands do not move the head
                    tracing::trace!("Inert M-code at line {}: {}", index, line);
                }
                'T' => {
                    if let Some(tool) = code.number {
                        instruction.extruder_index = tool as usize;
                    }
                }
                ';' => self.parse_comment(line, index),
                '@' => {}
                other => {
                    tracing::trace!(
                        "Ignoring line {} with unknown leading character '{}'",
                        index,
                        other
                    );
                }
            }
        }

        if let Some(previous) = self.instructions.last() {
            let code = code_portion(line);
            if instruction.e_position > previous.e_position
                && (code.contains('X') || code.contains('Y'))
            {
                self.seen_extruding_move = true;
                self.speeds.push(instruction.feed_rate);
            }
        }

        self.instructions.push(instruction);
    }

    /// Finish parsing and hand over the collected data
    pub fn finish(mut self) -> ParsedGcode {
        self.speeds.sort_by(f64::total_cmp);
        self.speeds.dedup();

        ParsedGcode {
            instructions: self.instructions,
            layer_starts: self.layer_starts,
            layer_heights: self.layer_heights,
            speeds: self.speeds,
            detection: self.detection,
        }
    }

    fn parse_g_line(
        &mut self,
        number: Option<u32>,
        line: &str,
        instruction: &mut Instruction,
        index: usize,
    ) {
        match number {
            Some(0) | Some(1) => self.parse_linear_move(line, instruction, index),
            Some(90) => instruction.movement_type = MovementType::Absolute,
            Some(91) => instruction.movement_type = MovementType::Relative,
            Some(92) => {
                if let Some(e) = first_number_after("E", line) {
                    // Remember how much E was given up by the reset
                    self.accumulated_e_offset = instruction.e_position - e;
                }
            }
            // Dwell, firmware retract, units, homing, probing, pots, endstop homing
            Some(4 | 10 | 11 | 21 | 28 | 29 | 30 | 130 | 161 | 162) => {}
            other => {
                tracing::trace!("Ignoring unsupported G-code {:?} at line {}", other, index);
            }
        }
    }

    fn parse_linear_move(&mut self, line: &str, instruction: &mut Instruction, index: usize) {
        let fields = MoveFields::scan(line);
        let relative = instruction.movement_type == MovementType::Relative;
        let resolve = |current: f64, word: Option<f64>| match word {
            Some(value) if relative => current + value,
            Some(value) => value,
            None => current,
        };

        instruction.position.x = resolve(instruction.position.x, fields.x);
        instruction.position.y = resolve(instruction.position.y, fields.y);
        instruction.position.z = resolve(instruction.position.z, fields.z);

        if let Some(e) = fields.e {
            if relative {
                instruction.e_position += e;
            } else {
                instruction.e_position = e + self.accumulated_e_offset;
            }
        }

        if let Some(feed_rate) = fields.f {
            instruction.feed_rate = feed_rate;
        }

        if self.detection == LayerDetection::ZChange && instruction.position.z != self.last_z {
            self.push_layer_start(index);
        }
        self.last_z = instruction.position.z;
    }

    /// Handle a comment line: layer markers and `LAYER_HEIGHT:` annotations.
    ///
    /// The first marker is dropped only while nothing has been extruded yet,
    /// since it would just repeat layer 0. Any extruding XY move counts,
    /// including a prime or purge line in the start G-code, so slicer output
    /// that purges before `;LAYER:0` reports that preamble as its own layer.
    /// Geometry printed before the first marker is never merged into layer 0.
    fn parse_comment(&mut self, line: &str, index: usize) {
        if self.detection == LayerDetection::ExplicitMarkers && is_layer_change(line) {
            if !self.found_first_layer_marker {
                self.found_first_layer_marker = true;
                // Before any extrusion the marker would only repeat layer 0
                if !self.seen_extruding_move {
                    tracing::trace!("Skipping first layer marker at line {}", index);
                    return;
                }
            }
            self.push_layer_start(index);
        } else if line.contains("LAYER_HEIGHT:") {
            if let Some(height) = first_number_after_in("LAYER_HEIGHT:", line, ScanScope::WholeLine)
            {
                self.layer_heights.push(height);
            }
        }
    }

    fn push_layer_start(&mut self, index: usize) {
        if self.layer_starts.last().is_none_or(|&last| index > last) {
            self.layer_starts.push(index);
        }
    }
}
