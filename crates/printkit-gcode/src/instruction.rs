//! Parsed instruction type
//!
//! One [`Instruction`] exists per non-empty source line. It carries the
//! machine state *after* the line has executed, so any instruction can be
//! inspected on its own without replaying the file.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// How coordinate words on a motion line are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementType {
    /// Coordinates are absolute positions (G90)
    #[default]
    Absolute,
    /// Coordinates are deltas from the previous position (G91)
    Relative,
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absolute => write!(f, "Absolute"),
            Self::Relative => write!(f, "Relative"),
        }
    }
}

/// One machine-control line and the resolved machine state after it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instruction {
    /// Trimmed source text
    pub line: String,
    /// Resolved absolute X/Y/Z
    pub position: DVec3,
    /// Cumulative absolute extruder position, including G92 offsets
    pub e_position: f64,
    /// Last explicitly set feed rate (mm/min)
    pub feed_rate: f64,
    /// Distance mode in effect
    pub movement_type: MovementType,
    /// Active tool index
    pub extruder_index: usize,
    /// Estimated time for this line alone
    pub seconds_this_line: f64,
    /// Time from the start of this line to the end of the file
    pub seconds_to_end_from_here: f64,
}

impl Instruction {
    /// Create an instruction with default machine state
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Self::default()
        }
    }

    /// Start a new line from the previous line's resolved state.
    ///
    /// Position, extruder, feed rate, mode and tool carry forward; the timing
    /// fields start at zero.
    pub fn carried_from(previous: &Instruction, line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            seconds_this_line: 0.0,
            seconds_to_end_from_here: 0.0,
            ..previous.clone()
        }
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }
}
