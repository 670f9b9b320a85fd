//! # PrintKit G-code
//!
//! G-code ingestion for PrintKit: line tokenizing, the per-line instruction
//! model, the command parser with layer detection, the kinematic print-time
//! estimator and the loaded file model with its query surface.

pub mod file;
pub mod instruction;
pub mod parser;
pub mod timing;
pub mod tokenizer;

pub use file::{
    Bounds, GcodeFile, DEFAULT_FILAMENT_DIAMETER, DEFAULT_LAYER_HEIGHT, GCODE_EXTENSION,
    MAX_PERCENT_IN_PROGRESS, PRINT_END_SENTINEL,
};
pub use instruction::{Instruction, MovementType};
pub use parser::{is_layer_change, GcodeParser, LayerDetection, ParsedGcode};
pub use timing::KinematicAnalyzer;
pub use tokenizer::{
    code_portion, command_code, first_number_after, first_number_after_in, split_lines,
    CommandCode, MoveFields, ScanScope,
};
