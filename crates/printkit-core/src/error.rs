//! Error handling for PrintKit
//!
//! Provides error types for each layer of the engine:
//! - Load errors (file access, cancellation)
//! - Leveling errors (probe data that cannot form a surface)
//! - Kinematics errors (machine limits the estimator cannot use)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Load error type
///
/// Any of these means the load produced no file model. Callers that only
/// care about "result or nothing" can use `.ok()`.
#[derive(Error, Debug)]
pub enum LoadError {
    /// Path does not carry a `.gcode` extension
    #[error("Unsupported file extension: {path}")]
    UnsupportedExtension {
        /// The rejected path.
        path: String,
    },

    /// Source could not be opened or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller cancelled the load
    #[error("Load cancelled")]
    Cancelled,
}

impl LoadError {
    /// Check if this error came from a cancellation request
    pub fn is_cancelled(&self) -> bool {
        matches!(self, LoadError::Cancelled)
    }
}

/// Leveling error type
///
/// Represents probe data that cannot be turned into a leveling surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LevelingError {
    /// Fewer than three distinct probe positions
    #[error("At least 3 distinct probe samples are required, got {count}")]
    NotEnoughSamples {
        /// Number of distinct samples supplied.
        count: usize,
    },

    /// All samples are collinear, so no triangle could be formed
    #[error("Probe samples do not span an area")]
    DegenerateSamples,
}

/// Kinematics error type
///
/// Represents machine limits the print-time estimator cannot work with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KinematicsError {
    /// One limit vector holds an unusable value
    #[error("{field} {reason}")]
    InvalidLimits {
        /// Name of the offending limit vector.
        field: &'static str,
        /// What the value must satisfy.
        reason: &'static str,
    },
}

/// Main error type for PrintKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Load error
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Leveling error
    #[error(transparent)]
    Leveling(#[from] LevelingError),

    /// Kinematics error
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a load error
    pub fn is_load_error(&self) -> bool {
        matches!(self, Error::Load(_))
    }

    /// Check if this is a leveling error
    pub fn is_leveling_error(&self) -> bool {
        matches!(self, Error::Leveling(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
