//! # PrintKit Core
//!
//! Core types, errors, and utilities shared by the PrintKit crates.
//! Provides the error taxonomy, kinematic limit descriptions used by the
//! print-time estimator, and the cooperative cancellation / progress
//! primitives used by long-running load operations.

pub mod error;
pub mod kinematics;
pub mod progress;

pub use error::{Error, KinematicsError, LevelingError, LoadError, Result};
pub use kinematics::{AxisLimits, KinematicLimits};
pub use progress::{CancellationToken, ProgressCallback, ProgressMonitor, DEFAULT_PROGRESS_INTERVAL};
