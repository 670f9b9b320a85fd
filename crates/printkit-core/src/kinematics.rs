//! Kinematic limits used by the print-time estimator
//!
//! Each limit is expressed per axis (X, Y, Z and the extruder E). The
//! estimator combines the values of the axes a move actually uses.

use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;

/// One value per machine axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub e: f64,
}

impl AxisLimits {
    /// Create limits from explicit per-axis values
    pub const fn new(x: f64, y: f64, z: f64, e: f64) -> Self {
        Self { x, y, z, e }
    }

    /// Same value on every axis
    pub const fn splat(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Values in X, Y, Z, E order
    pub fn as_array(&self) -> [f64; 4] {
        [self.x, self.y, self.z, self.e]
    }

    /// Smallest value across all axes
    pub fn min_element(&self) -> f64 {
        self.as_array().into_iter().fold(f64::INFINITY, f64::min)
    }
}

/// Kinematic parameters for move-duration estimation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicLimits {
    /// Maximum acceleration in mm/s²
    pub max_acceleration: AxisLimits,
    /// Maximum velocity in mm/s
    pub max_velocity: AxisLimits,
    /// Velocity the machine can start or stop at instantly, in mm/s
    pub velocity_same_as_stop: AxisLimits,
    /// Time scale applied to each estimate, in (0, 1]
    pub speed_multiplier: AxisLimits,
}

impl Default for KinematicLimits {
    fn default() -> Self {
        Self {
            max_acceleration: AxisLimits::new(1000.0, 1000.0, 200.0, 1000.0),
            max_velocity: AxisLimits::new(500.0, 500.0, 25.0, 50.0),
            velocity_same_as_stop: AxisLimits::splat(8.0),
            speed_multiplier: AxisLimits::splat(1.0),
        }
    }
}

impl KinematicLimits {
    /// Check that every limit is usable by the estimator
    ///
    /// # Errors
    /// Returns [`KinematicsError::InvalidLimits`] naming the first offending
    /// limit vector.
    pub fn validate(&self) -> Result<(), KinematicsError> {
        let invalid = |field, reason| Err(KinematicsError::InvalidLimits { field, reason });

        for (field, limits) in [
            ("max_acceleration", self.max_acceleration),
            ("max_velocity", self.max_velocity),
        ] {
            if !limits.as_array().iter().all(|v| v.is_finite() && *v > 0.0) {
                return invalid(field, "must be positive on every axis");
            }
        }
        if !self
            .velocity_same_as_stop
            .as_array()
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
        {
            return invalid("velocity_same_as_stop", "cannot be negative");
        }
        if !self
            .speed_multiplier
            .as_array()
            .iter()
            .all(|v| *v > 0.0 && *v <= 1.0)
        {
            return invalid("speed_multiplier", "must be in (0, 1]");
        }
        Ok(())
    }
}
