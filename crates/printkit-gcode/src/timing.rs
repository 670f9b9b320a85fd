//! Print-time estimation
//!
//! Second pass of a load. Walks the finished instruction list, re-derives
//! every move from the line text and estimates how long it takes under the
//! machine's acceleration and velocity limits, then fills in the time
//! remaining from each line to the end of the file.
//!
//! The pass keeps its own position, extruder and feed-rate accumulators, so
//! it can be re-run with different limits without parsing again.

use std::convert::Infallible;

use glam::DVec3;

use printkit_core::{AxisLimits, KinematicLimits, LoadError, ProgressMonitor};

use crate::instruction::{Instruction, MovementType};
use crate::tokenizer::{command_code, first_number_after, MoveFields};

/// Estimates per-line durations with a trapezoidal velocity profile
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicAnalyzer {
    limits: KinematicLimits,
}

impl KinematicAnalyzer {
    /// Create an analyzer for the given machine limits
    pub fn new(limits: KinematicLimits) -> Self {
        Self { limits }
    }

    /// Limits used by this analyzer
    pub fn limits(&self) -> &KinematicLimits {
        &self.limits
    }

    /// Annotate every instruction with `seconds_this_line` and
    /// `seconds_to_end_from_here`.
    ///
    /// Reports progress in the range [0.5, 1).
    ///
    /// # Errors
    /// Returns [`LoadError::Cancelled`] if the monitor observes cancellation;
    /// the instructions are then only partially annotated.
    pub fn analyze(
        &self,
        instructions: &mut [Instruction],
        monitor: &mut ProgressMonitor,
    ) -> Result<(), LoadError> {
        let total = instructions.len().max(1) as f64;
        self.run(instructions, |index| {
            monitor.checkpoint(0.5 + index as f64 / total / 2.0, "Estimating print time")
        })
    }

    /// Annotate every instruction without progress reporting
    pub fn annotate(&self, instructions: &mut [Instruction]) {
        let Ok(()) = self.run(instructions, |_| Ok::<(), Infallible>(()));
    }

    fn run<E>(
        &self,
        instructions: &mut [Instruction],
        mut after_line: impl FnMut(usize) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut feed_rate_mm_per_min = 0.0;
        let mut position = DVec3::ZERO;
        let mut last_e = 0.0;
        let mut movement_type = MovementType::Absolute;

        for (index, instruction) in instructions.iter_mut().enumerate() {
            let mut delta = DVec3::ZERO;
            let mut delta_e = 0.0;

            match command_code(&instruction.line) {
                Some(code) if code.is_linear_move() => {
                    let fields = MoveFields::scan(&instruction.line);
                    if let Some(feed_rate) = fields.f {
                        feed_rate_mm_per_min = feed_rate;
                    }

                    let relative = movement_type == MovementType::Relative;
                    let resolve = |current: f64, word: Option<f64>| match word {
                        Some(value) if relative => current + value,
                        Some(value) => value,
                        None => current,
                    };
                    let destination = DVec3::new(
                        resolve(position.x, fields.x),
                        resolve(position.y, fields.y),
                        resolve(position.z, fields.z),
                    );
                    let e = resolve(last_e, fields.e);

                    delta = destination - position;
                    delta_e = (e - last_e).abs();
                    position = destination;
                    last_e = e;
                }
                Some(code) if code.is_g(90) => movement_type = MovementType::Absolute,
                Some(code) if code.is_g(91) => movement_type = MovementType::Relative,
                Some(code) if code.is_g(92) => {
                    if let Some(e) = first_number_after("E", &instruction.line) {
                        last_e = e;
                    }
                }
                _ => {}
            }

            instruction.seconds_this_line =
                self.seconds_for_move(delta, delta_e, feed_rate_mm_per_min);

            after_line(index)?;
        }

        let mut accumulated = 0.0;
        for instruction in instructions.iter_mut().rev() {
            accumulated += instruction.seconds_this_line;
            instruction.seconds_to_end_from_here = accumulated;
        }

        Ok(())
    }

    /// Estimated seconds for one move.
    ///
    /// * `delta` - XYZ displacement in mm
    /// * `delta_e` - absolute extruder travel in mm
    /// * `feed_rate_mm_per_min` - requested feed rate
    ///
    /// The move takes as long as its slowest constraint: the path at the
    /// requested feed rate, or any single axis at its own limits. Which
    /// limits apply depends only on which axes move, never on how far, so
    /// the result never shrinks when a displacement grows. Zero for a
    /// zero-length move or a zero feed rate.
    pub fn seconds_for_move(&self, delta: DVec3, delta_e: f64, feed_rate_mm_per_min: f64) -> f64 {
        let length = delta.length().max(delta_e.abs());
        if !(length > 0.0) || !length.is_finite() || !(feed_rate_mm_per_min > 0.0) {
            return 0.0;
        }

        let distances = [delta.x.abs(), delta.y.abs(), delta.z.abs(), delta_e.abs()];
        let moving = |limits: &AxisLimits| {
            distances
                .into_iter()
                .zip(limits.as_array())
                .filter(|(distance, _)| *distance > 0.0)
                .map(|(_, limit)| limit)
        };

        let path_velocity = feed_rate_mm_per_min / 60.0;
        let path_acceleration = moving(&self.limits.max_acceleration).fold(f64::INFINITY, f64::min);
        let path_stop_velocity = moving(&self.limits.velocity_same_as_stop)
            .map(|limit| limit.max(0.0))
            .fold(f64::INFINITY, f64::min);
        let path_seconds = trapezoid_seconds(
            length,
            path_stop_velocity.min(path_velocity),
            path_velocity,
            path_acceleration,
        );

        let max_velocity = self.limits.max_velocity.as_array();
        let max_acceleration = self.limits.max_acceleration.as_array();
        let stop_velocity = self.limits.velocity_same_as_stop.as_array();
        let axis_seconds = (0..4)
            .filter(|&axis| distances[axis] > 0.0 && max_velocity[axis] > 0.0)
            .map(|axis| {
                trapezoid_seconds(
                    distances[axis],
                    stop_velocity[axis].max(0.0).min(max_velocity[axis]),
                    max_velocity[axis],
                    max_acceleration[axis],
                )
            })
            .fold(0.0, f64::max);

        // Slowest multiplier among the moving axes
        let multiplier = moving(&self.limits.speed_multiplier).fold(0.0, f64::max);

        path_seconds.max(axis_seconds) * multiplier
    }
}

/// Time to cover `length` starting and ending at `start_velocity`, limited to
/// `cruise_velocity` and `acceleration`.
fn trapezoid_seconds(
    length: f64,
    start_velocity: f64,
    cruise_velocity: f64,
    acceleration: f64,
) -> f64 {
    if !(acceleration > 0.0) || acceleration.is_infinite() {
        return length / cruise_velocity;
    }

    let ramp_distance =
        (cruise_velocity * cruise_velocity - start_velocity * start_velocity) / (2.0 * acceleration);

    if 2.0 * ramp_distance <= length {
        let ramp_seconds = 2.0 * (cruise_velocity - start_velocity) / acceleration;
        let cruise_seconds = (length - 2.0 * ramp_distance) / cruise_velocity;
        ramp_seconds + cruise_seconds
    } else {
        // Never reaches cruise speed
        let peak_velocity = (start_velocity * start_velocity + acceleration * length).sqrt();
        2.0 * (peak_velocity - start_velocity) / acceleration
    }
}
