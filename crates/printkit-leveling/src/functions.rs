//! Bed leveling for outbound motion commands
//!
//! Probe samples are triangulated over the bed and every outgoing `G0`/`G1`
//! is rewritten with its Z raised by the surface height under the
//! destination.

use std::collections::HashMap;
use std::io::Write;

use glam::{DVec2, DVec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use printkit_core::LevelingError;
use printkit_gcode::{code_portion, command_code, first_number_after, GcodeFile};

use crate::delaunay::triangulate;
use crate::region::LevelingTriangle;

/// X of the synthetic vertex added so the triangulation reaches past the
/// probed area
pub const EXTRA_VERTEX_X: f64 = -50000.0;

/// Probe results for one bed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelingData {
    /// Probed points; Z is the measured height at (X, Y)
    pub sampled_positions: Vec<DVec3>,
}

impl LevelingData {
    pub fn new(sampled_positions: Vec<DVec3>) -> Self {
        Self { sampled_positions }
    }
}

/// Leveling surface built from one set of probe samples
#[derive(Debug)]
pub struct LevelingFunctions {
    sampled_positions: Vec<DVec3>,
    regions: Vec<LevelingTriangle>,
    bed_size: DVec2,
    /// Quantized bed position -> index into `regions`
    region_cache: Mutex<HashMap<(i32, i32), usize>>,
}

impl LevelingFunctions {
    /// Build the leveling surface.
    ///
    /// Repeated XY positions keep the first sample's height. Every region
    /// plane is lowered by `probe_z_offset`.
    ///
    /// # Errors
    /// [`LevelingError::NotEnoughSamples`] with fewer than three distinct XY
    /// positions, [`LevelingError::DegenerateSamples`] if they are collinear.
    pub fn new(
        data: &LevelingData,
        bed_size: DVec2,
        probe_z_offset: f64,
    ) -> Result<Self, LevelingError> {
        let mut distinct: Vec<DVec3> = Vec::with_capacity(data.sampled_positions.len());
        for sample in &data.sampled_positions {
            if !distinct
                .iter()
                .any(|seen| seen.truncate() == sample.truncate())
            {
                distinct.push(*sample);
            }
        }
        if distinct.len() < 3 {
            return Err(LevelingError::NotEnoughSamples {
                count: distinct.len(),
            });
        }

        let mut points: Vec<DVec2> = distinct.iter().map(|sample| sample.truncate()).collect();
        let extra = DVec2::new(EXTRA_VERTEX_X, distinct[0].y);
        let extra_index = points.len();
        if !points.contains(&extra) {
            points.push(extra);
        }

        let probe_offset = DVec3::new(0.0, 0.0, probe_z_offset);
        let regions: Vec<LevelingTriangle> = triangulate(&points)
            .into_iter()
            .filter(|triangle| !triangle.contains(&extra_index))
            .map(|[a, b, c]| {
                LevelingTriangle::new(
                    distinct[a] - probe_offset,
                    distinct[b] - probe_offset,
                    distinct[c] - probe_offset,
                )
            })
            .collect();

        if regions.is_empty() {
            tracing::warn!(
                "Probe samples do not span an area ({} samples)",
                distinct.len()
            );
            return Err(LevelingError::DegenerateSamples);
        }

        tracing::debug!(
            "Built {} leveling regions from {} samples",
            regions.len(),
            distinct.len()
        );

        Ok(Self {
            sampled_positions: data.sampled_positions.clone(),
            regions,
            bed_size,
            region_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn sampled_positions(&self) -> &[DVec3] {
        &self.sampled_positions
    }

    pub fn regions(&self) -> &[LevelingTriangle] {
        &self.regions
    }

    /// `destination` with Z corrected for the bed surface
    pub fn position_with_z_offset(&self, destination: DVec3) -> DVec3 {
        self.regions[self.region_index(destination.truncate())].position_with_z_offset(destination)
    }

    fn region_index(&self, position: DVec2) -> usize {
        let key = (
            (position.x * 100.0 / self.bed_size.x).round() as i32,
            (position.y * 100.0 / self.bed_size.y).round() as i32,
        );

        *self
            .region_cache
            .lock()
            .entry(key)
            .or_insert_with(|| self.nearest_region(position))
    }

    fn nearest_region(&self, position: DVec2) -> usize {
        self.regions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let a = a.center().truncate().distance_squared(position);
                let b = b.center().truncate().distance_squared(position);
                a.total_cmp(&b)
            })
            .map_or(0, |(index, _)| index)
    }

    /// Rewrite a motion line for the leveled surface.
    ///
    /// `G0`/`G1` lines become `G1 X.. Y.. Z.. [E..] [F..]`, where the
    /// position is `destination` with its Z corrected. Coordinates are only
    /// written when the line names X, Y or Z; E and F are kept when non-zero.
    /// Any other line is returned unchanged.
    pub fn apply_leveling(&self, line: &str, destination: DVec3) -> String {
        if !command_code(line).is_some_and(|code| code.is_linear_move()) {
            return line.to_string();
        }

        let mut words = vec!["G1".to_string()];

        if code_portion(line).contains(['X', 'Y', 'Z']) {
            let leveled = self.position_with_z_offset(destination);
            words.push(format!("X{}", format_trimmed(leveled.x, 2)));
            words.push(format!("Y{}", format_trimmed(leveled.y, 2)));
            words.push(format!("Z{}", format_trimmed(leveled.z, 3)));
        }

        let extrusion = first_number_after("E", line).unwrap_or(0.0);
        if extrusion != 0.0 {
            words.push(format!("E{}", format_trimmed(extrusion, 3)));
        }

        let feed_rate = first_number_after("F", line).unwrap_or(0.0);
        if feed_rate != 0.0 {
            words.push(format!("F{}", format_trimmed(feed_rate, 2)));
        }

        words.join(" ")
    }

    /// Write every line of `file` to `writer` with leveling applied
    pub fn write_leveled<W: Write>(&self, file: &GcodeFile, mut writer: W) -> std::io::Result<()> {
        for instruction in file.instructions() {
            writeln!(
                writer,
                "{}",
                self.apply_leveling(&instruction.line, instruction.position)
            )?;
        }
        Ok(())
    }
}

/// Round to `decimals` places and drop trailing zeros: 1.50 -> "1.5",
/// 2.000 -> "2"
fn format_trimmed(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value);
    let trimmed = if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted.as_str()
    };

    match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_bed(height: f64) -> LevelingData {
        LevelingData::new(vec![
            DVec3::new(0.0, 0.0, height),
            DVec3::new(200.0, 0.0, height),
            DVec3::new(0.0, 200.0, height),
            DVec3::new(200.0, 200.0, height),
        ])
    }

    #[test]
    fn test_format_trimmed() {
        assert_eq!(format_trimmed(1.5, 2), "1.5");
        assert_eq!(format_trimmed(2.0, 3), "2");
        assert_eq!(format_trimmed(0.1234, 3), "0.123");
        assert_eq!(format_trimmed(10.0, 2), "10");
        assert_eq!(format_trimmed(-0.0001, 2), "0");
        assert_eq!(format_trimmed(-3.25, 2), "-3.25");
    }

    #[test]
    fn test_flat_bed_adds_constant() {
        let leveling = LevelingFunctions::new(&flat_bed(0.1), DVec2::splat(200.0), 0.0).unwrap();
        let leveled = leveling.position_with_z_offset(DVec3::new(50.0, 150.0, 0.2));
        assert!((leveled.z - 0.3).abs() < 1e-9);
        assert_eq!(leveled.x, 50.0);
    }

    #[test]
    fn test_probe_offset_lowers_surface() {
        let leveling = LevelingFunctions::new(&flat_bed(0.5), DVec2::splat(200.0), 0.2).unwrap();
        let leveled = leveling.position_with_z_offset(DVec3::new(100.0, 100.0, 1.0));
        assert!((leveled.z - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_far_vertex_triangles_are_dropped() {
        let leveling = LevelingFunctions::new(&flat_bed(0.0), DVec2::splat(200.0), 0.0).unwrap();
        assert_eq!(leveling.regions().len(), 2);
        for region in leveling.regions() {
            assert!(region.vertices().iter().all(|v| v.x >= 0.0));
        }
    }

    #[test]
    fn test_not_enough_samples() {
        let data = LevelingData::new(vec![
            DVec3::new(0.0, 0.0, 0.1),
            DVec3::new(0.0, 0.0, 0.2),
            DVec3::new(10.0, 0.0, 0.1),
        ]);
        let err = LevelingFunctions::new(&data, DVec2::splat(200.0), 0.0).unwrap_err();
        assert_eq!(err, LevelingError::NotEnoughSamples { count: 2 });
    }

    #[test]
    fn test_collinear_samples_are_degenerate() {
        let data = LevelingData::new(vec![
            DVec3::new(0.0, 0.0, 0.1),
            DVec3::new(100.0, 0.0, 0.2),
            DVec3::new(200.0, 0.0, 0.1),
        ]);
        let err = LevelingFunctions::new(&data, DVec2::splat(200.0), 0.0).unwrap_err();
        assert_eq!(err, LevelingError::DegenerateSamples);
    }

    #[test]
    fn test_apply_leveling_rewrites_moves() {
        let leveling = LevelingFunctions::new(&flat_bed(0.1), DVec2::splat(200.0), 0.0).unwrap();

        let line = leveling.apply_leveling(
            "G0 X10 Y20.5 Z0.3 E1.25 F3000",
            DVec3::new(10.0, 20.5, 0.3),
        );
        assert_eq!(line, "G1 X10 Y20.5 Z0.4 E1.25 F3000");

        let line = leveling.apply_leveling("G1 E-0.8 F2400", DVec3::new(10.0, 20.5, 0.3));
        assert_eq!(line, "G1 E-0.8 F2400");

        let line = leveling.apply_leveling("G1 X5 ; E9", DVec3::new(5.0, 20.5, 0.3));
        assert_eq!(line, "G1 X5 Y20.5 Z0.4");
    }

    #[test]
    fn test_apply_leveling_passes_other_lines_through() {
        let leveling = LevelingFunctions::new(&flat_bed(0.1), DVec2::splat(200.0), 0.0).unwrap();
        assert_eq!(leveling.apply_leveling("M104 S200", DVec3::ZERO), "M104 S200");
        assert_eq!(leveling.apply_leveling("G28 X Y", DVec3::ZERO), "G28 X Y");
    }

    #[test]
    fn test_cached_region_is_reused() {
        let data = LevelingData::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(200.0, 0.0, 0.0),
            DVec3::new(0.0, 200.0, 0.0),
            DVec3::new(200.0, 200.0, 1.0),
        ]);
        let leveling = LevelingFunctions::new(&data, DVec2::splat(200.0), 0.0).unwrap();

        // Same quantized cell gives the same region and therefore the same plane
        let a = leveling.position_with_z_offset(DVec3::new(100.0, 100.0, 0.0));
        let b = leveling.position_with_z_offset(DVec3::new(100.4, 100.4, 0.0));
        let region = leveling.region_index(DVec2::new(100.0, 100.0));
        assert_eq!(region, leveling.region_index(DVec2::new(100.4, 100.4)));
        let plane = &leveling.regions()[region];
        assert!((a.z - plane.height_at(DVec2::new(100.0, 100.0))).abs() < 1e-12);
        assert!((b.z - plane.height_at(DVec2::new(100.4, 100.4))).abs() < 1e-12);
    }

    #[test]
    fn test_leveling_data_serde() {
        let data = flat_bed(0.25);
        let json = serde_json::to_string(&data).unwrap();
        let back: LevelingData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }
}
