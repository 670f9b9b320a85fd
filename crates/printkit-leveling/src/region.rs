//! One triangular leveling region

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

/// Plane through three probed points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelingTriangle {
    vertices: [DVec3; 3],
    center: DVec3,
    normal: DVec3,
    /// Plane offset: `normal · p == distance` for points on the plane
    distance: f64,
}

impl LevelingTriangle {
    pub fn new(v0: DVec3, v1: DVec3, v2: DVec3) -> Self {
        let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
        Self {
            vertices: [v0, v1, v2],
            center: (v0 + v1 + v2) / 3.0,
            normal,
            distance: normal.dot(v0),
        }
    }

    pub fn vertices(&self) -> &[DVec3; 3] {
        &self.vertices
    }

    /// Centroid of the three vertices
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Height of the plane above (x, y); zero for a vertical plane
    pub fn height_at(&self, point: DVec2) -> f64 {
        if self.normal.z.abs() <= f64::EPSILON {
            return 0.0;
        }
        (self.distance - self.normal.x * point.x - self.normal.y * point.y) / self.normal.z
    }

    /// `destination` raised by the plane height under its XY position
    pub fn position_with_z_offset(&self, destination: DVec3) -> DVec3 {
        destination + DVec3::Z * self.height_at(destination.truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_triangle_offsets_by_constant() {
        let triangle = LevelingTriangle::new(
            DVec3::new(0.0, 0.0, 0.1),
            DVec3::new(100.0, 0.0, 0.1),
            DVec3::new(0.0, 100.0, 0.1),
        );
        let leveled = triangle.position_with_z_offset(DVec3::new(20.0, 30.0, 0.3));
        assert!((leveled.z - 0.4).abs() < 1e-12);
        assert_eq!(leveled.truncate(), DVec2::new(20.0, 30.0));
    }

    #[test]
    fn test_tilted_plane_extrapolates() {
        // z = 0.01 * x
        let triangle = LevelingTriangle::new(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(0.0, 100.0, 0.0),
            DVec3::new(100.0, 0.0, 1.0),
        );
        assert!((triangle.height_at(DVec2::new(50.0, 10.0)) - 0.5).abs() < 1e-12);
        assert!((triangle.height_at(DVec2::new(150.0, 10.0)) - 1.5).abs() < 1e-12);
        assert_eq!(
            triangle.center(),
            DVec3::new(100.0 / 3.0, 100.0 / 3.0, 1.0 / 3.0)
        );
    }

    #[test]
    fn test_vertical_plane_gives_no_offset() {
        let triangle = LevelingTriangle::new(
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(10.0, 0.0, 0.0),
            DVec3::new(0.0, 0.0, 10.0),
        );
        assert_eq!(triangle.height_at(DVec2::new(5.0, 5.0)), 0.0);
    }
}
