//! Planar Delaunay triangulation (Bowyer-Watson)
//!
//! Probe meshes are small, so the simple incremental algorithm is enough:
//! each point removes the triangles whose circumcircle contains it and
//! re-fans the hole around itself.

use glam::DVec2;

/// Super-triangle size relative to the input extent
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

#[derive(Debug, Clone, Copy)]
struct Triangle {
    /// Counter-clockwise vertex indices
    vertices: [usize; 3],
}

impl Triangle {
    fn new(points: &[DVec2], [a, b, c]: [usize; 3]) -> Self {
        if orientation(points[a], points[b], points[c]) < 0.0 {
            Self {
                vertices: [a, c, b],
            }
        } else {
            Self {
                vertices: [a, b, c],
            }
        }
    }

    fn edges(&self) -> [[usize; 2]; 3] {
        let [a, b, c] = self.vertices;
        [[a, b], [b, c], [c, a]]
    }

    fn circumcircle_contains(&self, points: &[DVec2], point: DVec2) -> bool {
        let [a, b, c] = self.vertices.map(|index| points[index] - point);
        let det = a.length_squared() * b.perp_dot(c) - b.length_squared() * a.perp_dot(c)
            + c.length_squared() * a.perp_dot(b);
        det > 0.0
    }

    fn area_sign(&self, points: &[DVec2]) -> f64 {
        let [a, b, c] = self.vertices;
        orientation(points[a], points[b], points[c])
    }
}

/// Twice the signed area of `abc`; positive when counter-clockwise
fn orientation(a: DVec2, b: DVec2, c: DVec2) -> f64 {
    (b - a).perp_dot(c - a)
}

fn same_edge(a: &[usize; 2], b: &[usize; 2]) -> bool {
    (a[0] == b[0] && a[1] == b[1]) || (a[0] == b[1] && a[1] == b[0])
}

/// Triangulate `points`, returning counter-clockwise index triples.
///
/// Points must be distinct. Fewer than three points, or points that are all
/// collinear, give no triangles.
pub fn triangulate(points: &[DVec2]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let (min, max) = points.iter().fold(
        (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
        |(min, max), point| (min.min(*point), max.max(*point)),
    );
    let span = (max - min).max_element().max(1.0) * SUPER_TRIANGLE_SCALE;
    let mid = (min + max) / 2.0;

    let real_count = points.len();
    let mut vertices = points.to_vec();
    vertices.push(mid + DVec2::new(-span, -span));
    vertices.push(mid + DVec2::new(span, -span));
    vertices.push(mid + DVec2::new(0.0, span));

    let mut triangles = vec![Triangle::new(
        &vertices,
        [real_count, real_count + 1, real_count + 2],
    )];

    for (index, &point) in points.iter().enumerate() {
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|triangle| triangle.circumcircle_contains(&vertices, point));

        // Edges on the boundary of the hole appear in exactly one bad triangle
        let mut boundary: Vec<[usize; 2]> = Vec::new();
        for edge in bad.iter().flat_map(Triangle::edges) {
            match boundary.iter().position(|seen| same_edge(seen, &edge)) {
                Some(shared) => {
                    boundary.swap_remove(shared);
                }
                None => boundary.push(edge),
            }
        }

        triangles = good;
        triangles.extend(
            boundary
                .into_iter()
                .map(|[a, b]| Triangle::new(&vertices, [a, b, index])),
        );
    }

    triangles
        .into_iter()
        .filter(|triangle| triangle.vertices.iter().all(|&v| v < real_count))
        .filter(|triangle| triangle.area_sign(&vertices) > 0.0)
        .map(|triangle| triangle.vertices)
        .collect()
}
