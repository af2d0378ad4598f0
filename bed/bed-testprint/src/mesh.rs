//! Box meshes for test pads.

use nalgebra::{Point3, Vector3};

use crate::layout::TestPad;

/// Indexed triangle mesh.
///
/// Faces use counter-clockwise winding when viewed from outside, so normals
/// point outward by the right-hand rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadMesh {
    /// Vertex positions in mm.
    pub vertices: Vec<Point3<f64>>,
    /// Triangles as indices into `vertices`.
    pub faces: Vec<[u32; 3]>,
}

impl PadMesh {
    /// Create an empty mesh.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Append `other`, offsetting its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Signed volume; positive for a closed mesh with outward normals.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.faces.iter().map(|&[a, b, c]| {
            [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ]
        })
    }
}

/// A closed box centred on the origin in XY, standing on `z = 0`.
///
/// # Example
///
/// ```
/// use bed_testprint::box_mesh;
///
/// let pad = box_mesh(20.0, 10.0, 0.4);
/// assert_eq!(pad.vertex_count(), 8);
/// assert_eq!(pad.face_count(), 12);
/// assert!((pad.signed_volume() - 80.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn box_mesh(size_x: f64, size_y: f64, height: f64) -> PadMesh {
    let (hx, hy) = (size_x / 2.0, size_y / 2.0);
    let vertices = vec![
        Point3::new(-hx, -hy, 0.0),
        Point3::new(hx, -hy, 0.0),
        Point3::new(hx, hy, 0.0),
        Point3::new(-hx, hy, 0.0),
        Point3::new(-hx, -hy, height),
        Point3::new(hx, -hy, height),
        Point3::new(hx, hy, height),
        Point3::new(-hx, hy, height),
    ];
    let faces = vec![
        // bottom (-Z)
        [0, 2, 1],
        [0, 3, 2],
        // top (+Z)
        [4, 5, 6],
        [4, 6, 7],
        // front (-Y)
        [0, 1, 5],
        [0, 5, 4],
        // back (+Y)
        [3, 7, 6],
        [3, 6, 2],
        // left (-X)
        [0, 4, 7],
        [0, 7, 3],
        // right (+X)
        [1, 2, 6],
        [1, 6, 5],
    ];
    PadMesh { vertices, faces }
}

impl TestPad {
    /// The pad's box in local coordinates (centred on the origin).
    #[must_use]
    pub fn local_mesh(&self) -> PadMesh {
        box_mesh(self.size, self.size, self.height)
    }

    /// The pad's box at its absolute bed position.
    #[must_use]
    pub fn placed_mesh(&self) -> PadMesh {
        let mut mesh = self.local_mesh();
        mesh.translate(Vector3::new(self.center.x, self.center.y, 0.0));
        mesh
    }
}

/// All pads merged into one mesh with positions baked into the vertices.
#[must_use]
pub fn combined_mesh(pads: &[TestPad]) -> PadMesh {
    let mut mesh = PadMesh::new();
    for pad in pads {
        mesh.merge(&pad.placed_mesh());
    }
    mesh
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bed_types::{CellCoord, Point2};

    fn pad(x: f64, y: f64) -> TestPad {
        TestPad {
            cell: CellCoord::new(0, 0),
            grid_index: 0,
            center: Point2::new(x, y),
            size: 10.0,
            height: 0.4,
        }
    }

    #[test]
    fn box_is_outward_facing() {
        let mesh = box_mesh(2.0, 3.0, 4.0);
        assert_relative_eq!(mesh.signed_volume(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn box_is_centred_in_xy() {
        let mesh = box_mesh(10.0, 6.0, 1.0);
        let mut min = mesh.vertices[0];
        let mut max = mesh.vertices[0];
        for v in &mesh.vertices {
            min = min.inf(v);
            max = max.sup(v);
        }
        assert_eq!(min, Point3::new(-5.0, -3.0, 0.0));
        assert_eq!(max, Point3::new(5.0, 3.0, 1.0));
    }

    #[test]
    fn placed_mesh_is_translated() {
        let mesh = pad(100.0, 50.0).placed_mesh();
        assert_eq!(mesh.vertices[0], Point3::new(95.0, 45.0, 0.0));
        assert_eq!(mesh.vertices[6], Point3::new(105.0, 55.0, 0.4));
    }

    #[test]
    fn combined_mesh_offsets_indices() {
        let mesh = combined_mesh(&[pad(0.0, 0.0), pad(50.0, 0.0)]);
        assert_eq!(mesh.vertex_count(), 16);
        assert_eq!(mesh.face_count(), 24);
        assert_eq!(mesh.faces[12], [8, 10, 9]);
        assert_relative_eq!(mesh.signed_volume(), 2.0 * 10.0 * 10.0 * 0.4, epsilon = 1e-9);
    }

    #[test]
    fn empty_combination() {
        assert_eq!(combined_mesh(&[]), PadMesh::new());
    }
}
