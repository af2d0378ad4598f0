//! STL output for the combined pad mesh.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    - Header
//! UINT32       - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count (0)
//! end
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use nalgebra::{Point3, Vector3};
use tracing::info;

use crate::error::{TestPrintError, TestPrintResult};
use crate::layout::TestPad;
use crate::mesh::{combined_mesh, PadMesh};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Solid name used in ASCII output.
const SOLID_NAME: &str = "bed_test_pads";

fn unit_normal([a, b, c]: &[Point3<f64>; 3]) -> Vector3<f64> {
    let n = (b - a).cross(&(c - a));
    let len = n.norm();
    if len > f64::EPSILON {
        n / len
    } else {
        Vector3::zeros()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_vec_binary<W: Write>(writer: &mut W, x: f64, y: f64, z: f64) -> std::io::Result<()> {
    writer.write_all(&(x as f32).to_le_bytes())?;
    writer.write_all(&(y as f32).to_le_bytes())?;
    writer.write_all(&(z as f32).to_le_bytes())
}

fn write_binary<W: Write>(mesh: &PadMesh, mut writer: W) -> std::io::Result<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL: bed mesh test pads";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    let face_count = mesh.face_count() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let n = unit_normal(&tri);
        write_vec_binary(&mut writer, n.x, n.y, n.z)?;
        for v in &tri {
            write_vec_binary(&mut writer, v.x, v.y, v.z)?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }
    writer.flush()
}

fn write_ascii<W: Write>(mesh: &PadMesh, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "solid {SOLID_NAME}")?;
    for tri in mesh.triangles() {
        let n = unit_normal(&tri);
        writeln!(writer, "  facet normal {:.6e} {:.6e} {:.6e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in &tri {
            writeln!(writer, "      vertex {:.6e} {:.6e} {:.6e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid {SOLID_NAME}")?;
    writer.flush()
}

/// Write `mesh` as STL.
///
/// # Errors
///
/// Any error from `writer`.
pub fn write_stl<W: Write>(mesh: &PadMesh, writer: W, binary: bool) -> std::io::Result<()> {
    if binary {
        write_binary(mesh, writer)
    } else {
        write_ascii(mesh, writer)
    }
}

/// Save `mesh` as an STL file.
///
/// # Errors
///
/// [`TestPrintError::Io`] if the file cannot be written.
pub fn save_stl(mesh: &PadMesh, path: &Path, binary: bool) -> TestPrintResult<()> {
    let file = File::create(path).map_err(|e| TestPrintError::io(path, e))?;
    write_stl(mesh, BufWriter::new(file), binary).map_err(|e| TestPrintError::io(path, e))
}

/// Save every pad, baked at its bed position, into one STL file.
///
/// # Errors
///
/// [`TestPrintError::NoCells`] for no pads, [`TestPrintError::Io`] if the
/// file cannot be written.
pub fn export_combined_mesh(pads: &[TestPad], path: &Path, binary: bool) -> TestPrintResult<()> {
    if pads.is_empty() {
        return Err(TestPrintError::NoCells);
    }
    let mesh = combined_mesh(pads);
    save_stl(&mesh, path, binary)?;
    info!(
        path = %path.display(),
        pads = pads.len(),
        triangles = mesh.face_count(),
        binary,
        "Exported combined STL"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::mesh::box_mesh;

    #[test]
    fn binary_layout() {
        let mesh = box_mesh(1.0, 1.0, 1.0);
        let mut out = Vec::new();
        write_stl(&mesh, &mut out, true).unwrap();

        assert_eq!(out.len(), HEADER_SIZE + 4 + 12 * 50);
        let count = u32::from_le_bytes(out[80..84].try_into().unwrap());
        assert_eq!(count, 12);

        // First triangle is on the bottom face: normal -Z.
        let nz = f32::from_le_bytes(out[92..96].try_into().unwrap());
        assert_eq!(nz, -1.0);
    }

    #[test]
    fn ascii_layout() {
        let mesh = box_mesh(1.0, 1.0, 1.0);
        let mut out = Vec::new();
        write_stl(&mesh, &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("solid bed_test_pads\n"));
        assert!(text.trim_end().ends_with("endsolid bed_test_pads"));
        assert_eq!(text.matches("facet normal").count(), 12);
        assert_eq!(text.matches("vertex ").count(), 36);
    }

    #[test]
    fn empty_pad_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pads.stl");
        assert!(matches!(
            export_combined_mesh(&[], &path, true),
            Err(TestPrintError::NoCells)
        ));
        assert!(!path.exists());
    }
}
