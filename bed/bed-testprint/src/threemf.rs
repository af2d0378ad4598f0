//! 3MF output with one independently placed object per pad.
//!
//! Each pad's geometry lives in its own part file
//! `/3D/Objects/pad_<n>.model`, centred on the origin. The root model refers
//! to it through a production-extension component and places it with a
//! build-item `transform`, so slicers that read the scene graph see every
//! pad at its own bed position.
//!
//! The production extension is required by the root model, so every
//! `build`, `item`, `object` and `component` carries a fresh `p:UUID`, in
//! the part files too.
//!
//! # Package Layout
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! 3D/3dmodel.model
//! 3D/_rels/3dmodel.model.rels
//! 3D/Objects/pad_1.model
//! 3D/Objects/pad_2.model
//! ...
//! ```

use std::fs::File;
use std::io::{Cursor, Write};
use std::path::Path;

use nalgebra::Isometry3;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::info;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{TestPrintError, TestPrintResult};
use crate::layout::TestPad;
use crate::mesh::PadMesh;

/// 3MF core namespace.
const NAMESPACE_3MF: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// 3MF production extension namespace.
const NAMESPACE_PRODUCTION: &str =
    "http://schemas.microsoft.com/3dmanufacturing/production/2015/06";

/// Relationship type for 3D model parts.
const REL_TYPE_MODEL: &str = "http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel";

/// Content types XML for 3MF.
const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="model" ContentType="application/vnd.ms-package.3dmanufacturing-3dmodel+xml"/>
</Types>
"#;

/// Root relationships XML for 3MF.
const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Target="/3D/3dmodel.model" Id="rel0" Type="http://schemas.microsoft.com/3dmanufacturing/2013/01/3dmodel"/>
</Relationships>
"#;

/// Package path of the part file for pad number `n` (1-based).
#[must_use]
pub fn part_path(n: usize) -> String {
    format!("/3D/Objects/pad_{n}.model")
}

/// 3MF `transform` attribute for an isometry.
///
/// 3MF stores the affine matrix as `m00 m01 m02 m10 m11 m12 m20 m21 m22
/// m30 m31 m32`, where row `i` of the 3x3 block is the image of basis
/// vector `i` and the last three values are the translation.
///
/// # Example
///
/// ```
/// use bed_testprint::transform_to_3mf_matrix;
/// use nalgebra::Isometry3;
///
/// let t = Isometry3::translation(120.5, 80.0, 0.0);
/// assert_eq!(
///     transform_to_3mf_matrix(&t),
///     "1 0 0 0 1 0 0 0 1 120.5 80 0"
/// );
/// ```
#[must_use]
pub fn transform_to_3mf_matrix(t: &Isometry3<f64>) -> String {
    let r = t.rotation.to_rotation_matrix();
    let v = t.translation.vector;
    // Row-vector convention: row i of the 3MF block is column i of R.
    let values = [
        r[(0, 0)],
        r[(1, 0)],
        r[(2, 0)],
        r[(0, 1)],
        r[(1, 1)],
        r[(2, 1)],
        r[(0, 2)],
        r[(1, 2)],
        r[(2, 2)],
        v.x,
        v.y,
        v.z,
    ];
    values
        .iter()
        .map(|x| format_number(*x))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shortest decimal form with at most six fractional digits.
fn format_number(x: f64) -> String {
    let s = format!("{x:.6}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Append a fresh `p:UUID` attribute.
fn with_uuid(mut element: BytesStart<'_>) -> BytesStart<'_> {
    element.push_attribute(("p:UUID", new_uuid().as_str()));
    element
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> TestPrintResult<()> {
    writer.write_event(event).map_err(TestPrintError::xml)
}

fn open_model<W: Write>(writer: &mut Writer<W>, root: bool) -> TestPrintResult<()> {
    emit(writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut model = BytesStart::new("model");
    model.push_attribute(("unit", "millimeter"));
    model.push_attribute(("xml:lang", "en-US"));
    model.push_attribute(("xmlns", NAMESPACE_3MF));
    model.push_attribute(("xmlns:p", NAMESPACE_PRODUCTION));
    if root {
        model.push_attribute(("requiredextensions", "p"));
    }
    emit(writer, Event::Start(model))
}

/// Model XML for one part file: a single mesh object with id 1 and an
/// empty build.
///
/// # Errors
///
/// [`TestPrintError::Xml`] if the XML writer fails.
pub fn part_model_xml(mesh: &PadMesh) -> TestPrintResult<String> {
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

    open_model(&mut writer, false)?;
    emit(&mut writer, Event::Start(BytesStart::new("resources")))?;

    let mut object = BytesStart::new("object");
    object.push_attribute(("id", "1"));
    object.push_attribute(("type", "model"));
    emit(&mut writer, Event::Start(with_uuid(object)))?;
    emit(&mut writer, Event::Start(BytesStart::new("mesh")))?;

    emit(&mut writer, Event::Start(BytesStart::new("vertices")))?;
    for v in &mesh.vertices {
        let mut vertex = BytesStart::new("vertex");
        vertex.push_attribute(("x", format_number(v.x).as_str()));
        vertex.push_attribute(("y", format_number(v.y).as_str()));
        vertex.push_attribute(("z", format_number(v.z).as_str()));
        emit(&mut writer, Event::Empty(vertex))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("vertices")))?;

    emit(&mut writer, Event::Start(BytesStart::new("triangles")))?;
    for &[v1, v2, v3] in &mesh.faces {
        let mut triangle = BytesStart::new("triangle");
        triangle.push_attribute(("v1", v1.to_string().as_str()));
        triangle.push_attribute(("v2", v2.to_string().as_str()));
        triangle.push_attribute(("v3", v3.to_string().as_str()));
        emit(&mut writer, Event::Empty(triangle))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("triangles")))?;

    emit(&mut writer, Event::End(BytesEnd::new("mesh")))?;
    emit(&mut writer, Event::End(BytesEnd::new("object")))?;
    emit(&mut writer, Event::End(BytesEnd::new("resources")))?;
    emit(&mut writer, Event::Empty(with_uuid(BytesStart::new("build"))))?;
    emit(&mut writer, Event::End(BytesEnd::new("model")))?;

    String::from_utf8(buffer).map_err(TestPrintError::xml)
}

/// Root model XML: one component object and one placed build item per pad.
///
/// # Errors
///
/// [`TestPrintError::Xml`] if the XML writer fails.
pub fn root_model_xml(pads: &[TestPad]) -> TestPrintResult<String> {
    let mut buffer = Vec::new();
    let mut writer = Writer::new_with_indent(Cursor::new(&mut buffer), b' ', 2);

    open_model(&mut writer, true)?;

    let mut title = BytesStart::new("metadata");
    title.push_attribute(("name", "Title"));
    emit(&mut writer, Event::Start(title))?;
    emit(&mut writer, Event::Text(BytesText::new("Bed mesh test pads")))?;
    emit(&mut writer, Event::End(BytesEnd::new("metadata")))?;

    emit(&mut writer, Event::Start(BytesStart::new("resources")))?;
    for (i, pad) in pads.iter().enumerate() {
        let n = i + 1;
        let id = n.to_string();
        let name = format!("pad_{}_{}_{}", n, pad.cell.y, pad.cell.x);
        let mut object = BytesStart::new("object");
        object.push_attribute(("id", id.as_str()));
        object.push_attribute(("type", "model"));
        object.push_attribute(("name", name.as_str()));
        emit(&mut writer, Event::Start(with_uuid(object)))?;

        emit(&mut writer, Event::Start(BytesStart::new("components")))?;
        let path = part_path(n);
        let mut component = BytesStart::new("component");
        component.push_attribute(("p:path", path.as_str()));
        component.push_attribute(("objectid", "1"));
        emit(&mut writer, Event::Empty(with_uuid(component)))?;
        emit(&mut writer, Event::End(BytesEnd::new("components")))?;

        emit(&mut writer, Event::End(BytesEnd::new("object")))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("resources")))?;

    emit(&mut writer, Event::Start(with_uuid(BytesStart::new("build"))))?;
    for (i, pad) in pads.iter().enumerate() {
        let id = (i + 1).to_string();
        let placement = Isometry3::translation(pad.center.x, pad.center.y, 0.0);
        let matrix = transform_to_3mf_matrix(&placement);
        let mut item = BytesStart::new("item");
        item.push_attribute(("objectid", id.as_str()));
        item.push_attribute(("transform", matrix.as_str()));
        emit(&mut writer, Event::Empty(with_uuid(item)))?;
    }
    emit(&mut writer, Event::End(BytesEnd::new("build")))?;
    emit(&mut writer, Event::End(BytesEnd::new("model")))?;

    String::from_utf8(buffer).map_err(TestPrintError::xml)
}

/// Relationships from the root model to every part file.
#[must_use]
pub fn model_rels_xml(part_count: usize) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\n",
    );
    for n in 1..=part_count {
        xml.push_str(&format!(
            "  <Relationship Target=\"{}\" Id=\"rel{n}\" Type=\"{REL_TYPE_MODEL}\"/>\n",
            part_path(n)
        ));
    }
    xml.push_str("</Relationships>\n");
    xml
}

fn write_entry<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    contents: &str,
    path: &Path,
) -> TestPrintResult<()> {
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    zip.start_file(name, options).map_err(TestPrintError::zip)?;
    zip.write_all(contents.as_bytes())
        .map_err(|e| TestPrintError::io(path, e))
}

/// Save the pads as a 3MF scene, each pad its own placed object.
///
/// # Errors
///
/// [`TestPrintError::NoCells`] for no pads, [`TestPrintError::Io`],
/// [`TestPrintError::Zip`] or [`TestPrintError::Xml`] if writing fails.
pub fn export_positioned_scene(pads: &[TestPad], path: &Path) -> TestPrintResult<()> {
    if pads.is_empty() {
        return Err(TestPrintError::NoCells);
    }

    let file = File::create(path).map_err(|e| TestPrintError::io(path, e))?;
    let mut zip = ZipWriter::new(file);

    write_entry(&mut zip, "[Content_Types].xml", CONTENT_TYPES_XML, path)?;
    write_entry(&mut zip, "_rels/.rels", RELS_XML, path)?;
    write_entry(&mut zip, "3D/3dmodel.model", &root_model_xml(pads)?, path)?;
    write_entry(
        &mut zip,
        "3D/_rels/3dmodel.model.rels",
        &model_rels_xml(pads.len()),
        path,
    )?;
    for (i, pad) in pads.iter().enumerate() {
        let name = part_path(i + 1);
        let xml = part_model_xml(&pad.local_mesh())?;
        write_entry(&mut zip, name.trim_start_matches('/'), &xml, path)?;
    }

    zip.finish().map_err(TestPrintError::zip)?;

    info!(path = %path.display(), pads = pads.len(), "Exported positioned 3MF scene");
    Ok(())
}
