//! Serializing a grid and splicing it back into config text.

use std::fmt::Write as _;

use bed_types::MeshGrid;

use crate::error::{ConfigError, ConfigResult};
use crate::parse::{ParsedMesh, COMMENT_PREFIX};

/// Indentation Klipper writes between the comment prefix and the values.
const ROW_INDENT: &str = " \t  ";

/// Serialize a grid as `#*#` row lines.
///
/// One line per row, values with six decimals separated by `", "`, every
/// line newline-terminated.
///
/// # Example
///
/// ```
/// use bed_config::serialize;
/// use bed_types::MeshGrid;
///
/// let grid = MeshGrid::from_rows(vec![vec![0.05, 0.0], vec![0.0, -0.1]]).unwrap();
/// assert_eq!(
///     serialize(&grid),
///     "#*# \t  0.050000, 0.000000\n#*# \t  0.000000, -0.100000\n"
/// );
/// ```
#[must_use]
pub fn serialize(grid: &MeshGrid) -> String {
    let mut out = String::with_capacity(grid.rows() * (grid.cols() * 11 + 8));
    for row in grid.iter_rows() {
        out.push_str(COMMENT_PREFIX);
        out.push_str(ROW_INDENT);
        for (i, value) in row.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            // Writing into a String never fails.
            let _ = write!(out, "{value:.6}");
        }
        out.push('\n');
    }
    out
}

/// Replace the row block of `original` with `fragment`.
///
/// `mesh` must come from parsing `original`; its `points_span` marks the
/// bytes to replace. Everything outside the span is kept byte-for-byte. If
/// the original block ran to the end of the text without a newline, the
/// fragment's final newline is dropped so the file ending is unchanged too.
///
/// # Errors
///
/// Returns [`ConfigError::StaleSpan`] if the span does not lie on character
/// boundaries of `original`.
pub fn apply(original: &str, mesh: &ParsedMesh, fragment: &str) -> ConfigResult<String> {
    let span = mesh.points_span.clone();
    let stale = || ConfigError::StaleSpan {
        start: span.start,
        end: span.end,
        len: original.len(),
    };

    let before = original.get(..span.start).ok_or_else(stale)?;
    let block = original.get(span.clone()).ok_or_else(stale)?;
    let after = original.get(span.end..).ok_or_else(stale)?;

    let fragment = if block.ends_with('\n') {
        fragment
    } else {
        fragment.strip_suffix('\n').unwrap_or(fragment)
    };

    let mut out = String::with_capacity(before.len() + fragment.len() + after.len());
    out.push_str(before);
    out.push_str(fragment);
    out.push_str(after);
    Ok(out)
}
