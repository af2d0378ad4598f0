//! Parsing the `[bed_mesh <profile>]` block.
//!
//! Klipper appends the measured mesh to the end of `printer.cfg` inside the
//! auto-generated `SAVE_CONFIG` area, where every line carries a `#*#`
//! prefix:
//!
//! ```text
//! #*# [bed_mesh default]
//! #*# version = 1
//! #*# points =
//! #*#     0.012500, -0.002500, 0.030000
//! #*#     0.007500, 0.000000, 0.022500
//! #*# x_count = 3
//! #*# y_count = 2
//! #*# mesh_x_pps = 2
//! #*# mesh_y_pps = 2
//! #*# algo = lagrange
//! #*# tension = 0.2
//! #*# min_x = 16.0
//! #*# max_x = 786.0
//! #*# min_y = 10.0
//! #*# max_y = 767.0
//! ```
//!
//! The consecutive comma-separated `#*#` lines after `points =` form the
//! grid, first line = row 0. `key = value` lines anywhere in the section
//! supply the metadata.

use std::ops::Range;
use std::sync::LazyLock;

use bed_types::{GridMetadata, MeshBounds, MeshGrid, PointsPerSegment};
use regex::Regex;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};

/// Comment prefix of the auto-generated config area.
pub const COMMENT_PREFIX: &str = "#*#";

// The patterns are literals; compiling them cannot fail.
#[allow(clippy::unwrap_used)]
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:#\*#\s*)?\[\s*([^\]]+?)\s*\]\s*$").unwrap());

#[allow(clippy::unwrap_used)]
static POINTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\*#\s*points\s*=\s*$").unwrap());

#[allow(clippy::unwrap_used)]
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*#\*#\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*?)\s*$").unwrap()
});

/// Options controlling how the mesh block is located and which defaults
/// fill in missing metadata.
///
/// # Example
///
/// ```
/// use bed_config::ParseOptions;
/// use bed_types::PointsPerSegment;
///
/// let opts = ParseOptions::default()
///     .profile("hot_bed")
///     .default_pps(PointsPerSegment::new(2, 2));
/// assert_eq!(opts.profile, "hot_bed");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOptions {
    /// Mesh profile name; the section searched is `[bed_mesh <profile>]`.
    pub profile: String,
    /// Density used when `mesh_x_pps`/`mesh_y_pps` are absent.
    pub default_pps: PointsPerSegment,
    /// Measured area used when `min_x`/`max_x`/`min_y`/`max_y` are absent.
    pub default_bounds: MeshBounds,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            profile: "default".to_string(),
            default_pps: PointsPerSegment::default(),
            default_bounds: MeshBounds::default(),
        }
    }
}

impl ParseOptions {
    /// Set the profile name.
    #[must_use]
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Set the fallback density.
    #[must_use]
    pub fn default_pps(mut self, pps: PointsPerSegment) -> Self {
        self.default_pps = pps;
        self
    }

    /// Set the fallback measured area.
    #[must_use]
    pub fn default_bounds(mut self, bounds: MeshBounds) -> Self {
        self.default_bounds = bounds;
        self
    }

    fn section_name(&self) -> String {
        format!("bed_mesh {}", self.profile)
    }
}

/// A mesh read from config text, with the location of its row block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedMesh {
    /// Measured heights, row-major.
    pub grid: MeshGrid,
    /// Counts, bounds, density.
    pub metadata: GridMetadata,
    /// Profile the mesh was read from.
    pub profile: String,
    /// Byte range of the row lines (including the last line's newline, if
    /// any) within the parsed text.
    pub points_span: Range<usize>,
}

/// A single line of the input with its byte offset and 1-based number.
struct Line<'a> {
    number: usize,
    start: usize,
    /// Full line including the terminating newline, if present.
    raw: &'a str,
}

impl<'a> Line<'a> {
    fn text(&self) -> &'a str {
        self.raw.trim_end_matches(['\n', '\r'])
    }

    fn end(&self) -> usize {
        self.start + self.raw.len()
    }
}

fn lines(text: &str) -> Vec<Line<'_>> {
    let mut offset = 0;
    text.split_inclusive('\n')
        .enumerate()
        .map(|(i, raw)| {
            let line = Line {
                number: i + 1,
                start: offset,
                raw,
            };
            offset += raw.len();
            line
        })
        .collect()
}

/// Body of a mesh row line: `#*#`-prefixed, no `=`, and either
/// comma-separated or a single number (a one-column grid).
fn row_body(line: &str) -> Option<&str> {
    let body = line.trim_start().strip_prefix(COMMENT_PREFIX)?;
    if body.contains('=') {
        return None;
    }
    (body.contains(',') || body.trim().parse::<f64>().is_ok()).then_some(body)
}

/// Split a row into values. One trailing comma is tolerated; any other
/// empty token is an error.
fn parse_row(body: &str, line: usize) -> ConfigResult<Vec<f64>> {
    let body = body.trim();
    let body = body.strip_suffix(',').unwrap_or(body);
    body.split(',')
        .map(str::trim)
        .map(|token| match token.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(ConfigError::InvalidValue {
                line,
                token: token.to_string(),
            }),
        })
        .collect()
}

/// Parse the `[bed_mesh default]` block of a config file.
///
/// # Errors
///
/// Returns a parse error (see [`ConfigError::is_parse_error`]) when the
/// section, the `points =` marker or the rows are missing, when a row holds
/// a non-numeric token, when rows differ in length, or when `x_count` /
/// `y_count` contradict the rows.
///
/// # Example
///
/// ```
/// use bed_config::parse;
///
/// let text = "\
/// #*# [bed_mesh default]
/// #*# points =
/// #*# \t  0.1, 0.2
/// #*# \t  0.3, 0.4
/// #*# x_count = 2
/// #*# y_count = 2
/// ";
/// let mesh = parse(text).unwrap();
/// assert_eq!(mesh.grid.shape(), (2, 2));
/// ```
pub fn parse(text: &str) -> ConfigResult<ParsedMesh> {
    parse_with(text, &ParseOptions::default())
}

/// Parse the mesh block of the profile named in `options`.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_with(text: &str, options: &ParseOptions) -> ConfigResult<ParsedMesh> {
    let lines = lines(text);
    let wanted = options.section_name();

    let header = lines
        .iter()
        .position(|l| {
            SECTION_RE
                .captures(l.text())
                .is_some_and(|c| c[1].split_whitespace().eq(wanted.split_whitespace()))
        })
        .ok_or_else(|| ConfigError::SectionNotFound {
            profile: options.profile.clone(),
        })?;

    let body_end = lines[header + 1..]
        .iter()
        .position(|l| SECTION_RE.is_match(l.text()))
        .map_or(lines.len(), |i| header + 1 + i);
    let section = &lines[header + 1..body_end];

    let marker = section
        .iter()
        .position(|l| POINTS_RE.is_match(l.text()))
        .ok_or_else(|| ConfigError::MissingPoints {
            profile: options.profile.clone(),
        })?;

    let row_lines: Vec<&Line<'_>> = section[marker + 1..]
        .iter()
        .take_while(|l| row_body(l.text()).is_some())
        .collect();

    let (Some(first), Some(last)) = (row_lines.first(), row_lines.last()) else {
        return Err(ConfigError::NoRows {
            profile: options.profile.clone(),
        });
    };
    let points_span = first.start..last.end();

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(row_lines.len());
    for line in &row_lines {
        let body = row_body(line.text()).unwrap_or_default();
        let row = parse_row(body, line.number)?;
        if let Some(expected) = rows.first().map(Vec::len) {
            if row.len() != expected {
                return Err(ConfigError::RaggedRow {
                    line: line.number,
                    expected,
                    got: row.len(),
                });
            }
        }
        rows.push(row);
    }

    let grid = MeshGrid::from_rows(rows).map_err(|_| ConfigError::NoRows {
        profile: options.profile.clone(),
    })?;

    let metadata = parse_metadata(section, &grid, options)?;

    info!(
        profile = %options.profile,
        rows = grid.rows(),
        cols = grid.cols(),
        pps_x = metadata.pps.x,
        pps_y = metadata.pps.y,
        "Parsed bed mesh"
    );

    Ok(ParsedMesh {
        grid,
        metadata,
        profile: options.profile.clone(),
        points_span,
    })
}

#[derive(Default)]
struct Fields {
    x_count: Option<usize>,
    y_count: Option<usize>,
    x_pps: Option<u32>,
    y_pps: Option<u32>,
    min_x: Option<f64>,
    max_x: Option<f64>,
    min_y: Option<f64>,
    max_y: Option<f64>,
    algo: Option<String>,
}

fn field<T: std::str::FromStr>(line: usize, key: &str, value: &str) -> ConfigResult<T> {
    value.parse().map_err(|_| ConfigError::InvalidField {
        line,
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_metadata(
    section: &[Line<'_>],
    grid: &MeshGrid,
    options: &ParseOptions,
) -> ConfigResult<GridMetadata> {
    let mut fields = Fields::default();

    for line in section {
        let Some(caps) = FIELD_RE.captures(line.text()) else {
            continue;
        };
        let key = &caps[1];
        let value = &caps[2];
        let n = line.number;
        match key {
            "x_count" => fields.x_count = Some(field(n, key, value)?),
            "y_count" => fields.y_count = Some(field(n, key, value)?),
            "mesh_x_pps" => fields.x_pps = Some(field(n, key, value)?),
            "mesh_y_pps" => fields.y_pps = Some(field(n, key, value)?),
            "min_x" => fields.min_x = Some(field(n, key, value)?),
            "max_x" => fields.max_x = Some(field(n, key, value)?),
            "min_y" => fields.min_y = Some(field(n, key, value)?),
            "max_y" => fields.max_y = Some(field(n, key, value)?),
            "algo" => fields.algo = Some(value.to_string()),
            _ => {}
        }
    }

    let x_count = fields.x_count.unwrap_or(grid.cols());
    if x_count != grid.cols() {
        return Err(ConfigError::CountMismatch {
            key: "x_count",
            declared: x_count,
            actual: grid.cols(),
        });
    }
    let y_count = fields.y_count.unwrap_or(grid.rows());
    if y_count != grid.rows() {
        return Err(ConfigError::CountMismatch {
            key: "y_count",
            declared: y_count,
            actual: grid.rows(),
        });
    }

    // Both density values must be present to override the default pair.
    let pps = match (fields.x_pps, fields.y_pps) {
        (Some(x), Some(y)) => PointsPerSegment::new(x, y),
        _ => {
            debug!(
                x = options.default_pps.x,
                y = options.default_pps.y,
                "Mesh density not in file, using default"
            );
            options.default_pps
        }
    };

    let defaults = options.default_bounds;
    let bounds = MeshBounds::new(
        fields.min_x.unwrap_or(defaults.min.x),
        fields.min_y.unwrap_or(defaults.min.y),
        fields.max_x.unwrap_or(defaults.max.x),
        fields.max_y.unwrap_or(defaults.max.y),
    );

    Ok(GridMetadata {
        x_count,
        y_count,
        bounds,
        pps,
        algo: fields.algo,
    })
}
