//! Error types for config parsing and saving.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while reading or writing the mesh block.
///
/// Every variant up to [`ConfigError::CountMismatch`] is a parse error in
/// the sense that the text does not hold a usable mesh; see
/// [`ConfigError::is_parse_error`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// No `[bed_mesh <profile>]` section header.
    #[error("section [bed_mesh {profile}] not found")]
    SectionNotFound {
        /// Profile that was searched for.
        profile: String,
    },

    /// The section exists but has no `points =` marker.
    #[error("section [bed_mesh {profile}] has no 'points =' line")]
    MissingPoints {
        /// Profile that was searched for.
        profile: String,
    },

    /// The `points =` marker is not followed by any mesh row.
    #[error("section [bed_mesh {profile}] contains no mesh rows")]
    NoRows {
        /// Profile that was searched for.
        profile: String,
    },

    /// A mesh row holds something that is not a finite number.
    #[error("line {line}: '{token}' is not a number")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// A mesh row has a different number of values than the first row.
    #[error("line {line}: row has {got} values, expected {expected}")]
    RaggedRow {
        /// 1-based line number.
        line: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of this row.
        got: usize,
    },

    /// A `key = value` field has an unusable value.
    #[error("line {line}: invalid value '{value}' for {key}")]
    InvalidField {
        /// 1-based line number.
        line: usize,
        /// Field name.
        key: String,
        /// Raw value text.
        value: String,
    },

    /// `x_count`/`y_count` disagrees with the parsed rows.
    #[error("{key} = {declared} but the mesh rows give {actual}")]
    CountMismatch {
        /// `x_count` or `y_count`.
        key: &'static str,
        /// Value written in the file.
        declared: usize,
        /// Value derived from the rows.
        actual: usize,
    },

    /// The on-disk mesh no longer has the shape of the grid being written.
    #[error("mesh in file is {found_rows}x{found_cols}, grid to write is {rows}x{cols}")]
    ShapeChanged {
        /// Rows of the grid being written.
        rows: usize,
        /// Columns of the grid being written.
        cols: usize,
        /// Rows currently in the file.
        found_rows: usize,
        /// Columns currently in the file.
        found_cols: usize,
    },

    /// The row-block span does not fit the text it is applied to.
    #[error("mesh block span {start}..{end} does not fit a text of {len} bytes")]
    StaleSpan {
        /// Span start.
        start: usize,
        /// Span end.
        end: usize,
        /// Text length.
        len: usize,
    },

    /// Writing the backup copy failed; the original file was not touched.
    #[error("failed to write backup '{path}': {source}")]
    Backup {
        /// Backup path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Any other file system failure.
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Whether this error means the text holds no valid mesh.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::SectionNotFound { .. }
                | Self::MissingPoints { .. }
                | Self::NoRows { .. }
                | Self::InvalidValue { .. }
                | Self::RaggedRow { .. }
                | Self::InvalidField { .. }
                | Self::CountMismatch { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
