//! Error types for test-print generation and export.

use std::io;
use std::path::PathBuf;

use bed_types::CellCoord;
use thiserror::Error;

/// Result type for test-print operations.
pub type TestPrintResult<T> = Result<T, TestPrintError>;

/// Errors that can occur while laying out or exporting test pads.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestPrintError {
    /// An axis has a single measured point, so positions cannot be mapped.
    #[error("cannot map {axis} positions with {count} measured point(s)")]
    DegenerateAxis {
        /// `"x"` or `"y"`.
        axis: &'static str,
        /// Point count along that axis.
        count: usize,
    },

    /// A requested cell is outside the mesh.
    #[error("cell {cell} is outside the {x_count}x{y_count} mesh")]
    CellOutOfRange {
        /// Offending cell.
        cell: CellCoord,
        /// Point count along X.
        x_count: usize,
        /// Point count along Y.
        y_count: usize,
    },

    /// Nothing to export.
    #[error("no cells selected for the test print")]
    NoCells,

    /// File system error.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Error building the 3MF archive.
    #[error("3MF archive error: {message}")]
    Zip {
        /// Description from the zip writer.
        message: String,
    },

    /// Error generating 3MF model XML.
    #[error("3MF model error: {message}")]
    Xml {
        /// Description from the XML writer.
        message: String,
    },

    /// Error serializing the position guide.
    #[error("position guide serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl TestPrintError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(err: impl std::fmt::Display) -> Self {
        Self::Zip {
            message: err.to_string(),
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}
