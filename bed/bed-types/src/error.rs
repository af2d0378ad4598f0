//! Error types for grid construction and access.

use thiserror::Error;

use crate::CellCoord;

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur when building or indexing a [`MeshGrid`](crate::MeshGrid).
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// The grid would have no rows or no columns.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// A row has a different length than the first row.
    #[error("row {row} has {got} values, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        got: usize,
    },

    /// The flat value buffer does not match `rows * cols`.
    #[error("expected {expected} values, got {got}")]
    SizeMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Actual number of values.
        got: usize,
    },

    /// A coordinate lies outside the grid.
    #[error("cell {coord} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// The requested coordinate.
        coord: CellCoord,
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// Text could not be read as a cell coordinate or region.
    #[error("invalid cell '{input}': expected 'Y,X' or 'Y0,X0:Y1,X1'")]
    InvalidCoord {
        /// The text that failed to parse.
        input: String,
    },
}
