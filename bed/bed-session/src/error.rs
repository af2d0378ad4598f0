//! Error types for edit sessions.

use bed_types::{CellCoord, GridError};
use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors raised by [`EditSession`](crate::EditSession) and
/// [`UndoStack`](crate::UndoStack).
///
/// None of these leave the grid partially modified: every operation
/// validates before it touches anything.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Undo was requested with nothing to undo.
    #[error("nothing to undo")]
    EmptyUndo,

    /// A user-entered value was rejected.
    #[error("invalid value {input:?}: {reason}")]
    Validation {
        /// The text or value as entered.
        input: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A cell lies outside the grid.
    #[error("cell {coord} is outside the {rows}x{cols} grid")]
    OutOfBounds {
        /// Offending cell.
        coord: CellCoord,
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
    },

    /// A baseline grid does not match the live grid's shape.
    #[error("baseline is {found_rows}x{found_cols}, grid is {rows}x{cols}")]
    BaselineShape {
        /// Grid rows.
        rows: usize,
        /// Grid columns.
        cols: usize,
        /// Baseline rows.
        found_rows: usize,
        /// Baseline columns.
        found_cols: usize,
    },

    /// An operation that needs a selection got none.
    #[error("no cells selected")]
    EmptySelection,

    /// Error from the underlying grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}
