//! Edit sessions for bed meshes.
//!
//! This crate holds the in-memory state of one editing session:
//!
//! - [`EditSession`] - owns the live grid and applies user-level edits
//! - [`ModificationTracker`] - per-cell history against the original grid,
//!   plus the set of cells confirmed by a test print
//! - [`UndoStack`] - bounded history of whole-grid snapshots
//!
//! Nothing here is persisted. Loading a file starts a new session, and
//! accepting a saved grid as the new baseline clears tracking and undo.
//!
//! # Cell Classification
//!
//! | State | Condition |
//! |-------|-----------|
//! | [`CellState::Unmodified`] | `|current - original| <= 1e-6` |
//! | [`CellState::Untested`] | modified, not in the working set |
//! | [`CellState::Working`] | modified, in the working set |
//!
//! # Example
//!
//! ```
//! use bed_session::{CellState, EditSession};
//! use bed_types::{CellCoord, CellRegion, MeshGrid};
//!
//! let mut session = EditSession::from_grid(MeshGrid::filled(5, 5, 0.0).unwrap());
//! let region: CellRegion = "1,1:2,2".parse().unwrap();
//!
//! session.adjust_cells(&region.cells(), 0.05).unwrap();
//! session.mark_working(&[CellCoord::new(1, 1)]).unwrap();
//!
//! let stats = session.statistics();
//! assert_eq!((stats.total_modified, stats.working, stats.untested), (4, 1, 3));
//! assert_eq!(session.cell_state(CellCoord::new(2, 2)), CellState::Untested);
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod session;
mod tracker;
mod undo;

pub use error::{SessionError, SessionResult};
pub use session::{parse_user_value, Edit, EditSession};
pub use tracker::{CellState, ModificationEntry, ModificationStats, ModificationTracker};
pub use undo::{UndoEntry, UndoStack, DEFAULT_UNDO_CAPACITY};
