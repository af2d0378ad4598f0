//! Core bed-mesh types.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace:
//!
//! - [`MeshGrid`] - Row-major grid of measured height offsets (mm)
//! - [`CellCoord`] - A `(y, x)` index into the grid
//! - [`CellRegion`] - An inclusive rectangle of cells (drag selection)
//! - [`GridMetadata`] - Point counts, physical bounds, interpolation density
//! - [`GridStatistics`] - Min/max/range/mean/standard deviation summary
//!
//! # Layer 0 Crate
//!
//! No file I/O and no logging happen here. The codec, interpolator, session
//! and test-print crates all build on these types.
//!
//! # Indexing Convention
//!
//! `grid[y][x]` is the height at the measured point with Y-index `y` and
//! X-index `x`. Rows correspond to Y, columns to X, matching the order in
//! which the firmware writes `points` rows.
//!
//! # Example
//!
//! ```
//! use bed_types::{CellCoord, MeshGrid};
//!
//! let mut grid = MeshGrid::from_rows(vec![
//!     vec![0.0, 0.1, 0.2],
//!     vec![0.3, 0.4, 0.5],
//! ]).unwrap();
//!
//! assert_eq!(grid.shape(), (2, 3));
//! let old = grid.set(CellCoord::new(1, 2), 0.05).unwrap();
//! assert!((old - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod cell;
mod error;
mod grid;
mod metadata;
mod stats;

pub use cell::{CellCoord, CellRegion};
pub use error::{GridError, GridResult};
pub use grid::MeshGrid;
pub use metadata::{axis_position, GridMetadata, MeshBounds, PointsPerSegment};
pub use stats::GridStatistics;

pub use nalgebra::Point2;

/// Absolute tolerance below which two heights are considered equal.
///
/// Values are written with six decimals, so anything finer than this cannot
/// survive a save/load cycle anyway.
pub const VALUE_TOLERANCE: f64 = 1e-6;
