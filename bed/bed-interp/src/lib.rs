//! Dense-mesh preview for bed leveling.
//!
//! Klipper does not move on the sparse measured grid directly. It upsamples it
//! by `mesh_x_pps`/`mesh_y_pps` points per segment and compensates against
//! that dense surface. This crate computes the same surface so that what a
//! user previews is what the printer will use:
//!
//! - [`interpolate`] - measured grid + density → [`DenseMesh`]
//! - [`CubicSpline`] - the underlying 1-D not-a-knot cubic spline
//!
//! The interpolant is a tensor-product cubic spline without smoothing, so it
//! passes exactly through every measured value. Grids with fewer than four
//! points along an axis are rejected rather than silently fitted with a
//! lower degree.
//!
//! # Example
//!
//! ```
//! use bed_interp::interpolate;
//! use bed_types::{MeshGrid, PointsPerSegment};
//!
//! let grid = MeshGrid::filled(5, 5, 0.0).unwrap();
//! let dense = interpolate(&grid, PointsPerSegment::new(3, 3)).unwrap();
//! assert_eq!(dense.grid.shape(), (13, 13));
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bicubic;
mod error;
mod spline;

pub use bicubic::{dense_shape, interpolate, DenseMesh};
pub use error::{InterpError, InterpResult};
pub use spline::{resample_matrix, CubicSpline, MIN_SAMPLES};
