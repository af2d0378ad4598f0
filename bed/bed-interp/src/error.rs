//! Error types for interpolation.

use bed_types::GridError;
use thiserror::Error;

/// Result type for interpolation.
pub type InterpResult<T> = Result<T, InterpError>;

/// Errors that can occur while building the dense mesh.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum InterpError {
    /// A cubic spline needs at least four samples along each axis.
    #[error("bicubic interpolation needs at least {min} points along {axis}, got {count}")]
    TooFewPoints {
        /// `"x"` or `"y"`.
        axis: &'static str,
        /// Number of measured points along that axis.
        count: usize,
        /// Required minimum.
        min: usize,
    },

    /// Points-per-segment must be positive.
    #[error("points per segment must be positive, got {x}x{y}")]
    InvalidDensity {
        /// `mesh_x_pps`.
        x: u32,
        /// `mesh_y_pps`.
        y: u32,
    },

    /// The spline system could not be solved.
    #[error("spline system for {count} points is singular")]
    Singular {
        /// Number of samples.
        count: usize,
    },

    /// The resampled values did not fit the dense shape.
    #[error(transparent)]
    Grid(#[from] GridError),
}
