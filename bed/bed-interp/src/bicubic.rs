//! Tensor-product bicubic resampling of the measured grid.

use bed_types::{axis_position, MeshBounds, MeshGrid, PointsPerSegment};
use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{InterpError, InterpResult};
use crate::spline::{resample_matrix, MIN_SAMPLES};

/// The dense mesh produced by [`interpolate`].
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMesh {
    /// Interpolated heights, `(Y-1)*py+1` rows by `(X-1)*px+1` columns.
    pub grid: MeshGrid,
    /// Density used.
    pub pps: PointsPerSegment,
    /// `(rows, cols)` of the measured grid it was computed from.
    pub source_shape: (usize, usize),
}

impl DenseMesh {
    /// Physical X coordinate of every dense column.
    #[must_use]
    pub fn x_positions(&self, bounds: &MeshBounds) -> Vec<f64> {
        let n = self.grid.cols();
        (0..n)
            .filter_map(|i| axis_position(bounds.min.x, bounds.max.x, i, n))
            .collect()
    }

    /// Physical Y coordinate of every dense row.
    #[must_use]
    pub fn y_positions(&self, bounds: &MeshBounds) -> Vec<f64> {
        let n = self.grid.rows();
        (0..n)
            .filter_map(|i| axis_position(bounds.min.y, bounds.max.y, i, n))
            .collect()
    }

    /// Total number of dense points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.grid.len()
    }
}

/// Shape of the dense grid for a measured grid of `shape` at density `pps`.
///
/// # Example
///
/// ```
/// use bed_interp::dense_shape;
/// use bed_types::PointsPerSegment;
///
/// assert_eq!(dense_shape((10, 10), PointsPerSegment::new(4, 4)), (37, 37));
/// assert_eq!(dense_shape((5, 7), PointsPerSegment::new(3, 2)), (9, 19));
/// assert_eq!(dense_shape((0, 4), PointsPerSegment::new(3, 3)), (0, 10));
/// ```
#[must_use]
pub const fn dense_shape(shape: (usize, usize), pps: PointsPerSegment) -> (usize, usize) {
    let (rows, cols) = shape;
    (dense_len(rows, pps.y), dense_len(cols, pps.x))
}

/// An empty axis stays empty.
const fn dense_len(count: usize, per_segment: u32) -> usize {
    match count.checked_sub(1) {
        Some(segments) => segments * per_segment as usize + 1,
        None => 0,
    }
}

/// Resample the measured grid on the dense lattice the firmware uses.
///
/// Fits a cubic spline with not-a-knot ends through the samples along each
/// axis (samples at integer indices, no smoothing) and evaluates the
/// tensor product on `(X-1)*px + 1` columns by `(Y-1)*py + 1` rows spanning
/// the same index range. Every `px`-th column and `py`-th row reproduces the
/// measured values.
///
/// # Errors
///
/// Returns [`InterpError::TooFewPoints`] if either axis has fewer than four
/// measured points and [`InterpError::InvalidDensity`] if either density is
/// zero. There is no lower-degree fallback.
///
/// # Example
///
/// ```
/// use bed_interp::interpolate;
/// use bed_types::{MeshGrid, PointsPerSegment};
///
/// let flat = MeshGrid::filled(10, 10, 0.2).unwrap();
/// let dense = interpolate(&flat, PointsPerSegment::new(4, 4)).unwrap();
/// assert_eq!(dense.grid.shape(), (37, 37));
/// assert!(dense.grid.as_slice().iter().all(|v| (v - 0.2).abs() < 1e-12));
/// ```
pub fn interpolate(grid: &MeshGrid, pps: PointsPerSegment) -> InterpResult<DenseMesh> {
    if pps.x == 0 || pps.y == 0 {
        return Err(InterpError::InvalidDensity { x: pps.x, y: pps.y });
    }
    if grid.cols() < MIN_SAMPLES {
        return Err(InterpError::TooFewPoints {
            axis: "x",
            count: grid.cols(),
            min: MIN_SAMPLES,
        });
    }
    if grid.rows() < MIN_SAMPLES {
        return Err(InterpError::TooFewPoints {
            axis: "y",
            count: grid.rows(),
            min: MIN_SAMPLES,
        });
    }

    let wx = resample_matrix(grid.cols(), pps.x)?;
    let wy = resample_matrix(grid.rows(), pps.y)?;
    let samples = DMatrix::from_row_slice(grid.rows(), grid.cols(), grid.as_slice());

    let dense = wy * samples * wx.transpose();
    let (rows, cols) = dense.shape();

    // nalgebra is column-major; MeshGrid is row-major.
    let values: Vec<f64> = dense.transpose().as_slice().to_vec();
    let dense_grid = MeshGrid::from_vec(rows, cols, values)?;

    debug!(
        source_rows = grid.rows(),
        source_cols = grid.cols(),
        rows,
        cols,
        "Interpolated mesh"
    );

    Ok(DenseMesh {
        grid: dense_grid,
        pps,
        source_shape: grid.shape(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_precision_loss)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bed_types::CellCoord;

    fn bumpy(rows: usize, cols: usize) -> MeshGrid {
        let values = (0..rows * cols)
            .map(|i| ((i * 37 % 11) as f64 - 5.0) * 0.01)
            .collect();
        MeshGrid::from_vec(rows, cols, values).unwrap()
    }

    #[test]
    fn dense_shape_of_empty_axis() {
        let pps = PointsPerSegment::new(4, 4);
        assert_eq!(dense_shape((0, 0), pps), (0, 0));
        assert_eq!(dense_shape((1, 0), pps), (1, 0));
        assert_eq!(dense_shape((2, 2), pps), (5, 5));
    }

    #[test]
    fn flat_grid_stays_flat() {
        let grid = MeshGrid::filled(6, 8, -0.125).unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(3, 2)).unwrap();
        for &v in dense.grid.as_slice() {
            assert_relative_eq!(v, -0.125, epsilon = 1e-12);
        }
    }

    #[test]
    fn output_shape() {
        let grid = MeshGrid::filled(10, 10, 0.0).unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(4, 4)).unwrap();
        assert_eq!(dense.grid.shape(), (37, 37));
        assert_eq!(dense.point_count(), 37 * 37);

        let grid = MeshGrid::filled(5, 7, 0.0).unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(2, 3)).unwrap();
        assert_eq!(dense.grid.shape(), (13, 13));
        assert_eq!(dense.source_shape, (5, 7));
    }

    #[test]
    fn passes_through_measured_points() {
        let grid = bumpy(5, 6);
        let pps = PointsPerSegment::new(3, 2);
        let dense = interpolate(&grid, pps).unwrap();
        for (cell, v) in grid.iter_cells() {
            let dense_cell = CellCoord::new(cell.y * 2, cell.x * 3);
            assert_relative_eq!(dense.grid[dense_cell], v, epsilon = 1e-12);
        }
    }

    #[test]
    fn row_major_orientation_is_preserved() {
        // A grid that only varies along X must produce dense rows that are
        // identical to each other.
        let rows = 4;
        let cols = 6;
        let values = (0..rows * cols).map(|i| (i % cols) as f64).collect();
        let grid = MeshGrid::from_vec(rows, cols, values).unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(2, 2)).unwrap();

        let first = dense.grid.row(0).unwrap().to_vec();
        for row in dense.grid.iter_rows() {
            for (a, b) in row.iter().zip(&first) {
                assert_relative_eq!(*a, *b, epsilon = 1e-12);
            }
        }
        // Linear in X, so the midpoint between columns 0 and 1 is 0.5.
        assert_relative_eq!(first[1], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn bilinear_surface_is_reproduced() {
        let grid = MeshGrid::from_vec(
            4,
            5,
            (0..20)
                .map(|i| {
                    let (y, x) = ((i / 5) as f64, (i % 5) as f64);
                    0.01 * x * y - 0.02 * x + 0.03 * y
                })
                .collect(),
        )
        .unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(4, 4)).unwrap();
        for (cell, v) in dense.grid.iter_cells() {
            let (y, x) = (cell.y as f64 / 4.0, cell.x as f64 / 4.0);
            assert_relative_eq!(v, 0.01 * x * y - 0.02 * x + 0.03 * y, epsilon = 1e-12);
        }
    }

    #[test]
    fn degenerate_grids_fail() {
        let pps = PointsPerSegment::new(4, 4);
        assert!(matches!(
            interpolate(&MeshGrid::filled(5, 3, 0.0).unwrap(), pps),
            Err(InterpError::TooFewPoints { axis: "x", count: 3, .. })
        ));
        assert!(matches!(
            interpolate(&MeshGrid::filled(2, 5, 0.0).unwrap(), pps),
            Err(InterpError::TooFewPoints { axis: "y", count: 2, .. })
        ));
    }

    #[test]
    fn zero_density_fails() {
        let grid = MeshGrid::filled(4, 4, 0.0).unwrap();
        assert_eq!(
            interpolate(&grid, PointsPerSegment::new(0, 2)).unwrap_err(),
            InterpError::InvalidDensity { x: 0, y: 2 }
        );
    }

    #[test]
    fn physical_axes() {
        let grid = MeshGrid::filled(4, 4, 0.0).unwrap();
        let dense = interpolate(&grid, PointsPerSegment::new(2, 2)).unwrap();
        let bounds = MeshBounds::new(0.0, 100.0, 60.0, 160.0);
        let xs = dense.x_positions(&bounds);
        assert_eq!(xs.len(), 7);
        assert_relative_eq!(xs[0], 0.0);
        assert_relative_eq!(xs[3], 30.0);
        assert_relative_eq!(xs[6], 60.0);
        let ys = dense.y_positions(&bounds);
        assert_relative_eq!(ys[6], 160.0);
    }
}
