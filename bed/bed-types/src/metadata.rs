//! Mesh metadata: point counts, physical bounds, interpolation density.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, MeshGrid};

/// Physical bounding box of the measured grid on the bed, in millimetres.
///
/// `min` is the position of cell `(0, 0)`, `max` the position of the last
/// cell `(y_count - 1, x_count - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshBounds {
    /// `(min_x, min_y)`.
    pub min: Point2<f64>,
    /// `(max_x, max_y)`.
    pub max: Point2<f64>,
}

impl MeshBounds {
    /// Create bounds from the two corner coordinates.
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min: Point2::new(min_x, min_y),
            max: Point2::new(max_x, max_y),
        }
    }

    /// Width along X.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Depth along Y.
    #[must_use]
    pub fn depth(&self) -> f64 {
        self.max.y - self.min.y
    }
}

impl Default for MeshBounds {
    /// Measured area of the reference printer (OrangeStorm Giga).
    fn default() -> Self {
        Self::new(16.0, 10.0, 786.0, 767.0)
    }
}

/// Interpolation density: dense points inserted per segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointsPerSegment {
    /// `mesh_x_pps`.
    pub x: u32,
    /// `mesh_y_pps`.
    pub y: u32,
}

impl PointsPerSegment {
    /// Create a density pair.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl Default for PointsPerSegment {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Everything about the mesh besides the values themselves.
///
/// Set once at load time and treated as read-only for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    /// Number of measured points along X (grid columns).
    pub x_count: usize,
    /// Number of measured points along Y (grid rows).
    pub y_count: usize,
    /// Physical measured area.
    pub bounds: MeshBounds,
    /// Interpolation density.
    pub pps: PointsPerSegment,
    /// Interpolation algorithm named in the file, if any.
    pub algo: Option<String>,
}

impl GridMetadata {
    /// Metadata for a grid with default bounds and density.
    #[must_use]
    pub fn for_grid(grid: &MeshGrid) -> Self {
        Self {
            x_count: grid.cols(),
            y_count: grid.rows(),
            bounds: MeshBounds::default(),
            pps: PointsPerSegment::default(),
            algo: None,
        }
    }

    /// Replace the bounds (builder pattern).
    #[must_use]
    pub fn with_bounds(mut self, bounds: MeshBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Replace the density (builder pattern).
    #[must_use]
    pub fn with_pps(mut self, pps: PointsPerSegment) -> Self {
        self.pps = pps;
        self
    }

    /// Distance between neighbouring measured points along X, or `None` for a
    /// single-column grid.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn x_spacing(&self) -> Option<f64> {
        (self.x_count > 1).then(|| self.bounds.width() / (self.x_count - 1) as f64)
    }

    /// Distance between neighbouring measured points along Y, or `None` for a
    /// single-row grid.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn y_spacing(&self) -> Option<f64> {
        (self.y_count > 1).then(|| self.bounds.depth() / (self.y_count - 1) as f64)
    }

    /// Physical position of a measured point.
    ///
    /// Returns `None` when the cell is out of range or an axis has a single
    /// measured point.
    #[must_use]
    pub fn physical_position(&self, cell: CellCoord) -> Option<Point2<f64>> {
        let x = axis_position(self.bounds.min.x, self.bounds.max.x, cell.x, self.x_count)?;
        let y = axis_position(self.bounds.min.y, self.bounds.max.y, cell.y, self.y_count)?;
        Some(Point2::new(x, y))
    }

    /// Measured point closest to a physical position, clamped to the grid.
    ///
    /// Returns `None` when an axis has a single measured point.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn nearest_cell(&self, position: Point2<f64>) -> Option<CellCoord> {
        let dx = self.x_spacing()?;
        let dy = self.y_spacing()?;
        let fx = ((position.x - self.bounds.min.x) / dx).round();
        let fy = ((position.y - self.bounds.min.y) / dy).round();
        let x = fx.clamp(0.0, (self.x_count - 1) as f64) as usize;
        let y = fy.clamp(0.0, (self.y_count - 1) as f64) as usize;
        Some(CellCoord::new(y, x))
    }
}

/// Map a point index to its physical coordinate along one axis.
///
/// `min + index * (max - min) / (count - 1)`, except that the last index
/// returns `max` verbatim so the far edge is exact.
///
/// Returns `None` if `count < 2` or `index >= count`.
///
/// # Example
///
/// ```
/// use bed_types::axis_position;
///
/// assert_eq!(axis_position(10.0, 20.0, 0, 3), Some(10.0));
/// assert_eq!(axis_position(10.0, 20.0, 1, 3), Some(15.0));
/// assert_eq!(axis_position(10.0, 20.0, 2, 3), Some(20.0));
/// assert_eq!(axis_position(10.0, 20.0, 0, 1), None);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn axis_position(min: f64, max: f64, index: usize, count: usize) -> Option<f64> {
    if count < 2 || index >= count {
        return None;
    }
    if index == count - 1 {
        return Some(max);
    }
    Some(min + index as f64 * (max - min) / (count - 1) as f64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn metadata() -> GridMetadata {
        let grid = MeshGrid::filled(10, 10, 0.0).unwrap();
        GridMetadata::for_grid(&grid)
    }

    #[test]
    fn defaults_match_reference_printer() {
        let meta = metadata();
        assert_eq!(meta.pps, PointsPerSegment::new(4, 4));
        assert_eq!(meta.bounds.min, Point2::new(16.0, 10.0));
        assert_eq!(meta.bounds.max, Point2::new(786.0, 767.0));
    }

    #[test]
    fn spacing() {
        let meta = metadata();
        assert_relative_eq!(meta.x_spacing().unwrap(), 770.0 / 9.0);
        assert_relative_eq!(meta.y_spacing().unwrap(), 757.0 / 9.0);
    }

    #[test]
    fn single_column_has_no_spacing() {
        let grid = MeshGrid::filled(3, 1, 0.0).unwrap();
        let meta = GridMetadata::for_grid(&grid);
        assert_eq!(meta.x_spacing(), None);
        assert_eq!(meta.physical_position(CellCoord::new(0, 0)), None);
    }

    #[test]
    fn corners_are_exact() {
        let meta = metadata();
        assert_eq!(
            meta.physical_position(CellCoord::new(0, 0)).unwrap(),
            meta.bounds.min
        );
        assert_eq!(
            meta.physical_position(CellCoord::new(9, 9)).unwrap(),
            meta.bounds.max
        );
        assert_eq!(meta.physical_position(CellCoord::new(10, 0)), None);
    }

    #[test]
    fn nearest_cell_round_trips() {
        let meta = metadata();
        for cell in [CellCoord::new(0, 0), CellCoord::new(4, 7), CellCoord::new(9, 9)] {
            let p = meta.physical_position(cell).unwrap();
            assert_eq!(meta.nearest_cell(p), Some(cell));
        }
        assert_eq!(
            meta.nearest_cell(Point2::new(-500.0, 5000.0)),
            Some(CellCoord::new(9, 0))
        );
    }
}
