//! Mapping grid cells to physical pad placements.

use bed_types::{axis_position, CellCoord, GridMetadata, Point2};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{TestPrintError, TestPrintResult};
use crate::params::TestPrintParams;

/// Edge length of the pads, and whether it had to be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PadSize {
    /// Edge length in mm.
    pub size: f64,
    /// `true` if the spacing minus padding fell below the minimum.
    pub clamped: bool,
}

/// One square test pad centred on a measured point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestPad {
    /// Grid cell the pad tests.
    pub cell: CellCoord,
    /// Row-major index of the cell (`y * x_count + x`).
    pub grid_index: usize,
    /// Physical centre on the bed, mm.
    pub center: Point2<f64>,
    /// Edge length, mm.
    pub size: f64,
    /// Thickness, mm.
    pub height: f64,
}

/// Physical layout of the measured grid on the bed.
///
/// # Example
///
/// ```
/// use bed_testprint::PadLayout;
/// use bed_types::{GridMetadata, MeshBounds, MeshGrid};
///
/// let grid = MeshGrid::filled(5, 5, 0.0).unwrap();
/// let metadata = GridMetadata::for_grid(&grid)
///     .with_bounds(MeshBounds::new(10.0, 10.0, 210.0, 210.0));
/// let layout = PadLayout::new(&metadata);
///
/// let center = layout.cell_center(4, 0).unwrap();
/// assert_eq!((center.x, center.y), (210.0, 10.0));
/// ```
#[derive(Debug, Clone)]
pub struct PadLayout {
    metadata: GridMetadata,
}

impl PadLayout {
    /// Layout for the mesh described by `metadata`.
    #[must_use]
    pub fn new(metadata: &GridMetadata) -> Self {
        Self {
            metadata: metadata.clone(),
        }
    }

    /// The metadata this layout was built from.
    #[must_use]
    pub const fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    fn check_axes(&self) -> TestPrintResult<()> {
        if self.metadata.x_count < 2 {
            return Err(TestPrintError::DegenerateAxis {
                axis: "x",
                count: self.metadata.x_count,
            });
        }
        if self.metadata.y_count < 2 {
            return Err(TestPrintError::DegenerateAxis {
                axis: "y",
                count: self.metadata.y_count,
            });
        }
        Ok(())
    }

    /// Physical centre of the measured point at `(x_index, y_index)`.
    ///
    /// `min + index * (max - min) / (count - 1)` per axis; the last index
    /// returns `max` exactly.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::DegenerateAxis`] if an axis has fewer than two
    /// points, [`TestPrintError::CellOutOfRange`] for an index past the end.
    pub fn cell_center(&self, x_index: usize, y_index: usize) -> TestPrintResult<Point2<f64>> {
        self.check_axes()?;
        let m = &self.metadata;
        let out_of_range = || TestPrintError::CellOutOfRange {
            cell: CellCoord::new(y_index, x_index),
            x_count: m.x_count,
            y_count: m.y_count,
        };
        let x = axis_position(m.bounds.min.x, m.bounds.max.x, x_index, m.x_count)
            .ok_or_else(out_of_range)?;
        let y = axis_position(m.bounds.min.y, m.bounds.max.y, y_index, m.y_count)
            .ok_or_else(out_of_range)?;
        Ok(Point2::new(x, y))
    }

    /// Row-major index of `cell`.
    #[must_use]
    pub const fn grid_index(&self, cell: CellCoord) -> usize {
        cell.y * self.metadata.x_count + cell.x
    }

    /// Distance between neighbouring measured points, `(x, y)` in mm.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::DegenerateAxis`] if an axis has fewer than two
    /// points.
    pub fn spacing(&self) -> TestPrintResult<(f64, f64)> {
        self.check_axes()?;
        match (self.metadata.x_spacing(), self.metadata.y_spacing()) {
            (Some(x), Some(y)) => Ok((x, y)),
            _ => Err(TestPrintError::DegenerateAxis {
                axis: "x",
                count: self.metadata.x_count,
            }),
        }
    }

    /// Pad edge length: the smaller point spacing minus the padding,
    /// raised to `params.min_pad_size` if it would be smaller.
    ///
    /// # Errors
    ///
    /// Same as [`spacing`](Self::spacing).
    pub fn pad_size(&self, params: &TestPrintParams) -> TestPrintResult<PadSize> {
        let (dx, dy) = self.spacing()?;
        let size = dx.min(dy) - params.padding;
        if size < params.min_pad_size {
            warn!(
                computed = size,
                minimum = params.min_pad_size,
                "Pad size below minimum, clamping"
            );
            Ok(PadSize {
                size: params.min_pad_size,
                clamped: true,
            })
        } else {
            Ok(PadSize {
                size,
                clamped: false,
            })
        }
    }

    /// One pad per cell, in the order given.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::NoCells`] for an empty list, otherwise the errors
    /// of [`cell_center`](Self::cell_center).
    pub fn generate_test_pads(
        &self,
        cells: &[CellCoord],
        params: &TestPrintParams,
    ) -> TestPrintResult<Vec<TestPad>> {
        if cells.is_empty() {
            return Err(TestPrintError::NoCells);
        }
        let PadSize { size, .. } = self.pad_size(params)?;

        let pads = cells
            .iter()
            .map(|&cell| {
                Ok(TestPad {
                    cell,
                    grid_index: self.grid_index(cell),
                    center: self.cell_center(cell.x, cell.y)?,
                    size,
                    height: params.pad_height,
                })
            })
            .collect::<TestPrintResult<Vec<_>>>()?;

        debug!(pads = pads.len(), size, height = params.pad_height, "Generated test pads");
        Ok(pads)
    }
}

/// Mean of the pad centres.
///
/// # Errors
///
/// [`TestPrintError::NoCells`] for an empty list.
#[allow(clippy::cast_precision_loss)]
pub fn centroid(pads: &[TestPad]) -> TestPrintResult<Point2<f64>> {
    if pads.is_empty() {
        return Err(TestPrintError::NoCells);
    }
    let n = pads.len() as f64;
    let (sx, sy) = pads
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.center.x, sy + p.center.y));
    Ok(Point2::new(sx / n, sy / n))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bed_types::{MeshBounds, MeshGrid};

    fn layout(x_count: usize, y_count: usize) -> PadLayout {
        let grid = MeshGrid::filled(y_count, x_count, 0.0).unwrap();
        PadLayout::new(&GridMetadata::for_grid(&grid))
    }

    #[test]
    fn endpoints_are_exact() {
        let layout = layout(10, 10);
        let bounds = MeshBounds::default();

        let first = layout.cell_center(0, 0).unwrap();
        assert_eq!((first.x, first.y), (bounds.min.x, bounds.min.y));

        let last = layout.cell_center(9, 9).unwrap();
        assert_eq!((last.x, last.y), (bounds.max.x, bounds.max.y));
    }

    #[test]
    fn interior_centres_are_linear() {
        let layout = layout(10, 10);
        let c = layout.cell_center(3, 6).unwrap();
        assert_relative_eq!(c.x, 16.0 + 3.0 * 770.0 / 9.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 10.0 + 6.0 * 757.0 / 9.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_axis_is_degenerate() {
        let layout = layout(1, 5);
        assert!(matches!(
            layout.cell_center(0, 0),
            Err(TestPrintError::DegenerateAxis { axis: "x", count: 1 })
        ));
        let layout = self::layout(5, 1);
        assert!(matches!(
            layout.spacing(),
            Err(TestPrintError::DegenerateAxis { axis: "y", count: 1 })
        ));
    }

    #[test]
    fn index_past_end_is_rejected() {
        let layout = layout(4, 4);
        assert!(matches!(
            layout.cell_center(4, 0),
            Err(TestPrintError::CellOutOfRange { .. })
        ));
    }

    #[test]
    fn pad_size_from_spacing() {
        // 770/9 ≈ 85.6 and 757/9 ≈ 84.1, so Y wins.
        let layout = layout(10, 10);
        let size = layout.pad_size(&TestPrintParams::default()).unwrap();
        assert!(!size.clamped);
        assert_relative_eq!(size.size, 757.0 / 9.0 - 10.0, epsilon = 1e-9);
    }

    #[test]
    fn pad_size_is_clamped() {
        let grid = MeshGrid::filled(3, 3, 0.0).unwrap();
        let metadata =
            GridMetadata::for_grid(&grid).with_bounds(MeshBounds::new(0.0, 0.0, 20.0, 20.0));
        let layout = PadLayout::new(&metadata);
        let size = layout.pad_size(&TestPrintParams::default()).unwrap();
        assert_eq!(
            size,
            PadSize {
                size: 5.0,
                clamped: true
            }
        );
    }

    #[test]
    fn pads_carry_index_and_centre() {
        let layout = layout(10, 10);
        let params = TestPrintParams::default();
        let cells = [CellCoord::new(0, 0), CellCoord::new(2, 5)];
        let pads = layout.generate_test_pads(&cells, &params).unwrap();

        assert_eq!(pads.len(), 2);
        assert_eq!(pads[1].grid_index, 25);
        assert_eq!(pads[1].center, layout.cell_center(5, 2).unwrap());
        assert_eq!(pads[0].height, 0.4);
        assert_eq!(pads[0].size, pads[1].size);
    }

    #[test]
    fn no_cells_is_an_error() {
        let layout = layout(4, 4);
        assert!(matches!(
            layout.generate_test_pads(&[], &TestPrintParams::default()),
            Err(TestPrintError::NoCells)
        ));
        assert!(matches!(centroid(&[]), Err(TestPrintError::NoCells)));
    }

    #[test]
    fn centroid_is_mean_of_centres() {
        let layout = layout(5, 5);
        let cells = [CellCoord::new(0, 0), CellCoord::new(4, 4)];
        let pads = layout
            .generate_test_pads(&cells, &TestPrintParams::default())
            .unwrap();
        let c = centroid(&pads).unwrap();
        let bounds = MeshBounds::default();
        assert_relative_eq!(c.x, (bounds.min.x + bounds.max.x) / 2.0);
        assert_relative_eq!(c.y, (bounds.min.y + bounds.max.y) / 2.0);
    }
}
