//! Row-major measured grid.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::{CellCoord, GridStatistics};

/// A rectangular grid of measured height offsets in millimetres.
///
/// Values are stored row-major: row `y` occupies
/// `values[y * cols .. (y + 1) * cols]`. Every cell is always populated and
/// the grid is never ragged; constructors reject input that would violate
/// either property.
///
/// Cloning produces a fully independent copy, which is what undo snapshots
/// and the tracker's original baseline rely on. Deserialization goes through
/// [`MeshGrid::from_vec`], so serialized grids obey the same invariants.
///
/// # Example
///
/// ```
/// use bed_types::{CellCoord, MeshGrid};
///
/// let grid = MeshGrid::filled(3, 4, 0.0).unwrap();
/// assert_eq!(grid.rows(), 3);
/// assert_eq!(grid.cols(), 4);
/// assert_eq!(grid.get(CellCoord::new(2, 3)), Some(0.0));
/// assert_eq!(grid.get(CellCoord::new(3, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct MeshGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

/// Unchecked serialized form of [`MeshGrid`].
#[derive(Deserialize)]
struct RawGrid {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl TryFrom<RawGrid> for MeshGrid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> GridResult<Self> {
        Self::from_vec(raw.rows, raw.cols, raw.values)
    }
}

impl MeshGrid {
    /// Build a grid from nested rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] if there are no rows or the first row is
    /// empty, and [`GridError::Ragged`] if any row differs in length from
    /// the first.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> GridResult<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let row_count = rows.len();
        let mut values = Vec::with_capacity(row_count * cols);
        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::Ragged {
                    row: index,
                    expected: cols,
                    got: row.len(),
                });
            }
            values.extend(row);
        }

        Ok(Self {
            rows: row_count,
            cols,
            values,
        })
    }

    /// Build a grid from a flat row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] for a zero dimension and
    /// [`GridError::SizeMismatch`] if `values.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> GridResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(GridError::Empty);
        }
        if values.len() != rows * cols {
            return Err(GridError::SizeMismatch {
                expected: rows * cols,
                got: values.len(),
            });
        }
        Ok(Self { rows, cols, values })
    }

    /// Build a grid with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] for a zero dimension.
    pub fn filled(rows: usize, cols: usize, value: f64) -> GridResult<Self> {
        Self::from_vec(rows, cols, vec![value; rows * cols])
    }

    /// Number of rows (Y point count).
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (X point count).
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of cells.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; a grid holds at least one cell.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `coord` addresses a cell of this grid.
    #[inline]
    #[must_use]
    pub const fn contains(&self, coord: CellCoord) -> bool {
        coord.y < self.rows && coord.x < self.cols
    }

    /// Check that `coord` is inside the grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] otherwise.
    pub fn check(&self, coord: CellCoord) -> GridResult<()> {
        if self.contains(coord) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                coord,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Value at `coord`, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, coord: CellCoord) -> Option<f64> {
        if self.contains(coord) {
            Some(self.values[coord.y * self.cols + coord.x])
        } else {
            None
        }
    }

    /// Overwrite the value at `coord`, returning the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` is outside the grid.
    pub fn set(&mut self, coord: CellCoord, value: f64) -> GridResult<f64> {
        self.check(coord)?;
        let slot = &mut self.values[coord.y * self.cols + coord.x];
        Ok(std::mem::replace(slot, value))
    }

    /// One row as a slice.
    #[must_use]
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        if y < self.rows {
            Some(&self.values[y * self.cols..(y + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterate rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.cols)
    }

    /// Iterate every cell with its coordinate, row-major.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellCoord, f64)> + '_ {
        let cols = self.cols;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| (CellCoord::new(i / cols, i % cols), v))
    }

    /// Flat row-major view of all values.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Mutable flat row-major view of all values.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Convert back to nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.iter_rows().map(<[f64]>::to_vec).collect()
    }

    /// Arithmetic mean of all values.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Summary statistics over all cells.
    #[must_use]
    pub fn statistics(&self) -> GridStatistics {
        GridStatistics::from_values(&self.values)
    }

    /// Largest absolute difference to `other`, or `None` if shapes differ.
    #[must_use]
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max),
        )
    }

    /// Whether both grids have the same shape and every cell agrees within
    /// `tolerance`.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.max_abs_diff(other).is_some_and(|d| d <= tolerance)
    }

    /// Cells whose value differs from `other` by more than `tolerance`.
    ///
    /// Returns an empty list when shapes differ.
    #[must_use]
    pub fn diff_cells(&self, other: &Self, tolerance: f64) -> Vec<CellCoord> {
        if self.shape() != other.shape() {
            return Vec::new();
        }
        self.iter_cells()
            .zip(&other.values)
            .filter(|((_, a), b)| (a - *b).abs() > tolerance)
            .map(|((coord, _), _)| coord)
            .collect()
    }
}

impl Index<CellCoord> for MeshGrid {
    type Output = f64;

    fn index(&self, coord: CellCoord) -> &f64 {
        assert!(
            self.contains(coord),
            "cell {coord} is outside the {}x{} grid",
            self.rows,
            self.cols
        );
        &self.values[coord.y * self.cols + coord.x]
    }
}
