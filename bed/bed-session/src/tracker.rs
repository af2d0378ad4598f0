//! Per-cell modification history and test-confirmation state.
//!
//! Whether a cell is modified is never stored. It is derived on every query
//! by comparing the live grid to the original snapshot, so a cell that is
//! edited back to its original value silently becomes unmodified again.
//! Only the "confirmed by a test print" flag is explicit state.

use std::time::SystemTime;

use bed_types::{CellCoord, GridError, GridResult, MeshGrid, VALUE_TOLERANCE};
use hashbrown::{HashMap, HashSet};
use tracing::debug;

/// One recorded change of a cell value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModificationEntry {
    /// Value before the change.
    pub old_value: f64,
    /// Value after the change.
    pub new_value: f64,
    /// When the change was recorded.
    pub timestamp: SystemTime,
}

/// Classification of a cell relative to the original grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Current value equals the original.
    Unmodified,
    /// Changed and not yet confirmed by a test print.
    Untested,
    /// Changed and confirmed working.
    Working,
}

/// Summary counts from [`ModificationTracker::statistics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModificationStats {
    /// Cells whose value differs from the original.
    pub total_modified: usize,
    /// Size of the working set.
    pub working: usize,
    /// Modified cells not in the working set.
    pub untested: usize,
}

/// Tracks changes against an original snapshot.
///
/// # Example
///
/// ```
/// use bed_session::{CellState, ModificationTracker};
/// use bed_types::{CellCoord, MeshGrid};
///
/// let mut grid = MeshGrid::filled(3, 3, 0.0).unwrap();
/// let mut tracker = ModificationTracker::new(grid.clone());
/// let cell = CellCoord::new(1, 1);
///
/// let old = grid.set(cell, 0.05).unwrap();
/// tracker.record_modification(cell, old, 0.05);
/// assert_eq!(tracker.cell_state(cell, &grid), CellState::Untested);
///
/// tracker.mark_working([cell]);
/// assert_eq!(tracker.cell_state(cell, &grid), CellState::Working);
///
/// tracker.reset_cell_to_original(cell, &mut grid).unwrap();
/// assert_eq!(tracker.cell_state(cell, &grid), CellState::Unmodified);
/// ```
#[derive(Debug, Clone)]
pub struct ModificationTracker {
    original: MeshGrid,
    history: HashMap<CellCoord, Vec<ModificationEntry>>,
    working: HashSet<CellCoord>,
}

impl ModificationTracker {
    /// Start tracking against `original`.
    #[must_use]
    pub fn new(original: MeshGrid) -> Self {
        Self {
            original,
            history: HashMap::new(),
            working: HashSet::new(),
        }
    }

    /// The baseline grid.
    #[must_use]
    pub const fn original(&self) -> &MeshGrid {
        &self.original
    }

    /// Append a timestamped change for `coord`.
    ///
    /// Does not affect classification, which is always derived from values.
    pub fn record_modification(&mut self, coord: CellCoord, old_value: f64, new_value: f64) {
        self.history.entry(coord).or_default().push(ModificationEntry {
            old_value,
            new_value,
            timestamp: SystemTime::now(),
        });
    }

    /// Every recorded change for `coord`, oldest first.
    #[must_use]
    pub fn history(&self, coord: CellCoord) -> &[ModificationEntry] {
        self.history.get(&coord).map_or(&[][..], Vec::as_slice)
    }

    /// Cells with at least one history entry, sorted row-major.
    #[must_use]
    pub fn modified_history_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<_> = self.history.keys().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Whether `grid` differs from the original at `coord` by more than
    /// [`VALUE_TOLERANCE`].
    #[must_use]
    pub fn is_modified(&self, coord: CellCoord, grid: &MeshGrid) -> bool {
        match (grid.get(coord), self.original.get(coord)) {
            (Some(current), Some(original)) => (current - original).abs() > VALUE_TOLERANCE,
            _ => false,
        }
    }

    /// Classify `coord`.
    #[must_use]
    pub fn cell_state(&self, coord: CellCoord, grid: &MeshGrid) -> CellState {
        if !self.is_modified(coord, grid) {
            CellState::Unmodified
        } else if self.working.contains(&coord) {
            CellState::Working
        } else {
            CellState::Untested
        }
    }

    /// Add cells to the working set. Returns how many were newly added.
    ///
    /// Marking an unmodified cell is accepted but has no visible effect on
    /// classification; callers filter to modified cells first.
    pub fn mark_working(&mut self, cells: impl IntoIterator<Item = CellCoord>) -> usize {
        cells
            .into_iter()
            .filter(|&cell| self.working.insert(cell))
            .count()
    }

    /// Remove cells from the working set. Returns how many were present.
    pub fn unmark_working(&mut self, cells: impl IntoIterator<Item = CellCoord>) -> usize {
        cells
            .into_iter()
            .filter(|cell| self.working.remove(cell))
            .count()
    }

    /// Whether `coord` is in the working set.
    #[must_use]
    pub fn is_working(&self, coord: CellCoord) -> bool {
        self.working.contains(&coord)
    }

    /// The working set, sorted row-major.
    #[must_use]
    pub fn working_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<_> = self.working.iter().copied().collect();
        cells.sort_unstable();
        cells
    }

    /// Restore `coord` in `grid` to its original value.
    ///
    /// Records the reset as a history entry and drops the cell from the
    /// working set. Returns the restored value.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `coord` is outside the grid.
    pub fn reset_cell_to_original(
        &mut self,
        coord: CellCoord,
        grid: &mut MeshGrid,
    ) -> GridResult<f64> {
        let original = self.original.get(coord).ok_or(GridError::OutOfBounds {
            coord,
            rows: self.original.rows(),
            cols: self.original.cols(),
        })?;
        let old = grid.set(coord, original)?;
        self.record_modification(coord, old, original);
        self.working.remove(&coord);
        debug!(cell = %coord, old, original, "Reset cell to original");
        Ok(original)
    }

    /// Reset every modified cell. Returns the cells that were reset.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] if `grid` is smaller than the
    /// original.
    pub fn reset_all(&mut self, grid: &mut MeshGrid) -> GridResult<Vec<CellCoord>> {
        let cells = self.modified_cells(grid);
        for &cell in &cells {
            self.reset_cell_to_original(cell, grid)?;
        }
        self.working.clear();
        Ok(cells)
    }

    /// Counts of modified, working and untested cells.
    #[must_use]
    pub fn statistics(&self, grid: &MeshGrid) -> ModificationStats {
        let modified = self.modified_cells(grid);
        let untested = modified
            .iter()
            .filter(|cell| !self.working.contains(*cell))
            .count();
        ModificationStats {
            total_modified: modified.len(),
            working: self.working.len(),
            untested,
        }
    }

    /// Every modified cell, sorted row-major.
    #[must_use]
    pub fn modified_cells(&self, grid: &MeshGrid) -> Vec<CellCoord> {
        self.original
            .iter_cells()
            .map(|(cell, _)| cell)
            .filter(|&cell| self.is_modified(cell, grid))
            .collect()
    }

    /// Modified cells that are not in the working set, sorted row-major.
    #[must_use]
    pub fn untested_cells(&self, grid: &MeshGrid) -> Vec<CellCoord> {
        self.modified_cells(grid)
            .into_iter()
            .filter(|cell| !self.working.contains(cell))
            .collect()
    }

    /// Drop working-set members whose value is back at the original.
    /// Returns how many were dropped.
    pub fn prune_stale_working(&mut self, grid: &MeshGrid) -> usize {
        let before = self.working.len();
        let stale: Vec<_> = self
            .working
            .iter()
            .copied()
            .filter(|&cell| !self.is_modified(cell, grid))
            .collect();
        for cell in &stale {
            self.working.remove(cell);
        }
        before - self.working.len()
    }

    /// Replace the baseline and forget all history and working state.
    pub fn update_original(&mut self, original: MeshGrid) {
        self.original = original;
        self.history.clear();
        self.working.clear();
    }
}
