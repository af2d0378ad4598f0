//! The edit session: one live grid plus its tracker and undo history.

use bed_types::{CellCoord, GridMetadata, GridStatistics, MeshGrid};
use tracing::{debug, info};

use crate::error::{SessionError, SessionResult};
use crate::tracker::{CellState, ModificationStats, ModificationTracker};
use crate::undo::{UndoStack, DEFAULT_UNDO_CAPACITY};

/// Result of one applied edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Description pushed onto the undo stack.
    pub description: String,
    /// Cells whose value actually changed, sorted row-major.
    pub changed: Vec<CellCoord>,
}

/// Parse a value typed by the user.
///
/// # Errors
///
/// Returns [`SessionError::Validation`] for text that is not a finite
/// number.
///
/// # Example
///
/// ```
/// use bed_session::parse_user_value;
///
/// assert_eq!(parse_user_value(" -0.025 ").unwrap(), -0.025);
/// assert!(parse_user_value("abc").is_err());
/// assert!(parse_user_value("inf").is_err());
/// ```
pub fn parse_user_value(input: &str) -> SessionResult<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| SessionError::Validation {
            input: input.to_string(),
            reason: "not a number",
        })?;
    check_finite(value)
}

fn check_finite(value: f64) -> SessionResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SessionError::Validation {
            input: value.to_string(),
            reason: "must be finite",
        })
    }
}

/// An editing session over one bed mesh.
///
/// Owns the only mutable copy of the grid. Every edit validates its input
/// first, then pushes exactly one undo snapshot, applies the change and
/// records one history entry per changed cell. A rejected edit leaves the
/// grid and the undo history untouched.
///
/// # Example
///
/// ```
/// use bed_session::EditSession;
/// use bed_types::{CellCoord, MeshGrid};
///
/// let grid = MeshGrid::filled(3, 3, 0.0).unwrap();
/// let mut session = EditSession::from_grid(grid);
///
/// session.set_cell(CellCoord::new(0, 0), 0.05).unwrap();
/// assert_eq!(session.statistics().total_modified, 1);
///
/// assert_eq!(session.undo().unwrap(), "Set (0, 0) to 0.050000");
/// assert_eq!(session.statistics().total_modified, 0);
/// ```
#[derive(Debug, Clone)]
pub struct EditSession {
    grid: MeshGrid,
    metadata: GridMetadata,
    tracker: ModificationTracker,
    undo: UndoStack,
}

impl EditSession {
    /// Start a session on a freshly loaded grid.
    #[must_use]
    pub fn new(grid: MeshGrid, metadata: GridMetadata) -> Self {
        Self::with_undo_capacity(grid, metadata, DEFAULT_UNDO_CAPACITY)
    }

    /// Start a session with a custom undo depth.
    #[must_use]
    pub fn with_undo_capacity(grid: MeshGrid, metadata: GridMetadata, capacity: usize) -> Self {
        info!(
            rows = grid.rows(),
            cols = grid.cols(),
            undo_capacity = capacity,
            "Started edit session"
        );
        Self {
            tracker: ModificationTracker::new(grid.clone()),
            undo: UndoStack::with_capacity(capacity),
            grid,
            metadata,
        }
    }

    /// Start a session whose grid already differs from `original`.
    ///
    /// Used when the baseline comes from elsewhere, such as the `.backup`
    /// written by the last save. Cells that differ start out untested.
    ///
    /// # Errors
    ///
    /// [`SessionError::BaselineShape`] if the shapes differ.
    pub fn with_baseline(
        grid: MeshGrid,
        original: MeshGrid,
        metadata: GridMetadata,
    ) -> SessionResult<Self> {
        if grid.shape() != original.shape() {
            return Err(SessionError::BaselineShape {
                rows: grid.rows(),
                cols: grid.cols(),
                found_rows: original.rows(),
                found_cols: original.cols(),
            });
        }
        let mut session = Self::new(original, metadata);
        session.grid = grid;
        Ok(session)
    }

    /// Start a session with default metadata derived from the grid shape.
    #[must_use]
    pub fn from_grid(grid: MeshGrid) -> Self {
        let metadata = GridMetadata::for_grid(&grid);
        Self::new(grid, metadata)
    }

    /// The live grid.
    #[must_use]
    pub const fn grid(&self) -> &MeshGrid {
        &self.grid
    }

    /// Metadata the grid was loaded with.
    #[must_use]
    pub const fn metadata(&self) -> &GridMetadata {
        &self.metadata
    }

    /// The modification tracker.
    #[must_use]
    pub const fn tracker(&self) -> &ModificationTracker {
        &self.tracker
    }

    /// The undo history.
    #[must_use]
    pub const fn undo_stack(&self) -> &UndoStack {
        &self.undo
    }

    /// The baseline the session compares against.
    #[must_use]
    pub const fn original(&self) -> &MeshGrid {
        self.tracker.original()
    }

    /// Whether any cell differs from the baseline.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.grid.approx_eq(self.tracker.original(), bed_types::VALUE_TOLERANCE)
    }

    fn check_cell(&self, coord: CellCoord) -> SessionResult<()> {
        if self.grid.contains(coord) {
            Ok(())
        } else {
            Err(SessionError::OutOfBounds {
                coord,
                rows: self.grid.rows(),
                cols: self.grid.cols(),
            })
        }
    }

    /// Validate a selection and return it sorted without duplicates.
    fn selection(&self, cells: &[CellCoord]) -> SessionResult<Vec<CellCoord>> {
        if cells.is_empty() {
            return Err(SessionError::EmptySelection);
        }
        for &cell in cells {
            self.check_cell(cell)?;
        }
        let mut cells = cells.to_vec();
        cells.sort_unstable();
        cells.dedup();
        Ok(cells)
    }

    /// Push one snapshot, write `updates`, record every cell that changed.
    ///
    /// Working cells that the edit moved back to their original value leave
    /// the working set.
    fn commit(
        &mut self,
        description: String,
        updates: Vec<(CellCoord, f64)>,
    ) -> SessionResult<Edit> {
        for &(_, value) in &updates {
            check_finite(value)?;
        }
        self.undo.push(self.grid.clone(), description.clone());

        let mut changed = Vec::new();
        for (cell, value) in updates {
            let old = self.grid.set(cell, value)?;
            if old.total_cmp(&value).is_ne() {
                self.tracker.record_modification(cell, old, value);
                changed.push(cell);
            }
        }
        changed.sort_unstable();
        let pruned = self.tracker.prune_stale_working(&self.grid);

        info!(
            description = %description,
            changed = changed.len(),
            pruned,
            "Applied edit"
        );
        Ok(Edit {
            description,
            changed,
        })
    }

    /// Set one cell.
    ///
    /// # Errors
    ///
    /// [`SessionError::OutOfBounds`] or [`SessionError::Validation`] for a
    /// non-finite value.
    pub fn set_cell(&mut self, coord: CellCoord, value: f64) -> SessionResult<Edit> {
        self.check_cell(coord)?;
        let value = check_finite(value)?;
        self.commit(format!("Set {coord} to {value:.6}"), vec![(coord, value)])
    }

    /// Set every selected cell to the same value.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptySelection`], [`SessionError::OutOfBounds`] or
    /// [`SessionError::Validation`].
    pub fn set_region(&mut self, cells: &[CellCoord], value: f64) -> SessionResult<Edit> {
        let cells = self.selection(cells)?;
        let value = check_finite(value)?;
        let description = format!("Set {} cells to {value:.6}", cells.len());
        let updates = cells.into_iter().map(|c| (c, value)).collect();
        self.commit(description, updates)
    }

    /// Add `delta` to every selected cell.
    ///
    /// # Errors
    ///
    /// Same as [`set_region`](Self::set_region).
    pub fn adjust_cells(&mut self, cells: &[CellCoord], delta: f64) -> SessionResult<Edit> {
        let cells = self.selection(cells)?;
        let delta = check_finite(delta)?;
        let description = format!("Adjust {} cells by {delta:+.6}", cells.len());
        let updates = cells
            .into_iter()
            .map(|c| (c, self.grid[c] + delta))
            .collect();
        self.commit(description, updates)
    }

    /// Set every selected cell to the selection's mean.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptySelection`] or [`SessionError::OutOfBounds`].
    #[allow(clippy::cast_precision_loss)]
    pub fn average_region(&mut self, cells: &[CellCoord]) -> SessionResult<Edit> {
        let cells = self.selection(cells)?;
        let mean = cells.iter().map(|&c| self.grid[c]).sum::<f64>() / cells.len() as f64;
        let description = format!("Average {} cells to {mean:.6}", cells.len());
        let updates = cells.into_iter().map(|c| (c, mean)).collect();
        self.commit(description, updates)
    }

    /// Replace every selected cell with the mean of its 3x3 neighbourhood.
    ///
    /// Neighbours outside the grid are skipped. All means are taken from the
    /// grid as it was before the edit, so the result does not depend on the
    /// order cells are visited.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptySelection`] or [`SessionError::OutOfBounds`].
    pub fn smooth_region(&mut self, cells: &[CellCoord]) -> SessionResult<Edit> {
        let cells = self.selection(cells)?;
        let description = format!("Smooth {} cells", cells.len());
        let updates = cells
            .into_iter()
            .map(|c| (c, neighbourhood_mean(&self.grid, c)))
            .collect();
        self.commit(description, updates)
    }

    /// Set every cell to the grid mean.
    ///
    /// # Errors
    ///
    /// Only if the grid itself is inconsistent.
    pub fn flatten(&mut self) -> SessionResult<Edit> {
        let mean = self.grid.mean();
        let updates = self.grid.iter_cells().map(|(c, _)| (c, mean)).collect();
        self.commit(format!("Flatten to {mean:.6}"), updates)
    }

    /// Add `delta` to every cell.
    ///
    /// # Errors
    ///
    /// [`SessionError::Validation`] for a non-finite delta.
    pub fn offset_all(&mut self, delta: f64) -> SessionResult<Edit> {
        let delta = check_finite(delta)?;
        let updates = self
            .grid
            .iter_cells()
            .map(|(c, v)| (c, v + delta))
            .collect();
        self.commit(format!("Offset all by {delta:+.6}"), updates)
    }

    /// Restore the selected cells to their original values.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptySelection`] or [`SessionError::OutOfBounds`].
    pub fn reset_cells(&mut self, cells: &[CellCoord]) -> SessionResult<Edit> {
        let cells = self.selection(cells)?;
        let description = format!("Reset {} cells", cells.len());
        self.undo.push(self.grid.clone(), description.clone());

        let mut changed = Vec::new();
        for cell in cells {
            let was_modified = self.tracker.is_modified(cell, &self.grid);
            self.tracker.reset_cell_to_original(cell, &mut self.grid)?;
            if was_modified {
                changed.push(cell);
            }
        }

        info!(description = %description, changed = changed.len(), "Applied edit");
        Ok(Edit {
            description,
            changed,
        })
    }

    /// Restore every cell to its original value.
    ///
    /// # Errors
    ///
    /// Only if the grid itself is inconsistent.
    pub fn reset_all(&mut self) -> SessionResult<Edit> {
        let description = "Reset all cells".to_string();
        self.undo.push(self.grid.clone(), description.clone());
        let changed = self.tracker.reset_all(&mut self.grid)?;
        info!(changed = changed.len(), "Reset all cells");
        Ok(Edit {
            description,
            changed,
        })
    }

    /// Undo the most recent edit and return its description.
    ///
    /// Working-set members whose value is back at the original are dropped.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyUndo`] if there is nothing to undo.
    pub fn undo(&mut self) -> SessionResult<String> {
        let entry = self.undo.pop()?;
        self.grid = entry.snapshot;
        let pruned = self.tracker.prune_stale_working(&self.grid);
        info!(description = %entry.description, pruned, "Undid edit");
        Ok(entry.description)
    }

    /// Mark modified cells as confirmed by a test print.
    ///
    /// Unmodified cells in `cells` are skipped. Returns how many were newly
    /// marked.
    ///
    /// # Errors
    ///
    /// [`SessionError::OutOfBounds`].
    pub fn mark_working(&mut self, cells: &[CellCoord]) -> SessionResult<usize> {
        for &cell in cells {
            self.check_cell(cell)?;
        }
        let modified: Vec<_> = cells
            .iter()
            .copied()
            .filter(|&c| self.tracker.is_modified(c, &self.grid))
            .collect();
        let skipped = cells.len() - modified.len();
        let marked = self.tracker.mark_working(modified);
        debug!(marked, skipped, "Marked cells working");
        Ok(marked)
    }

    /// Remove cells from the working set. Returns how many were present.
    pub fn unmark_working(&mut self, cells: &[CellCoord]) -> usize {
        self.tracker.unmark_working(cells.iter().copied())
    }

    /// Classification of one cell.
    #[must_use]
    pub fn cell_state(&self, coord: CellCoord) -> CellState {
        self.tracker.cell_state(coord, &self.grid)
    }

    /// Modified/working/untested counts.
    #[must_use]
    pub fn statistics(&self) -> ModificationStats {
        self.tracker.statistics(&self.grid)
    }

    /// Min/max/mean/std of the live grid.
    #[must_use]
    pub fn grid_statistics(&self) -> GridStatistics {
        self.grid.statistics()
    }

    /// Every modified cell, sorted row-major.
    #[must_use]
    pub fn modified_cells(&self) -> Vec<CellCoord> {
        self.tracker.modified_cells(&self.grid)
    }

    /// Modified cells not yet confirmed working.
    #[must_use]
    pub fn untested_cells(&self) -> Vec<CellCoord> {
        self.tracker.untested_cells(&self.grid)
    }

    /// Make the current grid the new baseline, typically after a save.
    ///
    /// Clears history, the working set and the undo stack.
    pub fn accept_baseline(&mut self) {
        self.tracker.update_original(self.grid.clone());
        self.undo.clear();
        info!("Accepted current grid as baseline");
    }
}

#[allow(clippy::cast_precision_loss)]
fn neighbourhood_mean(grid: &MeshGrid, center: CellCoord) -> f64 {
    let ys = center.y.saturating_sub(1)..=(center.y + 1).min(grid.rows() - 1);
    let mut sum = 0.0;
    let mut count = 0usize;
    for y in ys {
        for x in center.x.saturating_sub(1)..=(center.x + 1).min(grid.cols() - 1) {
            sum += grid[CellCoord::new(y, x)];
            count += 1;
        }
    }
    sum / count as f64
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bed_types::CellRegion;

    fn session() -> EditSession {
        let grid = MeshGrid::from_rows(vec![
            vec![0.0, 0.1, 0.2, 0.3],
            vec![0.4, 0.5, 0.6, 0.7],
            vec![0.8, 0.9, 1.0, 1.1],
        ])
        .unwrap();
        EditSession::from_grid(grid)
    }

    fn region(s: &str) -> Vec<CellCoord> {
        s.parse::<CellRegion>().unwrap().cells()
    }

    #[test]
    fn with_baseline_classifies_differences() {
        let original = session().grid().clone();
        let mut grid = original.clone();
        grid.set(CellCoord::new(1, 2), 0.65).unwrap();

        let mut s =
            EditSession::with_baseline(grid, original.clone(), GridMetadata::for_grid(&original))
                .unwrap();
        assert_eq!(s.untested_cells(), vec![CellCoord::new(1, 2)]);
        assert!(s.undo_stack().is_empty());

        s.reset_cells(&[CellCoord::new(1, 2)]).unwrap();
        assert_eq!(s.grid(), &original);
    }

    #[test]
    fn with_baseline_rejects_other_shape() {
        let grid = MeshGrid::filled(2, 2, 0.0).unwrap();
        let original = MeshGrid::filled(2, 3, 0.0).unwrap();
        let metadata = GridMetadata::for_grid(&grid);
        assert!(matches!(
            EditSession::with_baseline(grid, original, metadata),
            Err(SessionError::BaselineShape { .. })
        ));
    }

    #[test]
    fn set_cell_records_and_pushes_undo() {
        let mut s = session();
        let edit = s.set_cell(CellCoord::new(1, 1), 0.55).unwrap();
        assert_eq!(edit.changed, vec![CellCoord::new(1, 1)]);
        assert_eq!(s.grid().get(CellCoord::new(1, 1)), Some(0.55));
        assert_eq!(s.undo_stack().len(), 1);
        assert_eq!(s.tracker().history(CellCoord::new(1, 1)).len(), 1);
        assert!(s.is_dirty());
    }

    #[test]
    fn out_of_bounds_is_rejected_without_side_effects() {
        let mut s = session();
        let err = s.set_cell(CellCoord::new(3, 0), 1.0).unwrap_err();
        assert!(matches!(err, SessionError::OutOfBounds { rows: 3, cols: 4, .. }));
        assert!(s.undo_stack().is_empty());

        let err = s
            .set_region(&[CellCoord::new(0, 0), CellCoord::new(0, 9)], 1.0)
            .unwrap_err();
        assert!(matches!(err, SessionError::OutOfBounds { .. }));
        assert_eq!(s.grid(), s.original());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut s = session();
        assert!(matches!(
            s.set_cell(CellCoord::new(0, 0), f64::NAN),
            Err(SessionError::Validation { .. })
        ));
        assert!(matches!(
            s.offset_all(f64::INFINITY),
            Err(SessionError::Validation { .. })
        ));
        assert!(s.undo_stack().is_empty());
    }

    #[test]
    fn empty_selection_is_rejected() {
        let mut s = session();
        assert_eq!(
            s.average_region(&[]).unwrap_err(),
            SessionError::EmptySelection
        );
    }

    #[test]
    fn adjust_adds_delta() {
        let mut s = session();
        s.adjust_cells(&region("0,0:0,1"), -0.05).unwrap();
        assert_relative_eq!(s.grid()[CellCoord::new(0, 0)], -0.05, epsilon = 1e-12);
        assert_relative_eq!(s.grid()[CellCoord::new(0, 1)], 0.05, epsilon = 1e-12);
        assert_relative_eq!(s.grid()[CellCoord::new(0, 2)], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn duplicate_cells_are_adjusted_once() {
        let mut s = session();
        let cell = CellCoord::new(2, 3);
        let edit = s.adjust_cells(&[cell, cell], 0.01).unwrap();
        assert_eq!(edit.changed, vec![cell]);
        assert_relative_eq!(s.grid()[cell], 1.11, epsilon = 1e-12);
    }

    #[test]
    fn average_sets_selection_to_mean() {
        let mut s = session();
        s.average_region(&region("0,0:1,1")).unwrap();
        for cell in region("0,0:1,1") {
            assert_relative_eq!(s.grid()[cell], 0.25, epsilon = 1e-12);
        }
        assert_relative_eq!(s.grid()[CellCoord::new(0, 2)], 0.2, epsilon = 1e-12);
    }

    #[test]
    fn smooth_uses_pre_edit_values() {
        let mut s = session();
        s.smooth_region(&region("0,0:0,1")).unwrap();
        // Corner (0,0): mean of 0.0, 0.1, 0.4, 0.5.
        assert_relative_eq!(s.grid()[CellCoord::new(0, 0)], 0.25, epsilon = 1e-12);
        // (0,1): mean of 0.0, 0.1, 0.2, 0.4, 0.5, 0.6 from the original grid.
        assert_relative_eq!(s.grid()[CellCoord::new(0, 1)], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn flatten_and_offset() {
        let mut s = session();
        s.flatten().unwrap();
        assert!(s.grid().as_slice().iter().all(|v| (v - 0.55).abs() < 1e-12));

        s.offset_all(0.1).unwrap();
        assert!(s.grid().as_slice().iter().all(|v| (v - 0.65).abs() < 1e-12));
        assert_eq!(s.undo_stack().len(), 2);
    }

    #[test]
    fn undo_restores_in_reverse_order() {
        let mut s = session();
        let start = s.grid().clone();
        s.set_cell(CellCoord::new(0, 0), 1.0).unwrap();
        let after_first = s.grid().clone();
        s.offset_all(0.5).unwrap();

        assert_eq!(s.undo().unwrap(), "Offset all by +0.500000");
        assert_eq!(s.grid(), &after_first);
        s.undo().unwrap();
        assert_eq!(s.grid(), &start);
        assert_eq!(s.undo().unwrap_err(), SessionError::EmptyUndo);
    }

    #[test]
    fn undo_prunes_stale_working_cells() {
        let mut s = session();
        let cell = CellCoord::new(2, 2);
        s.set_cell(cell, 2.0).unwrap();
        assert_eq!(s.mark_working(&[cell]).unwrap(), 1);
        assert_eq!(s.cell_state(cell), CellState::Working);

        s.undo().unwrap();
        assert_eq!(s.cell_state(cell), CellState::Unmodified);
        assert!(!s.tracker().is_working(cell));
    }

    #[test]
    fn edit_back_to_original_leaves_working_set() {
        let mut s = session();
        let cell = CellCoord::new(0, 0);
        s.set_cell(cell, 0.05).unwrap();
        s.mark_working(&[cell]).unwrap();

        s.set_cell(cell, 0.0).unwrap();
        let stats = s.statistics();
        assert_eq!(stats.total_modified, 0);
        assert_eq!(stats.working, 0);
        assert!(!s.tracker().is_working(cell));
    }

    #[test]
    fn working_cell_stays_while_still_modified() {
        let mut s = session();
        let cell = CellCoord::new(1, 3);
        s.adjust_cells(&[cell], 0.05).unwrap();
        s.mark_working(&[cell]).unwrap();

        s.adjust_cells(&[cell], 0.01).unwrap();
        assert_eq!(s.cell_state(cell), CellState::Working);
    }

    #[test]
    fn overflowing_results_are_rejected() {
        let mut s = session();
        let before = s.grid().clone();
        s.set_cell(CellCoord::new(0, 0), f64::MAX).unwrap();
        assert!(matches!(
            s.adjust_cells(&[CellCoord::new(0, 0)], f64::MAX),
            Err(SessionError::Validation { .. })
        ));
        assert!(matches!(
            s.offset_all(f64::MAX),
            Err(SessionError::Validation { .. })
        ));
        assert_eq!(s.undo_stack().len(), 1);
        s.undo().unwrap();
        assert_eq!(s.grid(), &before);
    }

    #[test]
    fn mark_working_skips_unmodified_cells() {
        let mut s = session();
        s.set_cell(CellCoord::new(0, 0), 1.0).unwrap();
        let marked = s
            .mark_working(&[CellCoord::new(0, 0), CellCoord::new(0, 1)])
            .unwrap();
        assert_eq!(marked, 1);
        assert_eq!(s.statistics().working, 1);
        assert_eq!(s.unmark_working(&[CellCoord::new(0, 0)]), 1);
        assert_eq!(s.untested_cells(), vec![CellCoord::new(0, 0)]);
    }

    #[test]
    fn reset_cells_restores_original() {
        let mut s = session();
        s.adjust_cells(&region("1,1:1,2"), 0.3).unwrap();
        s.mark_working(&[CellCoord::new(1, 1)]).unwrap();

        let edit = s.reset_cells(&region("1,0:1,2")).unwrap();
        assert_eq!(edit.changed, vec![CellCoord::new(1, 1), CellCoord::new(1, 2)]);
        assert_eq!(s.grid(), s.original());
        assert!(s.tracker().working_cells().is_empty());

        // The reset itself can be undone.
        s.undo().unwrap();
        assert_eq!(s.modified_cells().len(), 2);
    }

    #[test]
    fn reset_all_and_accept_baseline() {
        let mut s = session();
        s.offset_all(1.0).unwrap();
        let edit = s.reset_all().unwrap();
        assert_eq!(edit.changed.len(), 12);
        assert!(!s.is_dirty());

        s.set_cell(CellCoord::new(0, 3), 0.0).unwrap();
        s.accept_baseline();
        assert!(!s.is_dirty());
        assert_eq!(s.statistics().total_modified, 0);
        assert!(s.undo_stack().is_empty());
        assert_eq!(s.original()[CellCoord::new(0, 3)], 0.0);
    }

    #[test]
    fn setting_same_value_changes_nothing() {
        let mut s = session();
        let edit = s.set_cell(CellCoord::new(0, 1), 0.1).unwrap();
        assert!(edit.changed.is_empty());
        assert!(s.tracker().history(CellCoord::new(0, 1)).is_empty());
        assert_eq!(s.undo_stack().len(), 1);
    }

    #[test]
    fn user_value_parsing() {
        assert_eq!(parse_user_value("0.05").unwrap(), 0.05);
        assert!(matches!(
            parse_user_value(""),
            Err(SessionError::Validation {
                reason: "not a number",
                ..
            })
        ));
        assert!(matches!(
            parse_user_value("NaN"),
            Err(SessionError::Validation {
                reason: "must be finite",
                ..
            })
        ));
    }
}
