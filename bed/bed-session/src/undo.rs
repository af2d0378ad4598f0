//! Bounded undo history of whole-grid snapshots.

use std::collections::VecDeque;

use bed_types::MeshGrid;
use tracing::debug;

use crate::error::{SessionError, SessionResult};

/// Number of snapshots kept when no capacity is given.
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// One undo step: the grid as it was before an edit, and what the edit was.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    /// Owned copy of the grid before the edit.
    pub snapshot: MeshGrid,
    /// Human-readable description of the edit.
    pub description: String,
}

/// Undo stack with FIFO eviction.
///
/// Pushing onto a full stack drops the oldest entry. Popping is destructive;
/// there is no redo.
///
/// # Example
///
/// ```
/// use bed_session::UndoStack;
/// use bed_types::MeshGrid;
///
/// let mut undo = UndoStack::with_capacity(2);
/// let grid = MeshGrid::filled(2, 2, 0.0).unwrap();
/// undo.push(grid.clone(), "first");
/// undo.push(grid.clone(), "second");
/// undo.push(grid, "third");
///
/// assert_eq!(undo.len(), 2);
/// assert_eq!(undo.pop().unwrap().description, "third");
/// assert_eq!(undo.pop().unwrap().description, "second");
/// assert!(undo.pop().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoStack {
    /// Create a stack holding at most `capacity` entries (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a snapshot. Returns the evicted oldest entry, if any.
    pub fn push(
        &mut self,
        snapshot: MeshGrid,
        description: impl Into<String>,
    ) -> Option<UndoEntry> {
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        if let Some(old) = &evicted {
            debug!(description = %old.description, "Undo history full, dropped oldest entry");
        }
        self.entries.push_back(UndoEntry {
            snapshot,
            description: description.into(),
        });
        evicted
    }

    /// Remove and return the most recent entry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyUndo`] if there is nothing to undo.
    pub fn pop(&mut self) -> SessionResult<UndoEntry> {
        self.entries.pop_back().ok_or(SessionError::EmptyUndo)
    }

    /// Description of the entry [`pop`](Self::pop) would return.
    #[must_use]
    pub fn peek_description(&self) -> Option<&str> {
        self.entries.back().map(|e| e.description.as_str())
    }

    /// Descriptions from oldest to newest.
    pub fn descriptions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.description.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to undo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
