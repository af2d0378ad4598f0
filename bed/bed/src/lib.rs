//! Bed-mesh calibration toolkit.
//!
//! This umbrella crate re-exports the `bed-*` crates under short module
//! names and offers a [`prelude`] with the types most programs need.
//!
//! # Quick Start
//!
//! ```no_run
//! use bed::prelude::*;
//! use std::path::Path;
//!
//! let path = Path::new("printer.cfg");
//! let options = ParseOptions::default();
//!
//! // Load the mesh and start editing
//! let mesh = bed::config::load(path, &options).unwrap();
//! let mut session = EditSession::new(mesh.grid, mesh.metadata);
//! session.adjust_cells(&[CellCoord::new(2, 3)], -0.02).unwrap();
//!
//! // Preview what the firmware will use
//! let dense = interpolate(session.grid(), session.metadata().pps).unwrap();
//! println!("dense mesh {:?}", dense.grid.shape());
//!
//! // Save with a backup and make the result the new baseline
//! bed::config::write_grid(path, &options, session.grid()).unwrap();
//! session.accept_baseline();
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - `MeshGrid`, `CellCoord`, `CellRegion`, `GridMetadata`
//! - [`config`] - Parse/serialize the `printer.cfg` mesh block, save with backup
//! - [`interp`] - Bicubic dense-mesh preview
//! - [`session`] - Edit session, modification tracking, undo
//! - [`testprint`] - Test pads as STL, 3MF and a JSON position guide

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core grid and metadata types.
pub use bed_types as types;

/// `printer.cfg` mesh codec and backup-on-save.
pub use bed_config as config;

/// Dense-mesh interpolation.
pub use bed_interp as interp;

/// Edit sessions, modification tracking and undo.
pub use bed_session as session;

/// Test-print geometry and export.
pub use bed_testprint as testprint;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports.
///
/// ```
/// use bed::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use bed_types::{
        CellCoord, CellRegion, GridMetadata, MeshBounds, MeshGrid, PointsPerSegment,
    };

    // Codec
    pub use bed_config::{load, parse, serialize, write_grid, ParseOptions, ParsedMesh};

    // Interpolation
    pub use bed_interp::{interpolate, DenseMesh};

    // Session
    pub use bed_session::{CellState, EditSession, ModificationStats, UndoStack};

    // Test print
    pub use bed_testprint::{export_test_print, ExportOutcome, PadLayout, TestPrintParams};
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_imports() {
        use prelude::*;

        let grid = MeshGrid::filled(4, 4, 0.0).ok();
        assert!(grid.is_some());
        assert_eq!(PointsPerSegment::default(), PointsPerSegment::new(4, 4));
    }

    #[test]
    fn module_reexports() {
        let _ = config::ParseOptions::default();
        let _ = testprint::TestPrintParams::default();
        let _ = session::UndoStack::default();
        assert_eq!(interp::MIN_SAMPLES, 4);
    }
}
