//! Best-effort export of a complete test print.

use std::fs;
use std::path::{Path, PathBuf};

use bed_types::CellCoord;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{TestPrintError, TestPrintResult};
use crate::guide::PositionGuide;
use crate::layout::PadLayout;
use crate::params::TestPrintParams;
use crate::stl::export_combined_mesh;
use crate::threemf::export_positioned_scene;

/// What [`export_test_print`] produced.
///
/// `success` is `false` if any step failed; paths of the files written
/// before the failure are still reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExportOutcome {
    /// Whether every file was written.
    pub success: bool,
    /// Number of pads exported.
    pub pad_count: usize,
    /// Combined STL.
    pub stl: Option<PathBuf>,
    /// Positioned 3MF scene.
    pub scene: Option<PathBuf>,
    /// JSON position guide.
    pub guide: Option<PathBuf>,
    /// Message of the error that stopped the export.
    pub error: Option<String>,
}

/// Write `<stem>.stl`, `<stem>.3mf` and `<stem>_guide.json` into `out_dir`.
///
/// Never fails: errors are logged and reported through
/// [`ExportOutcome::success`] and [`ExportOutcome::error`].
///
/// # Example
///
/// ```no_run
/// use bed_testprint::{export_test_print, PadLayout, TestPrintParams};
/// use bed_types::{CellCoord, GridMetadata, MeshGrid};
/// use std::path::Path;
///
/// let grid = MeshGrid::filled(7, 7, 0.0).unwrap();
/// let layout = PadLayout::new(&GridMetadata::for_grid(&grid));
/// let outcome = export_test_print(
///     &[CellCoord::new(3, 3)],
///     &layout,
///     &TestPrintParams::default(),
///     Path::new("out"),
///     "test_pads",
/// );
/// assert!(outcome.success);
/// ```
#[must_use]
pub fn export_test_print(
    cells: &[CellCoord],
    layout: &PadLayout,
    params: &TestPrintParams,
    out_dir: &Path,
    stem: &str,
) -> ExportOutcome {
    let mut outcome = ExportOutcome::default();
    match run_export(cells, layout, params, out_dir, stem, &mut outcome) {
        Ok(()) => {
            outcome.success = true;
            info!(
                out_dir = %out_dir.display(),
                pads = outcome.pad_count,
                "Test print exported"
            );
        }
        Err(e) => {
            error!(error = %e, out_dir = %out_dir.display(), "Test print export failed");
            outcome.success = false;
            outcome.error = Some(e.to_string());
        }
    }
    outcome
}

fn run_export(
    cells: &[CellCoord],
    layout: &PadLayout,
    params: &TestPrintParams,
    out_dir: &Path,
    stem: &str,
    outcome: &mut ExportOutcome,
) -> TestPrintResult<()> {
    let pads = layout.generate_test_pads(cells, params)?;
    outcome.pad_count = pads.len();
    let guide = PositionGuide::new(&pads, layout, params)?;

    fs::create_dir_all(out_dir).map_err(|e| TestPrintError::io(out_dir, e))?;

    let stl = out_dir.join(format!("{stem}.stl"));
    export_combined_mesh(&pads, &stl, params.binary_stl)?;
    outcome.stl = Some(stl);

    let scene = out_dir.join(format!("{stem}.3mf"));
    export_positioned_scene(&pads, &scene)?;
    outcome.scene = Some(scene);

    let guide_path = out_dir.join(format!("{stem}_guide.json"));
    guide.save(&guide_path)?;
    outcome.guide = Some(guide_path);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bed_types::{GridMetadata, MeshGrid};

    fn layout(n: usize) -> PadLayout {
        let grid = MeshGrid::filled(n, n, 0.0).unwrap();
        PadLayout::new(&GridMetadata::for_grid(&grid))
    }

    #[test]
    fn writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_test_print(
            &[CellCoord::new(0, 0), CellCoord::new(1, 2)],
            &layout(5),
            &TestPrintParams::default(),
            dir.path(),
            "pads",
        );
        assert!(outcome.success, "{:?}", outcome.error);
        assert_eq!(outcome.pad_count, 2);
        for path in [&outcome.stl, &outcome.scene, &outcome.guide] {
            assert!(path.as_ref().unwrap().is_file());
        }
        assert_eq!(outcome.guide.unwrap(), dir.path().join("pads_guide.json"));
    }

    #[test]
    fn failure_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_test_print(
            &[CellCoord::new(9, 9)],
            &layout(5),
            &TestPrintParams::default(),
            dir.path(),
            "pads",
        );
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("outside"));
        assert!(outcome.stl.is_none());
    }

    #[test]
    fn unwritable_directory_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the output directory should be.
        let blocker = dir.path().join("out");
        fs::write(&blocker, b"").unwrap();

        let outcome = export_test_print(
            &[CellCoord::new(0, 0)],
            &layout(4),
            &TestPrintParams::default(),
            &blocker,
            "pads",
        );
        assert!(!outcome.success);
        assert_eq!(outcome.pad_count, 1);
    }

    #[test]
    fn no_cells_fails_softly() {
        let dir = tempfile::tempdir().unwrap();
        let outcome = export_test_print(
            &[],
            &layout(4),
            &TestPrintParams::default(),
            dir.path(),
            "pads",
        );
        assert!(!outcome.success);
        assert_eq!(outcome.pad_count, 0);
    }
}
