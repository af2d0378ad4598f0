//! Test-print geometry for bed-mesh calibration.
//!
//! After editing mesh cells, the only way to know whether an edit is right
//! is to print something there. This crate generates thin square pads
//! centred on the physical bed position of chosen cells and exports them:
//!
//! - a combined STL with every pad baked at its absolute position,
//! - a 3MF scene where each pad is its own object placed by a transform,
//! - a JSON position guide with the pads' cells, positions and centroid.
//!
//! # Example
//!
//! ```
//! use bed_testprint::{combined_mesh, PadLayout, TestPrintParams};
//! use bed_types::{CellCoord, GridMetadata, MeshGrid};
//!
//! let grid = MeshGrid::filled(10, 10, 0.0).unwrap();
//! let layout = PadLayout::new(&GridMetadata::for_grid(&grid));
//!
//! let cells = [CellCoord::new(0, 0), CellCoord::new(9, 9)];
//! let pads = layout
//!     .generate_test_pads(&cells, &TestPrintParams::default())
//!     .unwrap();
//! assert_eq!(combined_mesh(&pads).face_count(), 24);
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod export;
mod guide;
mod layout;
mod mesh;
mod params;
mod stl;
mod threemf;

pub use error::{TestPrintError, TestPrintResult};
pub use export::{export_test_print, ExportOutcome};
pub use guide::{Coordinate, GuideCell, Instructions, MeshConfig, PositionGuide, TestPrintInfo};
pub use layout::{centroid, PadLayout, PadSize, TestPad};
pub use mesh::{box_mesh, combined_mesh, PadMesh};
pub use params::TestPrintParams;
pub use stl::{export_combined_mesh, save_stl, write_stl};
pub use threemf::{
    export_positioned_scene, model_rels_xml, part_model_xml, part_path, root_model_xml,
    transform_to_3mf_matrix,
};
