//! JSON position guide that accompanies the exported pads.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{TestPrintError, TestPrintResult};
use crate::layout::{centroid, PadLayout, TestPad};
use crate::params::TestPrintParams;

/// A point in bed coordinates, mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// X, mm.
    pub x: f64,
    /// Y, mm.
    pub y: f64,
    /// Z, mm.
    pub z: f64,
}

/// Mesh geometry the pads were laid out on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    /// Measured points along X.
    pub x_count: usize,
    /// Measured points along Y.
    pub y_count: usize,
    /// `[min_x, min_y]`.
    pub mesh_min: [f64; 2],
    /// `[max_x, max_y]`.
    pub mesh_max: [f64; 2],
    /// Point spacing along X, mm.
    pub x_spacing: f64,
    /// Point spacing along Y, mm.
    pub y_spacing: f64,
}

/// Pad dimensions used for the print.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPrintInfo {
    /// Number of pads.
    pub pad_count: usize,
    /// Pad edge length, mm.
    pub pad_size_mm: f64,
    /// Pad thickness, mm.
    pub pad_height_mm: f64,
    /// Padding subtracted from the spacing, mm.
    pub padding_mm: f64,
    /// Whether the pad size was raised to the minimum.
    pub size_clamped: bool,
}

/// One pad in the guide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideCell {
    /// Row-major cell index.
    pub grid_index: usize,
    /// `[x, y]` bed position, mm.
    pub position_mm: [f64; 2],
    /// Grid row (Y index).
    pub row: usize,
    /// Grid column (X index).
    pub col: usize,
}

/// Step-by-step instructions for the operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    /// Ordered steps.
    pub steps: Vec<String>,
}

/// Where the pads belong and how to print them.
///
/// `move_tool_coordinate` is the centroid of all pad centres at half the
/// pad height: if a slicer recentres the imported pads, moving the group
/// to this point restores their bed positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionGuide {
    /// Where to move the pad group's centre.
    pub move_tool_coordinate: Coordinate,
    /// Mesh geometry.
    pub mesh_config: MeshConfig,
    /// Pad dimensions.
    pub test_print: TestPrintInfo,
    /// Every pad with its cell and position.
    pub modified_cells: Vec<GuideCell>,
    /// Operator instructions.
    pub instructions: Instructions,
}

impl PositionGuide {
    /// Build the guide for `pads`.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::NoCells`] for no pads, or a layout error if the
    /// mesh has a degenerate axis.
    pub fn new(
        pads: &[TestPad],
        layout: &PadLayout,
        params: &TestPrintParams,
    ) -> TestPrintResult<Self> {
        let center = centroid(pads)?;
        let (x_spacing, y_spacing) = layout.spacing()?;
        let pad_size = layout.pad_size(params)?;
        let metadata = layout.metadata();

        let move_tool_coordinate = Coordinate {
            x: center.x,
            y: center.y,
            z: params.pad_height / 2.0,
        };

        Ok(Self {
            move_tool_coordinate,
            mesh_config: MeshConfig {
                x_count: metadata.x_count,
                y_count: metadata.y_count,
                mesh_min: [metadata.bounds.min.x, metadata.bounds.min.y],
                mesh_max: [metadata.bounds.max.x, metadata.bounds.max.y],
                x_spacing,
                y_spacing,
            },
            test_print: TestPrintInfo {
                pad_count: pads.len(),
                pad_size_mm: pad_size.size,
                pad_height_mm: params.pad_height,
                padding_mm: params.padding,
                size_clamped: pad_size.clamped,
            },
            modified_cells: pads
                .iter()
                .map(|p| GuideCell {
                    grid_index: p.grid_index,
                    position_mm: [p.center.x, p.center.y],
                    row: p.cell.y,
                    col: p.cell.x,
                })
                .collect(),
            instructions: Instructions {
                steps: instruction_steps(&move_tool_coordinate, pads.len()),
            },
        })
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::Json`] if serialization fails.
    pub fn to_json(&self) -> TestPrintResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the guide to `path`.
    ///
    /// # Errors
    ///
    /// [`TestPrintError::Json`] or [`TestPrintError::Io`].
    pub fn save(&self, path: &Path) -> TestPrintResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| TestPrintError::io(path, e))?;
        info!(path = %path.display(), pads = self.modified_cells.len(), "Wrote position guide");
        Ok(())
    }
}

fn instruction_steps(target: &Coordinate, pad_count: usize) -> Vec<String> {
    vec![
        format!("Import the 3MF scene; it holds {pad_count} pad(s) already placed on the bed."),
        "If your slicer only accepts the STL, import it without auto-arranging or centring."
            .to_string(),
        format!(
            "If the pads were moved, select all of them and move the group centre to X={:.2} Y={:.2} Z={:.2}.",
            target.x, target.y, target.z
        ),
        "Print the first layer and inspect each pad for squish and adhesion.".to_string(),
        "Mark cells whose pads printed well as working; adjust the rest and print again."
            .to_string(),
    ]
}
