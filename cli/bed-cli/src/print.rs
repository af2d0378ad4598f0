//! The `test-print` command.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bed::prelude::*;
use clap::Args;
use owo_colors::OwoColorize;

use crate::Target;

#[derive(Args, Debug)]
pub struct TestPrintArgs {
    #[command(flatten)]
    source: CellSource,

    /// Output directory
    #[arg(long)]
    out: PathBuf,

    /// File name stem for <stem>.stl, <stem>.3mf and <stem>_guide.json
    #[arg(long, default_value = "test_print")]
    stem: String,

    /// Write ASCII instead of binary STL
    #[arg(long)]
    ascii: bool,

    /// Pad height in mm
    #[arg(long, default_value_t = TestPrintParams::default().pad_height)]
    pad_height: f64,

    /// Gap left between neighbouring pads in mm
    #[arg(long, default_value_t = TestPrintParams::default().padding)]
    padding: f64,

    /// Smallest pad edge in mm
    #[arg(long, default_value_t = TestPrintParams::default().min_pad_size)]
    min_pad_size: f64,

    /// Print the export outcome as JSON
    #[arg(long)]
    json: bool,
}

/// Where the cells to print come from.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct CellSource {
    /// Cells as "Y,X;Y,X;..."
    #[arg(long)]
    cells: Option<String>,

    /// Print every cell that differs from this config (e.g. the backup)
    #[arg(long)]
    diff_against: Option<PathBuf>,
}

fn parse_cells(list: &str) -> Result<Vec<CellCoord>> {
    list.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<CellCoord>().with_context(|| format!("bad cell {s:?}")))
        .collect()
}

pub fn run(target: &Target, args: &TestPrintArgs) -> Result<()> {
    let mesh = target.load()?;

    let cells = match (&args.source.cells, &args.source.diff_against) {
        (Some(list), _) => parse_cells(list)?,
        (None, Some(path)) => {
            let reference = target.load_other(path)?;
            EditSession::with_baseline(mesh.grid, reference.grid, mesh.metadata.clone())
                .with_context(|| format!("{} holds a different mesh", path.display()))?
                .untested_cells()
        }
        (None, None) => Vec::new(),
    };
    if cells.is_empty() {
        bail!("no cells to print");
    }

    let params = TestPrintParams::default()
        .with_pad_height(args.pad_height)
        .with_padding(args.padding)
        .with_min_pad_size(args.min_pad_size)
        .with_binary_stl(!args.ascii);
    let layout = PadLayout::new(&mesh.metadata);
    let outcome = export_test_print(&cells, &layout, &params, &args.out, &args.stem);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for path in [&outcome.stl, &outcome.scene, &outcome.guide].into_iter().flatten() {
            println!("{} {}", "Wrote".green(), path.display());
        }
    }

    if !outcome.success {
        bail!(
            "test print export failed: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!("{} {} pads", "Test print ready:".bold(), outcome.pad_count);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cell_lists_parse() {
        assert_eq!(
            parse_cells("0,1; 3,4;").unwrap(),
            vec![CellCoord::new(0, 1), CellCoord::new(3, 4)]
        );
        assert!(parse_cells("0,1;x").is_err());
    }
}
