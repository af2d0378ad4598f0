//! Editing commands: load, apply one edit, report, save.

use std::path::Path;

use anyhow::{bail, Context, Result};
use bed::prelude::*;
use bed::session::{parse_user_value, Edit};
use clap::Args;
use owo_colors::OwoColorize;

use crate::{render, Target};

/// Which cells an edit applies to.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct Selection {
    /// A single cell, "Y,X"
    #[arg(long)]
    cell: Option<CellCoord>,

    /// An inclusive rectangle, "Y0,X0:Y1,X1"
    #[arg(long)]
    region: Option<CellRegion>,
}

impl Selection {
    fn cells(&self) -> Vec<CellCoord> {
        match (self.cell, self.region) {
            (Some(cell), _) => vec![cell],
            (None, Some(region)) => region.cells(),
            (None, None) => Vec::new(),
        }
    }
}

/// Save behaviour shared by every editing command.
#[derive(Args, Debug, Clone, Copy)]
pub struct SaveArgs {
    /// Show the result without writing the config
    #[arg(long)]
    dry_run: bool,
}

pub fn set(target: &Target, selection: &Selection, value: &str, save: SaveArgs) -> Result<()> {
    let value = parse_user_value(value)?;
    run(target, save, |s| s.set_region(&selection.cells(), value).map_err(Into::into))
}

pub fn adjust(target: &Target, selection: &Selection, delta: &str, save: SaveArgs) -> Result<()> {
    let delta = parse_user_value(delta)?;
    run(target, save, |s| s.adjust_cells(&selection.cells(), delta).map_err(Into::into))
}

pub fn average(target: &Target, selection: &Selection, save: SaveArgs) -> Result<()> {
    run(target, save, |s| s.average_region(&selection.cells()).map_err(Into::into))
}

pub fn smooth(target: &Target, selection: &Selection, save: SaveArgs) -> Result<()> {
    run(target, save, |s| s.smooth_region(&selection.cells()).map_err(Into::into))
}

pub fn flatten(target: &Target, save: SaveArgs) -> Result<()> {
    run(target, save, |s| s.flatten().map_err(Into::into))
}

pub fn offset(target: &Target, delta: &str, save: SaveArgs) -> Result<()> {
    let delta = parse_user_value(delta)?;
    run(target, save, |s| s.offset_all(delta).map_err(Into::into))
}

pub fn reset(target: &Target, selection: &Selection, from: &Path, save: SaveArgs) -> Result<()> {
    let mesh = target.load()?;
    let reference = target.load_other(from)?;
    let mut session = EditSession::with_baseline(mesh.grid, reference.grid, mesh.metadata)
        .with_context(|| format!("{} holds a different mesh", from.display()))?;
    let before = session.grid().clone();
    let edit = session.reset_cells(&selection.cells())?;
    finish(target, &before, &session, &edit, save)
}

fn run(
    target: &Target,
    save: SaveArgs,
    apply: impl FnOnce(&mut EditSession) -> Result<Edit>,
) -> Result<()> {
    let mesh = target.load()?;
    let mut session = EditSession::new(mesh.grid, mesh.metadata);
    let before = session.grid().clone();
    let edit = apply(&mut session)?;
    finish(target, &before, &session, &edit, save)
}

/// One `cell: old -> new (delta)` line per changed cell.
fn describe_changes(
    before: &MeshGrid,
    after: &MeshGrid,
    cells: &[CellCoord],
) -> Result<Vec<String>> {
    cells
        .iter()
        .map(|&cell| {
            let (Some(old), Some(new)) = (before.get(cell), after.get(cell)) else {
                bail!("cell {cell} left the grid");
            };
            Ok(format!("  {cell}: {old:.6} -> {new:.6} ({:+.6})", new - old))
        })
        .collect()
}

fn finish(
    target: &Target,
    before: &MeshGrid,
    session: &EditSession,
    edit: &Edit,
    save: SaveArgs,
) -> Result<()> {
    println!("{}", edit.description.bold());
    if edit.changed.is_empty() {
        println!("{}", "No cells changed.".dimmed());
        return Ok(());
    }

    render::grid(session.grid(), &edit.changed);
    for line in describe_changes(before, session.grid(), &edit.changed)? {
        println!("{line}");
    }

    if save.dry_run {
        println!("{}", "Dry run, config not written.".yellow());
        return Ok(());
    }

    let report = target.save(session.grid())?;
    match &report.backup {
        Some(backup) => println!(
            "{} {} (backup {})",
            "Saved".green().bold(),
            report.path.display(),
            backup.display()
        ),
        None => println!("{} {}", "Saved".green().bold(), report.path.display()),
    }
    Ok(())
}
