//! Read-only commands.

use std::path::Path;

use anyhow::{Context, Result};
use bed::prelude::*;
use bed::types::GridStatistics;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::{render, Target};

#[derive(Serialize)]
struct ShowReport<'a> {
    profile: &'a str,
    metadata: &'a GridMetadata,
    statistics: GridStatistics,
    points: Vec<Vec<f64>>,
}

pub fn show(target: &Target, json: bool) -> Result<()> {
    let mesh = target.load()?;

    if json {
        let report = ShowReport {
            profile: &mesh.profile,
            metadata: &mesh.metadata,
            statistics: mesh.grid.statistics(),
            points: mesh.grid.to_rows(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let m = &mesh.metadata;
    println!(
        "{} [bed_mesh {}] {}x{} points",
        "Mesh".bold(),
        mesh.profile,
        m.x_count,
        m.y_count
    );
    println!(
        "  bounds ({}, {}) - ({}, {}) mm, pps {}x{}, algo {}",
        m.bounds.min.x,
        m.bounds.min.y,
        m.bounds.max.x,
        m.bounds.max.y,
        m.pps.x,
        m.pps.y,
        m.algo.as_deref().unwrap_or("-")
    );
    println!();
    render::grid(&mesh.grid, &[]);
    println!();
    render::statistics(&mesh.grid.statistics());
    Ok(())
}

#[derive(Serialize)]
struct DenseReport {
    rows: usize,
    cols: usize,
    x_positions: Vec<f64>,
    y_positions: Vec<f64>,
    points: Vec<Vec<f64>>,
}

pub fn interpolate(target: &Target, json: bool) -> Result<()> {
    let mesh = target.load()?;
    let pps = mesh.metadata.pps;
    let dense = bed::interp::interpolate(&mesh.grid, pps)
        .context("mesh cannot be interpolated")?;
    let (rows, cols) = dense.grid.shape();

    if json {
        let report = DenseReport {
            rows,
            cols,
            x_positions: dense.x_positions(&mesh.metadata.bounds),
            y_positions: dense.y_positions(&mesh.metadata.bounds),
            points: dense.grid.to_rows(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (src_rows, src_cols) = dense.source_shape;
    println!(
        "{} {src_cols}x{src_rows} samples at {}x{} points per segment -> {cols}x{rows} points",
        "Dense mesh".bold(),
        pps.x,
        pps.y
    );
    render::statistics(&dense.grid.statistics());
    Ok(())
}

#[derive(Serialize)]
struct DiffEntry {
    row: usize,
    col: usize,
    against: f64,
    current: f64,
    delta: f64,
}

pub fn diff(target: &Target, against: &Path, json: bool) -> Result<()> {
    let mesh = target.load()?;
    let reference = target.load_other(against)?;
    let session = EditSession::with_baseline(mesh.grid, reference.grid, mesh.metadata)
        .with_context(|| format!("{} holds a different mesh", against.display()))?;

    let entries: Vec<DiffEntry> = session
        .modified_cells()
        .into_iter()
        .filter_map(|cell| {
            let current = session.grid().get(cell)?;
            let against = session.original().get(cell)?;
            Some(DiffEntry {
                row: cell.y,
                col: cell.x,
                against,
                current,
                delta: current - against,
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No differences.".green());
        return Ok(());
    }
    render::grid(session.grid(), &session.modified_cells());
    println!();
    println!("{} {} cells differ", "Diff".bold(), entries.len());
    for e in &entries {
        println!(
            "  ({}, {}): {:.6} -> {:.6} ({:+.6})",
            e.row, e.col, e.against, e.current, e.delta
        );
    }
    Ok(())
}
