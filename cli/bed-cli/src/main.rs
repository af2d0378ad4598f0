//! `bedmesh`: inspect, edit and test-print Klipper bed meshes.
//!
//! Every command works on the `[bed_mesh <profile>]` block saved in a
//! `printer.cfg`. Editing commands write the file back with a `.backup`
//! copy of the previous version unless `--dry-run` is given.
//!
//! # Commands
//!
//! - `bedmesh show` - Print the grid and its statistics
//! - `bedmesh set|adjust|average|smooth|flatten|offset|reset` - Edit cells
//! - `bedmesh interpolate` - Dense-mesh preview summary
//! - `bedmesh diff --against <cfg>` - Cells that differ from another config
//! - `bedmesh test-print --out <dir>` - STL, 3MF and guide for test pads

mod edit;
mod inspect;
mod logging;
mod print;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bed::prelude::*;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

/// Klipper bed-mesh editor
#[derive(Parser)]
#[command(name = "bedmesh")]
#[command(about = "Inspect, edit and test-print Klipper bed meshes", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    target: Target,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// The config file and mesh profile a command works on.
#[derive(Args, Debug, Clone)]
pub struct Target {
    /// Path to printer.cfg
    #[arg(long, global = true, default_value = "printer.cfg")]
    config: PathBuf,

    /// Mesh profile name
    #[arg(long, global = true, default_value = "default")]
    profile: String,
}

impl Target {
    fn options(&self) -> ParseOptions {
        ParseOptions::default().profile(self.profile.clone())
    }

    /// Load the mesh block of the target file.
    pub fn load(&self) -> Result<ParsedMesh> {
        load_with(&self.config, &self.options())
    }

    /// Load another file with the same profile.
    pub fn load_other(&self, path: &Path) -> Result<ParsedMesh> {
        load_with(path, &self.options())
    }

    /// Write `grid` back into the target file with a backup.
    pub fn save(&self, grid: &MeshGrid) -> Result<bed::config::SaveReport> {
        write_grid(&self.config, &self.options(), grid)
            .with_context(|| format!("failed to save {}", self.config.display()))
    }
}

fn load_with(path: &Path, options: &ParseOptions) -> Result<ParsedMesh> {
    debug!(path = %path.display(), profile = %options.profile, "Loading mesh");
    load(path, options).with_context(|| {
        format!(
            "failed to load profile '{}' from {}",
            options.profile,
            path.display()
        )
    })
}

#[derive(Subcommand)]
enum Commands {
    /// Print the grid and statistics
    Show {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Set one cell or a region to a value
    Set {
        #[command(flatten)]
        selection: edit::Selection,

        /// New height in mm
        #[arg(long, allow_hyphen_values = true)]
        value: String,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Add a delta to a region
    Adjust {
        #[command(flatten)]
        selection: edit::Selection,

        /// Delta in mm (e.g. 0.01, -0.05)
        #[arg(long, allow_hyphen_values = true)]
        delta: String,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Set a region to its mean
    Average {
        #[command(flatten)]
        selection: edit::Selection,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Replace each cell of a region by its 3x3 neighbourhood mean
    Smooth {
        #[command(flatten)]
        selection: edit::Selection,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Set every cell to the grid mean
    Flatten {
        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Add a delta to every cell
    Offset {
        /// Delta in mm
        #[arg(long, allow_hyphen_values = true)]
        delta: String,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Restore a region to the values in another config (e.g. the backup)
    Reset {
        #[command(flatten)]
        selection: edit::Selection,

        /// Config holding the values to restore
        #[arg(long)]
        from: PathBuf,

        #[command(flatten)]
        save: edit::SaveArgs,
    },

    /// Summarize the dense mesh the firmware will interpolate
    Interpolate {
        /// Emit the full dense grid as JSON
        #[arg(long)]
        json: bool,
    },

    /// List cells that differ from another config
    Diff {
        /// Config to compare against (e.g. printer.cfg.backup)
        #[arg(long)]
        against: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Generate test pads as STL, 3MF and a JSON position guide
    TestPrint(print::TestPrintArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let target = &cli.target;

    match cli.command {
        Commands::Show { json } => inspect::show(target, json),
        Commands::Set {
            selection,
            value,
            save,
        } => edit::set(target, &selection, &value, save),
        Commands::Adjust {
            selection,
            delta,
            save,
        } => edit::adjust(target, &selection, &delta, save),
        Commands::Average { selection, save } => edit::average(target, &selection, save),
        Commands::Smooth { selection, save } => edit::smooth(target, &selection, save),
        Commands::Flatten { save } => edit::flatten(target, save),
        Commands::Offset { delta, save } => edit::offset(target, &delta, save),
        Commands::Reset {
            selection,
            from,
            save,
        } => edit::reset(target, &selection, &from, save),
        Commands::Interpolate { json } => inspect::interpolate(target, json),
        Commands::Diff { against, json } => inspect::diff(target, &against, json),
        Commands::TestPrint(args) => print::run(target, &args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn selection_flags_are_exclusive() {
        assert!(Cli::try_parse_from(["bedmesh", "average", "--cell", "0,0"]).is_ok());
        assert!(Cli::try_parse_from(["bedmesh", "average"]).is_err());
        assert!(
            Cli::try_parse_from(["bedmesh", "average", "--cell", "0,0", "--region", "0,0:1,1"])
                .is_err()
        );
    }

    #[test]
    fn negative_deltas_parse() {
        let cli = Cli::try_parse_from(["bedmesh", "offset", "--delta", "-0.05", "--dry-run"]);
        assert!(cli.is_ok());
    }
}
