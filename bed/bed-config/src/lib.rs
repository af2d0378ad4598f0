//! Bed mesh codec for Klipper `printer.cfg` files.
//!
//! This crate reads the measured bed mesh out of the auto-generated
//! `SAVE_CONFIG` block and writes an edited grid back without disturbing
//! anything else in the file:
//!
//! - [`parse`] / [`parse_with`] - text → [`ParsedMesh`] (grid, metadata,
//!   byte span of the row block)
//! - [`serialize`] - grid → `#*#` row lines with six decimals
//! - [`apply`] - splice serialized rows over the old block
//! - [`save_with_backup`] - overwrite a file after copying the old content to
//!   `<path>.backup`
//! - [`load`] / [`write_grid`] - the file-level round trip
//!
//! # Atomicity
//!
//! Parsing is pure and never mutates a previously loaded grid. Saving writes
//! the backup first and aborts if that fails; the target is then replaced
//! via a temp file and rename.
//!
//! # Example
//!
//! ```
//! use bed_config::{apply, parse, serialize};
//! use bed_types::CellCoord;
//!
//! let text = "[printer]\n#*# [bed_mesh default]\n#*# points =\n#*# \t  0.000000, 0.000000\n#*# \t  0.000000, 0.000000\n";
//! let mesh = parse(text).unwrap();
//!
//! let mut grid = mesh.grid.clone();
//! grid.set(CellCoord::new(0, 0), 0.05).unwrap();
//!
//! let updated = apply(text, &mesh, &serialize(&grid)).unwrap();
//! assert!(updated.contains("0.050000, 0.000000"));
//! assert!(updated.starts_with("[printer]\n"));
//! ```

#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod file;
mod parse;
mod write;

pub use error::{ConfigError, ConfigResult};
pub use file::{
    backup_path, load, read_config, save_with_backup, write_grid, SaveReport, BACKUP_SUFFIX,
};
pub use parse::{parse, parse_with, ParseOptions, ParsedMesh, COMMENT_PREFIX};
pub use write::{apply, serialize};
