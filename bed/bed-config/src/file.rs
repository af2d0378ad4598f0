//! File-level load and save with a backup copy.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bed_types::MeshGrid;
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::parse::{parse_with, ParseOptions, ParsedMesh};
use crate::write::{apply, serialize};

/// Suffix appended to the config path for the backup copy.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Path of the backup copy for `path` (`printer.cfg` → `printer.cfg.backup`).
///
/// # Example
///
/// ```
/// use bed_config::backup_path;
/// use std::path::Path;
///
/// assert_eq!(
///     backup_path(Path::new("/home/pi/printer.cfg")),
///     Path::new("/home/pi/printer.cfg.backup")
/// );
/// ```
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// The file that was written.
    pub path: PathBuf,
    /// Where the previous content went, if there was a previous file.
    pub backup: Option<PathBuf>,
    /// Bytes written to `path`.
    pub bytes_written: usize,
}

/// Read a config file as text.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read.
pub fn read_config(path: &Path) -> ConfigResult<String> {
    fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
}

/// Read and parse a config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or any parse
/// error from [`parse_with`].
pub fn load(path: &Path, options: &ParseOptions) -> ConfigResult<ParsedMesh> {
    let text = read_config(path)?;
    let mesh = parse_with(&text, options)?;
    info!(path = %path.display(), "Loaded bed mesh");
    Ok(mesh)
}

fn write_durably(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

/// Overwrite `path` with `new_text`, keeping the previous content in
/// [`backup_path`].
///
/// The backup is written and synced first. If that fails, the target is not
/// touched. The new content is then written to a sibling temp file and
/// renamed over the target, so a failed write never leaves a truncated
/// config behind. A missing target is simply created, without backup.
/// An existing target keeps its permissions.
///
/// # Errors
///
/// Returns [`ConfigError::Backup`] if the backup cannot be written and
/// [`ConfigError::Io`] for any other file system failure.
pub fn save_with_backup(path: &Path, new_text: &str) -> ConfigResult<SaveReport> {
    let backup = match fs::read(path) {
        Ok(previous) => {
            let permissions = fs::metadata(path)
                .map_err(|e| ConfigError::io(path, e))?
                .permissions();
            let backup = backup_path(path);
            write_durably(&backup, &previous).map_err(|source| ConfigError::Backup {
                path: backup.clone(),
                source,
            })?;
            debug!(backup = %backup.display(), bytes = previous.len(), "Wrote backup");
            Some((backup, permissions))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(ConfigError::io(path, e)),
    };

    let mut temp = OsString::from(path.as_os_str());
    temp.push(".tmp");
    let temp = PathBuf::from(temp);
    write_durably(&temp, new_text.as_bytes()).map_err(|e| ConfigError::io(&temp, e))?;
    let (backup, permissions) = backup.unzip();
    if let Some(permissions) = permissions {
        if let Err(e) = fs::set_permissions(&temp, permissions) {
            let _ = fs::remove_file(&temp);
            return Err(ConfigError::io(&temp, e));
        }
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(ConfigError::io(path, e));
    }

    info!(
        path = %path.display(),
        backup = ?backup,
        bytes = new_text.len(),
        "Saved config"
    );

    Ok(SaveReport {
        path: path.to_path_buf(),
        backup,
        bytes_written: new_text.len(),
    })
}

/// Write `grid` into the mesh block of the config at `path`.
///
/// The file is re-read and re-parsed so the splice uses its current layout,
/// then the grid is serialized, spliced in and saved with a backup.
///
/// # Errors
///
/// Returns [`ConfigError::ShapeChanged`] if the mesh in the file no longer
/// has the grid's shape, any parse error if the file no longer holds a mesh,
/// and the errors of [`save_with_backup`].
pub fn write_grid(
    path: &Path,
    options: &ParseOptions,
    grid: &MeshGrid,
) -> ConfigResult<SaveReport> {
    let text = read_config(path)?;
    let current = parse_with(&text, options)?;
    if current.grid.shape() != grid.shape() {
        return Err(ConfigError::ShapeChanged {
            rows: grid.rows(),
            cols: grid.cols(),
            found_rows: current.grid.rows(),
            found_cols: current.grid.cols(),
        });
    }

    let updated = apply(&text, &current, &serialize(grid))?;
    save_with_backup(path, &updated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bed_types::CellCoord;

    const ZEROS: &str = "\
[printer]
max_velocity = 300

#*# <---------------------- SAVE_CONFIG ---------------------->
#*# [bed_mesh default]
#*# version = 1
#*# points =
#*# \t  0.000000, 0.000000
#*# \t  0.000000, 0.000000
#*# x_count = 2
#*# y_count = 2
";

    #[test]
    fn backup_path_appends_suffix() {
        assert_eq!(
            backup_path(Path::new("printer.cfg")),
            PathBuf::from("printer.cfg.backup")
        );
    }

    #[test]
    fn save_scenario_writes_backup_then_new_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer.cfg");
        fs::write(&path, ZEROS).unwrap();

        let mut mesh = load(&path, &ParseOptions::default()).unwrap();
        mesh.grid.set(CellCoord::new(0, 0), 0.05).unwrap();
        let report = write_grid(&path, &ParseOptions::default(), &mesh.grid).unwrap();

        let backup = report.backup.unwrap();
        assert_eq!(fs::read_to_string(&backup).unwrap(), ZEROS);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("#*# \t  0.050000, 0.000000\n#*# \t  0.000000, 0.000000\n"));
        assert!(written.starts_with("[printer]\nmax_velocity = 300\n"));
        assert!(written.ends_with("#*# x_count = 2\n#*# y_count = 2\n"));
        assert_eq!(report.bytes_written, written.len());
    }

    #[test]
    fn save_to_new_file_has_no_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.cfg");
        let report = save_with_backup(&path, "hello\n").unwrap();
        assert_eq!(report.backup, None);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn failed_backup_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer.cfg");
        fs::write(&path, ZEROS).unwrap();
        // A directory where the backup file should go makes the backup fail.
        fs::create_dir(backup_path(&path)).unwrap();

        let err = save_with_backup(&path, "new content").unwrap_err();
        assert!(matches!(err, ConfigError::Backup { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), ZEROS);
    }

    #[cfg(unix)]
    #[test]
    fn save_keeps_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer.cfg");
        fs::write(&path, ZEROS).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        save_with_backup(&path, "new content").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn write_grid_rejects_shape_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("printer.cfg");
        fs::write(&path, ZEROS).unwrap();

        let grid = MeshGrid::filled(3, 2, 0.0).unwrap();
        let err = write_grid(&path, &ParseOptions::default(), &grid).unwrap_err();
        assert!(matches!(err, ConfigError::ShapeChanged { .. }));
        assert!(!backup_path(&path).exists());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load(Path::new("/nonexistent/printer.cfg"), &ParseOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(!err.is_parse_error());
    }
}
