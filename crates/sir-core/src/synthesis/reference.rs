//! Line database (`LINEAS`) and auxiliary table (`THEVENIN`) the engine reads
//! from its working directory.

use crate::common::constants::{DATA_DIR_ENV, LINE_DATABASE_FILE_NAME, THEVENIN_FILE_NAME};
use crate::domain::{SirError, SirResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const REFERENCE_FILES: [&str; 2] = [LINE_DATABASE_FILE_NAME, THEVENIN_FILE_NAME];

/// `SIR_DATA_DIR` when set, otherwise the `data/` directory of this crate.
///
/// The crate does not ship the reference files, so the fallback only helps
/// when they were placed there by hand.
pub fn default_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
}

/// Copies each missing reference file from `data_dir` into `working_dir`.
///
/// Existing files are left untouched. Returns the paths that were copied.
pub fn ensure_reference_files(working_dir: &Path, data_dir: &Path) -> SirResult<Vec<PathBuf>> {
    let mut copied = Vec::new();

    for name in REFERENCE_FILES {
        let target = working_dir.join(name);
        if target.exists() {
            continue;
        }

        if !data_dir.is_dir() {
            return Err(SirError::io_system(
                "IO.DATA_DIR",
                format!(
                    "'{}' is missing from '{}' and the data directory '{}' does not exist; \
                     point {} at a directory holding {} and {}",
                    name,
                    working_dir.display(),
                    data_dir.display(),
                    DATA_DIR_ENV,
                    LINE_DATABASE_FILE_NAME,
                    THEVENIN_FILE_NAME
                ),
            ));
        }

        let source = data_dir.join(name);
        fs::copy(&source, &target).map_err(|error| {
            SirError::io_system(
                "IO.REFERENCE_FILE",
                format!(
                    "failed to copy '{}' to '{}': {}",
                    source.display(),
                    target.display(),
                    error
                ),
            )
        })?;
        warn!(
            file = name,
            source = %source.display(),
            "reference file missing in working directory, copied from data directory"
        );
        copied.push(target);
    }

    Ok(copied)
}

/// Entries of a line database file; the terminating last line is not an entry.
pub fn read_line_listing(path: &Path) -> SirResult<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|error| {
        SirError::io_system(
            "IO.LINE_DATABASE",
            format!("failed to read line database '{}': {}", path.display(), error),
        )
    })?;

    let mut entries: Vec<String> = content.lines().map(str::to_string).collect();
    entries.pop();
    Ok(entries)
}

pub fn write_line_listing<W: Write>(out: &mut W, entries: &[String]) -> std::io::Result<()> {
    writeln!(out, "Available lines:")?;
    for entry in entries {
        writeln!(out, "{entry}")?;
    }
    Ok(())
}
