//! Backups, write-back and asset copying.

use crate::orchestrator::MigrateError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use chrono::Local;
use jx_transformer::FileChange;
use std::fs;
use tracing::debug;

/// Copies every existing file into a new `backup-YYYYmmdd-HHMMSS` directory
/// under `backup_dir`, mirroring its absolute path.
///
/// Missing files are skipped. Returns the created directory.
pub fn create_backup(
    files: &[Utf8PathBuf],
    asset_sources: &[Utf8PathBuf],
    backup_dir: &Utf8Path,
) -> Result<Utf8PathBuf, MigrateError> {
    let timestamp = Local::now().format("%Y%m%d-%H%M%S");
    let backup_path = backup_dir.join(format!("backup-{timestamp}"));
    fs::create_dir_all(&backup_path).map_err(MigrateError::io("create", &backup_path))?;

    for file in files.iter().chain(asset_sources) {
        if !file.is_file() {
            debug!(path = %file, "skipping missing file in backup");
            continue;
        }
        let absolute = file
            .canonicalize_utf8()
            .map_err(MigrateError::io("resolve", file))?;
        let dest = backup_path.join(without_root(&absolute));
        copy_file(file, &dest)?;
    }

    Ok(backup_path)
}

/// The path with its root and prefix components dropped.
fn without_root(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|c| matches!(c, Utf8Component::Normal(_)))
        .collect()
}

fn copy_file(src: &Utf8Path, dest: &Utf8Path) -> Result<(), MigrateError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(MigrateError::io("create", parent))?;
    }
    fs::copy(src, dest).map_err(MigrateError::io("copy", src))?;
    Ok(())
}

/// Copies planned assets into place. Returns how many were copied.
///
/// A dry run copies nothing. Missing sources are skipped.
pub fn execute_asset_copies(
    copies: &[(Utf8PathBuf, Utf8PathBuf)],
    dry_run: bool,
) -> Result<usize, MigrateError> {
    if dry_run {
        return Ok(0);
    }

    let mut copied = 0;
    for (src, dest) in copies {
        if !src.is_file() {
            debug!(path = %src, "skipping missing asset");
            continue;
        }
        copy_file(src, dest)?;
        copied += 1;
    }
    Ok(copied)
}

/// Writes every changed template back to disk. Returns how many were written.
pub fn write_changes<'a>(
    changes: impl IntoIterator<Item = &'a FileChange>,
) -> Result<usize, MigrateError> {
    let mut written = 0;
    for change in changes.into_iter().filter(|c| c.changed()) {
        fs::write(&change.file_path, &change.transformed)
            .map_err(MigrateError::io("write", &change.file_path))?;
        written += 1;
    }
    Ok(written)
}
