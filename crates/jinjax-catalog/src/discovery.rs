//! Template file discovery.

use crate::CatalogError;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// File extension of component templates.
pub const TEMPLATE_EXTENSION: &str = "jinja";

/// Returns every `.jinja` file under `root`, sorted lexicographically.
///
/// Paths that are not valid UTF-8 are skipped.
pub fn discover_templates(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>, CatalogError> {
    if !root.is_dir() {
        return Err(CatalogError::NotADirectory(root.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| CatalogError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(path) = Utf8PathBuf::try_from(entry.into_path()) else {
            continue;
        };
        if path.extension() == Some(TEMPLATE_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
