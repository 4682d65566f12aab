//! Per-file migration pipeline.

use crate::assets::{add_auto_assets, migrate_asset_rendering, update_asset_paths};
use crate::imports::generate_imports_and_rename;
use crate::patterns::IMPORT;
use crate::slots::{migrate_slot_definitions, migrate_slot_usage};
use camino::{Utf8Path, Utf8PathBuf};
use jinjax_catalog::ComponentRegistry;

/// Options for transformation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    /// URL under which the static folder is served. Ends with `/`.
    pub url_prefix: String,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            url_prefix: "/static/".to_string(),
        }
    }
}

/// The proposed migration of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub file_path: Utf8PathBuf,
    pub original: String,
    pub transformed: String,
    pub warnings: Vec<String>,
}

impl FileChange {
    /// Whether the migration altered the text.
    pub fn changed(&self) -> bool {
        self.original != self.transformed
    }
}

/// Everything a migration run proposes.
#[derive(Debug, Clone, Default)]
pub struct MigrationResult {
    pub file_changes: Vec<FileChange>,
    /// Planned `(source, destination)` asset copies.
    pub asset_copies: Vec<(Utf8PathBuf, Utf8PathBuf)>,
    /// Warnings from every file, prefixed with the file name.
    pub warnings: Vec<String>,
}

impl MigrationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file's change, collecting its warnings.
    pub fn record(&mut self, change: FileChange) {
        let name = change
            .file_path
            .file_name()
            .unwrap_or(change.file_path.as_str());
        self.warnings
            .extend(change.warnings.iter().map(|w| format!("{name}: {w}")));
        self.file_changes.push(change);
    }

    /// Changes that actually alter a file.
    pub fn changed_files(&self) -> impl Iterator<Item = &FileChange> {
        self.file_changes.iter().filter(|c| c.changed())
    }
}

/// Counts `{#import ... #}` declarations in a template.
pub fn count_imports(source: &str) -> usize {
    IMPORT.find_iter(source).count()
}

/// Migrates one template from JinjaX to Jx.
///
/// `file_path` is used to find the template's own component entry, which
/// drives asset handling; templates outside the registry (pages, layouts)
/// still get every other rewrite. Nothing is written to disk.
pub fn transform(
    file_path: &Utf8Path,
    source: &str,
    registry: &ComponentRegistry,
    options: &TransformOptions,
) -> FileChange {
    let info = registry.find_by_path(file_path);
    let mut warnings = Vec::new();

    let text = migrate_slot_definitions(source);
    let (text, slot_warnings) = migrate_slot_usage(&text);
    warnings.extend(slot_warnings);
    let text = migrate_asset_rendering(&text);
    let text = add_auto_assets(&text, info, &options.url_prefix);
    let text = update_asset_paths(&text, info, &options.url_prefix);
    let (text, import_warnings) = generate_imports_and_rename(&text, registry);
    warnings.extend(import_warnings);

    FileChange {
        file_path: file_path.to_owned(),
        original: source.to_string(),
        transformed: text,
        warnings,
    }
}
