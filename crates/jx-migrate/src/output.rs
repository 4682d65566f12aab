//! Output formatting.

use crate::cli::OutputFormat;
use jinjax_catalog::CatalogFolder;
use jx_transformer::{count_imports, FileChange, MigrationResult};
use serde::Serialize;
use std::collections::HashSet;

const RULE: &str = "============================================================";

/// Lines a change adds and removes, compared as sets of lines.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LineDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl LineDiff {
    pub fn new(original: &str, transformed: &str) -> Self {
        let old_lines: Vec<&str> = original.split_inclusive('\n').collect();
        let new_lines: Vec<&str> = transformed.split_inclusive('\n').collect();
        let old_set: HashSet<&str> = old_lines.iter().copied().collect();
        let new_set: HashSet<&str> = new_lines.iter().copied().collect();

        Self {
            added: new_lines
                .iter()
                .filter(|line| !old_set.contains(*line))
                .map(|line| line.trim_end().to_string())
                .collect(),
            removed: old_lines
                .iter()
                .filter(|line| !new_set.contains(*line))
                .map(|line| line.trim_end().to_string())
                .collect(),
        }
    }
}

/// Counts describing what a migration changes.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationSummary {
    pub templates_modified: usize,
    pub imports_added: usize,
    pub slots_migrated: usize,
    pub fills_generated: usize,
    pub asset_calls_migrated: usize,
    pub asset_files: usize,
}

impl MigrationSummary {
    pub fn from_result(result: &MigrationResult) -> Self {
        let mut summary = Self {
            asset_files: result.asset_copies.len(),
            ..Self::default()
        };

        for change in result.changed_files() {
            let (old, new) = (change.original.as_str(), change.transformed.as_str());
            summary.templates_modified += 1;
            summary.imports_added += count_imports(new).saturating_sub(count_imports(old));
            summary.slots_migrated += growth(old, new, "{% slot ");
            summary.fills_generated += growth(old, new, "{% fill ");
            summary.asset_calls_migrated += growth(new, old, "catalog.render_assets()");
        }

        summary
    }

    /// Whether the run has anything to apply.
    pub fn has_work(&self) -> bool {
        self.templates_modified > 0 || self.asset_files > 0
    }

    /// Formats the summary block.
    pub fn format(&self) -> String {
        format!(
            "{RULE}\nSUMMARY\n{RULE}\n  Templates modified:        {}\n  Import statements added:   {}\n  Slot definitions migrated: {}\n  Fill blocks generated:     {}\n  Asset calls migrated:      {}\n  Asset files to copy:       {}\n",
            self.templates_modified,
            self.imports_added,
            self.slots_migrated,
            self.fills_generated,
            self.asset_calls_migrated,
            self.asset_files,
        )
    }
}

/// How many more times `needle` occurs in `to` than in `from`.
fn growth(from: &str, to: &str, needle: &str) -> usize {
    to.matches(needle).count().saturating_sub(from.matches(needle).count())
}

/// One template in the JSON report.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub warnings: Vec<String>,
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// One planned asset copy in the JSON report.
#[derive(Debug, Serialize)]
pub struct AssetCopyReport {
    pub source: String,
    pub destination: String,
}

/// The JSON report.
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub files: Vec<FileReport>,
    pub asset_copies: Vec<AssetCopyReport>,
    pub warnings: Vec<String>,
    pub summary: MigrationSummary,
}

/// Formats migration reports for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Whether progress and status lines should be printed.
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Formats the line reporting a scanned catalog folder.
    pub fn format_scan(&self, folder: &CatalogFolder, count: usize) -> String {
        let label = if folder.prefix.is_empty() {
            " (no prefix)".to_string()
        } else {
            format!(" (prefix: {})", folder.prefix)
        };
        let noun = if count == 1 { "component" } else { "components" };
        format!("  Found {count} {noun} in {}{label}", folder.path)
    }

    /// Formats the full report.
    pub fn format_report(&self, result: &MigrationResult) -> String {
        match self.format {
            OutputFormat::Human => self.format_human(result),
            OutputFormat::Json => self.format_json(result),
        }
    }

    /// Formats as human-readable output.
    fn format_human(&self, result: &MigrationResult) -> String {
        let changed: Vec<&FileChange> = result.changed_files().collect();
        if changed.is_empty() && result.asset_copies.is_empty() {
            return "\nNo changes needed.\n".to_string();
        }

        let mut output = format!("\n{RULE}\nMIGRATION REPORT\n{RULE}\n");

        if !changed.is_empty() {
            output.push_str(&format!("\nTemplates to modify: {}\n", changed.len()));
            for change in &changed {
                output.push_str(&format_file_diff(change));
            }
        }

        if !result.asset_copies.is_empty() {
            output.push_str(&format!("\nAssets to copy: {}\n", result.asset_copies.len()));
            for (src, dest) in &result.asset_copies {
                output.push_str(&format!("    {src} -> {dest}\n"));
            }
        }

        if !result.warnings.is_empty() {
            output.push_str(&format!("\nWarnings ({}):\n", result.warnings.len()));
            for warning in &result.warnings {
                output.push_str(&format!("    ! {warning}\n"));
            }
        }

        output.push('\n');
        output.push_str(&MigrationSummary::from_result(result).format());
        output
    }

    /// Formats as JSON output.
    fn format_json(&self, result: &MigrationResult) -> String {
        let report = JsonReport {
            files: result
                .changed_files()
                .map(|change| {
                    let diff = LineDiff::new(&change.original, &change.transformed);
                    FileReport {
                        path: change.file_path.to_string(),
                        warnings: change.warnings.clone(),
                        added: diff.added,
                        removed: diff.removed,
                    }
                })
                .collect(),
            asset_copies: result
                .asset_copies
                .iter()
                .map(|(src, dest)| AssetCopyReport {
                    source: src.to_string(),
                    destination: dest.to_string(),
                })
                .collect(),
            warnings: result.warnings.clone(),
            summary: MigrationSummary::from_result(result),
        };
        serde_json::to_string_pretty(&report).unwrap_or_default()
    }
}

fn format_file_diff(change: &FileChange) -> String {
    let diff = LineDiff::new(&change.original, &change.transformed);
    let mut output = format!("\n  --- {} ---\n", change.file_path);
    for line in &diff.added {
        output.push_str(&format!("    + {line}\n"));
    }
    for line in &diff.removed {
        output.push_str(&format!("    - {line}\n"));
    }
    for warning in &change.warnings {
        output.push_str(&format!("    ! WARNING: {warning}\n"));
    }
    output
}
