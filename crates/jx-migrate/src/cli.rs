//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use jinjax_catalog::CatalogFolder;

/// Migrate JinjaX component templates to Jx syntax.
#[derive(Debug, Parser)]
#[command(name = "jx-migrate")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Catalog folder to migrate, as PATH or PATH=PREFIX (repeatable).
    /// Text after the last `=` is a prefix only when it has no path separator
    #[arg(long = "folder", value_name = "PATH[=PREFIX]", value_parser = parse_folder)]
    pub folders: Vec<CatalogFolder>,

    /// Folder that receives co-located component assets
    #[arg(long = "static-folder")]
    pub static_folder: Option<Utf8PathBuf>,

    /// URL under which the static folder is served
    #[arg(long = "url-prefix")]
    pub url_prefix: Option<String>,

    /// JSON configuration file (defaults to jx-migrate.json when present)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Preview changes without modifying files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Skip creating backups before modifying files
    #[arg(long = "no-backup")]
    pub no_backup: bool,

    /// Apply changes without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Directory where timestamped backups are created
    #[arg(long = "backup-dir")]
    pub backup_dir: Option<Utf8PathBuf>,

    /// Glob patterns of templates to skip, relative to their catalog folder
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable report (default)
    #[default]
    Human,
    /// JSON report
    Json,
}

/// Parses `PATH` or `PATH=PREFIX`.
///
/// A trailing `=...` holding `/` or `\` is part of the path, not a prefix.
pub fn parse_folder(value: &str) -> Result<CatalogFolder, String> {
    let (path, prefix) = match value.rsplit_once('=') {
        Some((path, prefix)) if !prefix.contains(['/', '\\']) => (path, prefix.trim()),
        _ => (value, ""),
    };
    let path = path.trim();
    if path.is_empty() {
        return Err(format!("missing folder path in '{value}'"));
    }
    Ok(CatalogFolder::new(shellexpand::tilde(path).into_owned(), prefix))
}
