//! Main orchestration logic.

use crate::backup::{create_backup, execute_asset_copies, write_changes};
use crate::cli::Args;
use crate::config::{MigrateConfig, Settings};
use crate::output::{Formatter, MigrationSummary};
use crate::prompt::Prompter;
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use jinjax_catalog::{discover_templates, CatalogError, CatalogFolder, ComponentRegistry};
use jx_transformer::{plan_asset_copies, transform, MigrationResult, TransformOptions};
use std::fs;
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info};

/// Migration errors.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// A catalog folder could not be scanned.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// A file operation failed.
    #[error("failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid glob pattern.
    #[error("invalid glob pattern: {0}")]
    InvalidGlob(String),

    /// Unreadable or invalid configuration file.
    #[error("invalid configuration {path}: {message}")]
    Config { path: Utf8PathBuf, message: String },

    /// Input ended while a prompt was waiting for an answer.
    #[error("input closed before the configuration was complete")]
    PromptAborted,

    /// Reading answers or writing prompts failed.
    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),
}

impl MigrateError {
    /// Builds a `map_err` adapter for an I/O failure on `path`.
    pub fn io(action: &'static str, path: &Utf8Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_owned();
        move |source| Self::Io {
            action,
            path,
            source,
        }
    }
}

/// Runs a migration.
pub fn run(args: Args) -> Result<MigrationSummary, MigrateError> {
    let working_dir = std::env::current_dir()
        .map(|p| Utf8PathBuf::try_from(p).unwrap_or_default())
        .unwrap_or_default();

    let config = MigrateConfig::load(args.config.as_deref(), &working_dir)?;
    let settings = Settings::merge(config, &args, &working_dir);
    let mut prompter = Prompter::stdio();
    run_with(&args, settings, &working_dir, &mut prompter)
}

/// Runs a migration with settings already merged, asking `prompter` for
/// anything missing and for confirmation.
pub fn run_with<R: BufRead, W: Write>(
    args: &Args,
    settings: Settings,
    working_dir: &Utf8Path,
    prompter: &mut Prompter<R, W>,
) -> Result<MigrationSummary, MigrateError> {
    let formatter = Formatter::new(args.output);

    let folders = if settings.folders.is_empty() {
        prompter.catalog_folders(working_dir)?
    } else {
        settings.folders
    };
    let static_folder = match settings.static_folder {
        Some(path) => path,
        None => prompter.static_folder(working_dir)?,
    };
    let url_prefix = match settings.url_prefix {
        Some(prefix) => prefix,
        None => prompter.url_prefix()?,
    };
    let ignore_set = build_ignore_set(&settings.ignore)?;

    // Build the registry
    let mut registry = ComponentRegistry::new();
    let mut total = 0;
    for folder in &folders {
        let count = registry.add_folder(folder.clone())?;
        if formatter.is_human() {
            println!("{}", formatter.format_scan(folder, count));
        }
        total += count;
    }
    info!(total, folders = folders.len(), "component registry built");

    if total == 0 {
        if formatter.is_human() {
            println!("\nNo components found. Nothing to migrate.");
        } else {
            println!("{}", formatter.format_report(&MigrationResult::new()));
        }
        return Ok(MigrationSummary::default());
    }

    // Plan and transform
    let mut result = MigrationResult::new();
    result.asset_copies = plan_asset_copies(&registry, &static_folder);

    let options = TransformOptions { url_prefix };
    for path in collect_templates(&folders, &ignore_set)? {
        let source = fs::read_to_string(&path).map_err(MigrateError::io("read", &path))?;
        result.record(transform(&path, &source, &registry, &options));
    }

    println!("{}", formatter.format_report(&result));
    let summary = MigrationSummary::from_result(&result);

    if !summary.has_work() {
        return Ok(summary);
    }
    if args.dry_run {
        if formatter.is_human() {
            println!("  (dry-run mode -- no files modified)\n");
        }
        return Ok(summary);
    }

    let assume_yes = args.yes || read_env_bool("JX_MIGRATE_ASSUME_YES").unwrap_or(false);
    if !assume_yes && !prompter.confirm("Apply changes? (y/n): ")? {
        eprintln!("Aborted.");
        return Ok(summary);
    }

    if !args.no_backup {
        let files: Vec<Utf8PathBuf> = result
            .changed_files()
            .map(|change| change.file_path.clone())
            .collect();
        let asset_sources: Vec<Utf8PathBuf> =
            result.asset_copies.iter().map(|(src, _)| src.clone()).collect();
        let backup = create_backup(&files, &asset_sources, &settings.backup_dir)?;
        status(&formatter, &format!("\n  Backup created: {backup}"));
    }

    let written = write_changes(result.changed_files())?;
    status(&formatter, &format!("  Modified {written} template(s)"));

    let copied = execute_asset_copies(&result.asset_copies, false)?;
    status(&formatter, &format!("  Copied {copied} asset file(s)"));
    status(&formatter, "\nMigration complete!");

    Ok(summary)
}

fn status(formatter: &Formatter, line: &str) {
    if formatter.is_human() {
        println!("{line}");
    }
}

/// Builds the set of ignore patterns.
fn build_ignore_set(patterns: &[String]) -> Result<GlobSet, MigrateError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| MigrateError::InvalidGlob(e.to_string()))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| MigrateError::InvalidGlob(e.to_string()))
}

/// Lists the templates of every folder, skipping ignored ones.
///
/// Folder roots are resolved the same way the registry resolves them, so the
/// listed paths match registered component paths.
fn collect_templates(
    folders: &[CatalogFolder],
    ignore_set: &GlobSet,
) -> Result<Vec<Utf8PathBuf>, MigrateError> {
    let mut templates = Vec::new();
    for folder in folders {
        let root = folder
            .path
            .canonicalize_utf8()
            .map_err(MigrateError::io("resolve", &folder.path))?;
        for path in discover_templates(&root)? {
            let relative = path.strip_prefix(&root).unwrap_or(&path);
            if ignore_set.is_match(relative.as_str()) {
                debug!(path = %path, "ignored template");
                continue;
            }
            if !templates.contains(&path) {
                templates.push(path);
            }
        }
    }
    Ok(templates)
}

fn read_env_bool(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    struct Project {
        _dir: tempfile::TempDir,
        root: Utf8PathBuf,
    }

    fn project() -> Project {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::try_from(dir.path().canonicalize().unwrap()).unwrap();
        let components = root.join("components");
        fs::create_dir_all(components.join("legacy")).unwrap();
        fs::write(
            components.join("Card.jinja"),
            "{#def title #}\n<div>{{ content(\"footer\") }}</div>\n",
        )
        .unwrap();
        fs::write(components.join("Card.css"), ".card {}\n").unwrap();
        fs::write(
            components.join("Page.jinja"),
            "<Card title=\"x\">{% if _slot == \"footer\" %}F{% endif %}</Card>\n",
        )
        .unwrap();
        fs::write(components.join("legacy/Old.jinja"), "{{ content() }}\n").unwrap();
        Project { _dir: dir, root }
    }

    fn settings(root: &Utf8Path, ignore: &[&str]) -> Settings {
        Settings {
            folders: vec![CatalogFolder::new(root.join("components"), "")],
            static_folder: Some(root.join("static")),
            url_prefix: Some("/static/".to_string()),
            backup_dir: root.join("backups"),
            ignore: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn no_input() -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[test]
    fn test_read_env_bool_unset() {
        assert_eq!(read_env_bool("JX_MIGRATE_TEST_UNSET_VARIABLE"), None);
    }

    #[test]
    fn test_invalid_glob() {
        let err = build_ignore_set(&["a/[".to_string()]).unwrap_err();
        assert!(matches!(err, MigrateError::InvalidGlob(_)));
    }

    #[test]
    fn test_io_error_display() {
        let err = MigrateError::io("read", Utf8Path::new("/t/Card.jinja"))(io::Error::new(
            io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(err.to_string(), "failed to read /t/Card.jinja: gone");
    }

    #[test]
    fn test_collect_templates_honors_ignores() {
        let p = project();
        let ignore = build_ignore_set(&["legacy/**".to_string()]).unwrap();
        let templates =
            collect_templates(&[CatalogFolder::new(p.root.join("components"), "")], &ignore).unwrap();
        let names: Vec<&str> = templates.iter().map(|t| t.file_name().unwrap()).collect();
        assert_eq!(names, vec!["Card.jinja", "Page.jinja"]);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let p = project();
        let args = Args::parse_from(["jx-migrate", "--dry-run"]);
        let summary =
            run_with(&args, settings(&p.root, &[]), &p.root, &mut no_input()).unwrap();

        assert_eq!(summary.templates_modified, 3);
        assert_eq!(summary.slots_migrated, 1);
        assert_eq!(summary.fills_generated, 1);
        assert_eq!(summary.asset_files, 1);
        assert!(!p.root.join("static").exists());
        assert!(!p.root.join("backups").exists());
        assert!(fs::read_to_string(p.root.join("components/Card.jinja"))
            .unwrap()
            .contains("content(\"footer\")"));
    }

    #[test]
    fn test_apply_with_backup() {
        let p = project();
        let args = Args::parse_from(["jx-migrate", "--yes"]);
        run_with(&args, settings(&p.root, &["legacy/**"]), &p.root, &mut no_input()).unwrap();

        assert_eq!(
            fs::read_to_string(p.root.join("components/Card.jinja")).unwrap(),
            "{#css /static/Card.css #}\n{#def title #}\n<div>{% slot footer %}{% endslot %}</div>\n"
        );
        assert_eq!(
            fs::read_to_string(p.root.join("components/Page.jinja")).unwrap(),
            "{#import \"Card.jinja\" as Card #}\n<Card title=\"x\">{% fill footer %}F{% endfill %}</Card>\n"
        );
        assert_eq!(
            fs::read_to_string(p.root.join("components/legacy/Old.jinja")).unwrap(),
            "{{ content() }}\n"
        );
        assert_eq!(
            fs::read_to_string(p.root.join("static/Card.css")).unwrap(),
            ".card {}\n"
        );
        let backups: Vec<_> = fs::read_dir(p.root.join("backups")).unwrap().collect();
        assert_eq!(backups.len(), 1);
    }

    #[test]
    fn test_declined_confirmation_writes_nothing() {
        let p = project();
        let args = Args::parse_from(["jx-migrate", "--no-backup"]);
        let mut prompter = Prompter::new(Cursor::new(b"n\n".to_vec()), Vec::new());
        run_with(&args, settings(&p.root, &[]), &p.root, &mut prompter).unwrap();

        assert!(!p.root.join("static").exists());
        assert!(fs::read_to_string(p.root.join("components/Page.jinja"))
            .unwrap()
            .contains("_slot"));
    }

    #[test]
    fn test_missing_settings_are_prompted() {
        let p = project();
        let args = Args::parse_from(["jx-migrate", "--dry-run"]);
        let empty = Settings {
            folders: vec![],
            static_folder: None,
            url_prefix: None,
            backup_dir: p.root.join("backups"),
            ignore: vec![],
        };
        let mut prompter = Prompter::new(
            Cursor::new(b"components\n\n\nstatic\n/assets\n".to_vec()),
            Vec::new(),
        );
        let summary = run_with(&args, empty, &p.root, &mut prompter).unwrap();
        assert_eq!(summary.asset_files, 1);
    }

    #[test]
    fn test_missing_folder_is_error() {
        let p = project();
        let args = Args::parse_from(["jx-migrate", "--dry-run"]);
        let mut settings = settings(&p.root, &[]);
        settings.folders = vec![CatalogFolder::new(p.root.join("nope"), "")];
        let err = run_with(&args, settings, &p.root, &mut no_input()).unwrap_err();
        assert!(matches!(err, MigrateError::Catalog(CatalogError::NotADirectory(_))));
    }
}
