//! Configuration loading.
//!
//! Settings come from three layers: `jx-migrate.json`, then command-line
//! flags, then interactive prompts for whatever is still missing.

use crate::cli::Args;
use crate::orchestrator::MigrateError;
use camino::{Utf8Path, Utf8PathBuf};
use jinjax_catalog::CatalogFolder;
use serde::Deserialize;
use std::fs;
use tracing::debug;

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "jx-migrate.json";

/// URL prefix used when none is given.
pub const DEFAULT_URL_PREFIX: &str = "/static/";

/// Backup directory used when none is given, relative to the working directory.
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Contents of a `jx-migrate.json` file.
///
/// Relative paths are resolved against the file's own directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrateConfig {
    /// Catalog folders to migrate.
    #[serde(default)]
    pub folders: Vec<FolderEntry>,

    /// Folder that receives co-located assets.
    pub static_folder: Option<Utf8PathBuf>,

    /// URL under which the static folder is served.
    pub url_prefix: Option<String>,

    /// Directory for timestamped backups.
    pub backup_dir: Option<Utf8PathBuf>,

    /// Glob patterns of templates to skip.
    #[serde(default)]
    pub ignore: Vec<String>,
}

/// A catalog folder entry in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderEntry {
    pub path: Utf8PathBuf,
    #[serde(default)]
    pub prefix: String,
}

impl MigrateConfig {
    /// Loads the configuration.
    ///
    /// Without an explicit path, `jx-migrate.json` in `working_dir` is read if
    /// it exists and an empty configuration is used otherwise. An explicit
    /// path must exist.
    pub fn load(explicit: Option<&Utf8Path>, working_dir: &Utf8Path) -> Result<Self, MigrateError> {
        let (path, required) = match explicit {
            Some(path) => (working_dir.join(path), true),
            None => (working_dir.join(DEFAULT_CONFIG_FILE), false),
        };

        if !path.is_file() {
            if required {
                return Err(MigrateError::Config {
                    path,
                    message: "file not found".to_string(),
                });
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(MigrateError::io("read", &path))?;
        let mut config = Self::parse(&content).map_err(|e| MigrateError::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        config.resolve_paths(path.parent().unwrap_or(working_dir));

        debug!(path = %path, folders = config.folders.len(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration JSON.
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    fn resolve_paths(&mut self, base: &Utf8Path) {
        for folder in &mut self.folders {
            folder.path = resolve_path(base, folder.path.as_str());
        }
        self.static_folder = self
            .static_folder
            .take()
            .map(|path| resolve_path(base, path.as_str()));
        self.backup_dir = self
            .backup_dir
            .take()
            .map(|path| resolve_path(base, path.as_str()));
    }
}

/// Expands `~` and makes `raw` absolute against `base`.
pub fn resolve_path(base: &Utf8Path, raw: &str) -> Utf8PathBuf {
    let expanded = Utf8PathBuf::from(shellexpand::tilde(raw).into_owned());
    if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    }
}

/// Applies the default and enforces a trailing `/`.
pub fn normalize_url_prefix(prefix: &str) -> String {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        DEFAULT_URL_PREFIX.to_string()
    } else if prefix.ends_with('/') {
        prefix.to_string()
    } else {
        format!("{prefix}/")
    }
}

/// Settings after merging the configuration file with command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub folders: Vec<CatalogFolder>,
    pub static_folder: Option<Utf8PathBuf>,
    pub url_prefix: Option<String>,
    pub backup_dir: Utf8PathBuf,
    pub ignore: Vec<String>,
}

impl Settings {
    /// Flags replace file values; ignore patterns from both apply.
    pub fn merge(config: MigrateConfig, args: &Args, working_dir: &Utf8Path) -> Self {
        let folders = if args.folders.is_empty() {
            config
                .folders
                .into_iter()
                .map(|entry| CatalogFolder::new(entry.path, entry.prefix))
                .collect()
        } else {
            args.folders
                .iter()
                .map(|folder| {
                    CatalogFolder::new(
                        resolve_path(working_dir, folder.path.as_str()),
                        folder.prefix.clone(),
                    )
                })
                .collect()
        };

        let static_folder = args
            .static_folder
            .as_ref()
            .map(|path| resolve_path(working_dir, path.as_str()))
            .or(config.static_folder);

        let url_prefix = args
            .url_prefix
            .clone()
            .or(config.url_prefix)
            .map(|prefix| normalize_url_prefix(&prefix));

        let backup_dir = args
            .backup_dir
            .as_ref()
            .map(|path| resolve_path(working_dir, path.as_str()))
            .or(config.backup_dir)
            .unwrap_or_else(|| working_dir.join(DEFAULT_BACKUP_DIR));

        let mut ignore = config.ignore;
        ignore.extend(args.ignore.iter().cloned());

        Self {
            folders,
            static_folder,
            url_prefix,
            backup_dir,
            ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_parse_config() {
        let config = MigrateConfig::parse(
            r#"{
                "folders": [
                    {"path": "templates/components"},
                    {"path": "vendor/ui", "prefix": "ui"}
                ],
                "static_folder": "static",
                "url_prefix": "/assets",
                "ignore": ["legacy/**"]
            }"#,
        )
        .unwrap();

        assert_eq!(config.folders.len(), 2);
        assert_eq!(config.folders[0].prefix, "");
        assert_eq!(config.folders[1].prefix, "ui");
        assert_eq!(config.static_folder.as_deref(), Some(Utf8Path::new("static")));
        assert_eq!(config.url_prefix.as_deref(), Some("/assets"));
        assert_eq!(config.backup_dir, None);
        assert_eq!(config.ignore, vec!["legacy/**".to_string()]);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(MigrateConfig::parse(r#"{"folder": "x"}"#).is_err());
    }

    #[test]
    fn test_missing_default_file_is_empty() {
        let (_dir, root) = utf8_tempdir();
        let config = MigrateConfig::load(None, &root).unwrap();
        assert_eq!(config, MigrateConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let (_dir, root) = utf8_tempdir();
        let err = MigrateConfig::load(Some(Utf8Path::new("nope.json")), &root).unwrap_err();
        assert!(matches!(err, MigrateError::Config { .. }));
    }

    #[test]
    fn test_invalid_json_is_error() {
        let (_dir, root) = utf8_tempdir();
        fs::write(root.join(DEFAULT_CONFIG_FILE), "{ not json").unwrap();
        let err = MigrateConfig::load(None, &root).unwrap_err();
        assert!(err.to_string().contains("jx-migrate.json"));
    }

    #[test]
    fn test_paths_relative_to_config_file() {
        let (_dir, root) = utf8_tempdir();
        fs::create_dir_all(root.join("conf")).unwrap();
        fs::write(
            root.join("conf/migrate.json"),
            r#"{"folders": [{"path": "../components"}], "static_folder": "/srv/static"}"#,
        )
        .unwrap();

        let config = MigrateConfig::load(Some(Utf8Path::new("conf/migrate.json")), &root).unwrap();
        assert_eq!(config.folders[0].path, root.join("conf").join("../components"));
        assert_eq!(config.static_folder, Some(Utf8PathBuf::from("/srv/static")));
    }

    #[test]
    fn test_normalize_url_prefix() {
        assert_eq!(normalize_url_prefix(""), "/static/");
        assert_eq!(normalize_url_prefix("  "), "/static/");
        assert_eq!(normalize_url_prefix("/assets"), "/assets/");
        assert_eq!(normalize_url_prefix("/assets/"), "/assets/");
        assert_eq!(
            normalize_url_prefix("https://cdn.example.com/s"),
            "https://cdn.example.com/s/"
        );
    }

    #[test]
    fn test_flags_override_file() {
        let config = MigrateConfig {
            folders: vec![FolderEntry {
                path: Utf8PathBuf::from("/from/config"),
                prefix: String::new(),
            }],
            static_folder: Some(Utf8PathBuf::from("/config/static")),
            url_prefix: Some("/config/".to_string()),
            backup_dir: None,
            ignore: vec!["a/**".to_string()],
        };
        let args = Args::parse_from([
            "jx-migrate",
            "--folder",
            "components=ui",
            "--url-prefix",
            "/flag",
            "--ignore",
            "b/**",
        ]);

        let settings = Settings::merge(config, &args, Utf8Path::new("/work"));
        assert_eq!(settings.folders, vec![CatalogFolder::new("/work/components", "ui")]);
        assert_eq!(settings.static_folder, Some(Utf8PathBuf::from("/config/static")));
        assert_eq!(settings.url_prefix.as_deref(), Some("/flag/"));
        assert_eq!(settings.backup_dir, Utf8PathBuf::from("/work/backups"));
        assert_eq!(settings.ignore, vec!["a/**".to_string(), "b/**".to_string()]);
    }

    #[test]
    fn test_missing_values_stay_unset() {
        let args = Args::parse_from(["jx-migrate"]);
        let settings = Settings::merge(MigrateConfig::default(), &args, Utf8Path::new("/work"));
        assert!(settings.folders.is_empty());
        assert!(settings.static_folder.is_none());
        assert!(settings.url_prefix.is_none());
    }
}
