//! Interactive prompts for settings missing from the file and flags.

use crate::config::{normalize_url_prefix, resolve_path, DEFAULT_URL_PREFIX};
use crate::orchestrator::MigrateError;
use camino::{Utf8Path, Utf8PathBuf};
use jinjax_catalog::CatalogFolder;
use std::io::{self, BufRead, Stderr, StdinLock, Write};

/// Asks questions on one stream and reads answers from another.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stderr> {
    /// Reads stdin and writes to stderr, keeping stdout for the report.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, text: &str) -> Result<(), MigrateError> {
        writeln!(self.output, "{text}").map_err(MigrateError::Terminal)
    }

    /// Asks a question and returns the trimmed answer.
    pub fn ask(&mut self, question: &str) -> Result<String, MigrateError> {
        write!(self.output, "{question}").map_err(MigrateError::Terminal)?;
        self.output.flush().map_err(MigrateError::Terminal)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(MigrateError::Terminal)?;
        if read == 0 {
            return Err(MigrateError::PromptAborted);
        }
        Ok(line.trim().to_string())
    }

    /// Asks for catalog folders until an empty answer, requiring at least one.
    pub fn catalog_folders(&mut self, working_dir: &Utf8Path) -> Result<Vec<CatalogFolder>, MigrateError> {
        self.say("\nStep 1: Configure catalog folders")?;
        self.say("  Enter component folder paths. Press Enter when finished.\n")?;

        let mut folders = Vec::new();
        loop {
            let answer = self.ask("  Component folder path: ")?;
            if answer.is_empty() {
                if folders.is_empty() {
                    self.say("  You must add at least one folder.")?;
                    continue;
                }
                break;
            }

            let candidate = resolve_path(working_dir, &answer);
            let path = match candidate.canonicalize_utf8() {
                Ok(path) if path.is_dir() => path,
                _ => {
                    self.say(&format!("  Error: '{candidate}' is not a valid directory."))?;
                    continue;
                }
            };

            let prefix = self.ask("  Prefix for this folder (empty for none): ")?;
            if prefix.is_empty() {
                self.say(&format!("  Added: {path}\n"))?;
            } else {
                self.say(&format!("  Added: {path} (prefix: {prefix})\n"))?;
            }
            folders.push(CatalogFolder::new(path, prefix));
        }

        Ok(folders)
    }

    /// Asks for the static folder; it may not exist yet but must not be a file.
    pub fn static_folder(&mut self, working_dir: &Utf8Path) -> Result<Utf8PathBuf, MigrateError> {
        self.say("\nStep 2: Configure static folder")?;
        loop {
            let answer = self.ask("  Static folder path: ")?;
            if answer.is_empty() {
                self.say("  A static folder is required.")?;
                continue;
            }
            let path = resolve_path(working_dir, &answer);
            if path.exists() && !path.is_dir() {
                self.say(&format!("  Error: '{path}' exists but is not a directory."))?;
                continue;
            }
            return Ok(path);
        }
    }

    /// Asks for the asset URL prefix, defaulting to `/static/`.
    pub fn url_prefix(&mut self) -> Result<String, MigrateError> {
        self.say("\nStep 3: Configure asset URL prefix")?;
        let answer = self.ask(&format!("  URL prefix [{DEFAULT_URL_PREFIX}]: "))?;
        Ok(normalize_url_prefix(&answer))
    }

    /// Asks a yes/no question. Only `y` counts as yes; closed input is no.
    pub fn confirm(&mut self, question: &str) -> Result<bool, MigrateError> {
        match self.ask(question) {
            Ok(answer) => Ok(answer.eq_ignore_ascii_case("y")),
            Err(MigrateError::PromptAborted) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io::Cursor;

    fn prompter(input: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn transcript(prompter: &Prompter<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(prompter.output.clone()).unwrap()
    }

    fn utf8_tempdir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().canonicalize().unwrap()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_catalog_folders() {
        let (_dir, root) = utf8_tempdir();
        fs::create_dir_all(root.join("components")).unwrap();
        fs::create_dir_all(root.join("vendor")).unwrap();

        let mut p = prompter("\ncomponents\n\nmissing\nvendor\nui\n\n");
        let folders = p.catalog_folders(&root).unwrap();
        assert_eq!(
            folders,
            vec![
                CatalogFolder::new(root.join("components"), ""),
                CatalogFolder::new(root.join("vendor"), "ui"),
            ]
        );

        let out = transcript(&p);
        assert!(out.contains("You must add at least one folder."));
        assert!(out.contains("is not a valid directory."));
        assert!(out.contains("(prefix: ui)"));
    }

    #[test]
    fn test_static_folder_rejects_file() {
        let (_dir, root) = utf8_tempdir();
        fs::write(root.join("file.txt"), "x").unwrap();

        let mut p = prompter("file.txt\n\nstatic\n");
        assert_eq!(p.static_folder(&root).unwrap(), root.join("static"));
        assert!(transcript(&p).contains("exists but is not a directory."));
    }

    #[test]
    fn test_url_prefix() {
        assert_eq!(prompter("\n").url_prefix().unwrap(), "/static/");
        assert_eq!(prompter("/assets\n").url_prefix().unwrap(), "/assets/");
    }

    #[test]
    fn test_confirm() {
        assert!(prompter("y\n").confirm("Apply? ").unwrap());
        assert!(prompter("Y\n").confirm("Apply? ").unwrap());
        assert!(!prompter("yes\n").confirm("Apply? ").unwrap());
        assert!(!prompter("").confirm("Apply? ").unwrap());
    }

    #[test]
    fn test_closed_input_aborts() {
        let (_dir, root) = utf8_tempdir();
        let err = prompter("").catalog_folders(&root).unwrap_err();
        assert!(matches!(err, MigrateError::PromptAborted));
    }
}
