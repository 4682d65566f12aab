//! Catalog error types.

use camino::Utf8PathBuf;
use thiserror::Error;

/// An error raised while scanning a catalog folder.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The folder does not exist or is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(Utf8PathBuf),

    /// The folder path could not be made absolute.
    #[error("failed to resolve {path}: {source}")]
    Resolve {
        /// The folder as given.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Walking the folder tree failed.
    #[error("failed to scan {root}: {source}")]
    Walk {
        /// The folder being scanned.
        root: Utf8PathBuf,
        /// The underlying walk error.
        #[source]
        source: walkdir::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CatalogError::NotADirectory(Utf8PathBuf::from("/missing/components"));
        assert_eq!(error.to_string(), "not a directory: /missing/components");
    }
}
