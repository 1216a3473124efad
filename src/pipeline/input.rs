//! Input resolution: validate the source document and build its browser URL.
//!
//! The browser navigates by URL, not by path, and relative paths break the
//! moment Chrome resolves them against its own working directory. Everything
//! is therefore canonicalised to an absolute path first, and existence is
//! checked here so a typo fails in milliseconds instead of after a browser
//! launch.

use crate::config::RenderMode;
use crate::error::PrepressError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Query string that switches a reveal.js deck into its print layout.
const PRINT_MODE_QUERY: &str = "print-pdf";

/// Resolve the input document to an absolute, readable path.
pub fn resolve_input(path: &Path) -> Result<PathBuf, PrepressError> {
    if !path.exists() {
        return Err(PrepressError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    // Canonicalising also surfaces permission problems on a parent directory.
    let absolute = path.canonicalize().map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => PrepressError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PrepressError::InputNotFound {
            path: path.to_path_buf(),
        },
    })?;

    match std::fs::File::open(&absolute) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PrepressError::PermissionDenied { path: absolute });
        }
        Err(_) => {
            return Err(PrepressError::InputNotFound { path: absolute });
        }
    }

    debug!("Resolved input: {}", absolute.display());
    Ok(absolute)
}

/// Build the `file://` URL the browser will load.
///
/// Slide decks get the print-mode query appended so the framework lays all
/// slides out vertically instead of showing one at a time.
pub fn file_url(absolute: &Path, mode: RenderMode) -> Result<String, PrepressError> {
    let mut url = url::Url::from_file_path(absolute).map_err(|_| {
        PrepressError::Internal(format!(
            "cannot express '{}' as a file URL",
            absolute.display()
        ))
    })?;

    if mode == RenderMode::SlideDeck {
        url.set_query(Some(PRINT_MODE_QUERY));
    }

    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn html_fixture(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("page.html");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "<!doctype html><title>x</title>").unwrap();
        path
    }

    #[test]
    fn missing_input_is_rejected_up_front() {
        let err = resolve_input(Path::new("/definitely/not/here.html")).unwrap_err();
        assert!(matches!(err, PrepressError::InputNotFound { .. }));
    }

    #[test]
    fn existing_input_resolves_to_an_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = html_fixture(&dir);
        let resolved = resolve_input(&path).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("page.html"));
    }

    #[test]
    fn document_url_has_no_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_input(&html_fixture(&dir)).unwrap();
        let url = file_url(&path, RenderMode::Document).unwrap();
        assert!(url.starts_with("file://"));
        assert!(!url.contains('?'));
    }

    #[test]
    fn slide_deck_url_carries_the_print_mode_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = resolve_input(&html_fixture(&dir)).unwrap();
        let url = file_url(&path, RenderMode::SlideDeck).unwrap();
        assert!(url.ends_with("?print-pdf"), "got: {url}");
    }
}
