//! Helpers for the content sources that feed the orchestrator.
//!
//! File loading, drag-and-drop and paste handling all end in a call to
//! [`PreviewOrchestrator::preview_now`](crate::PreviewOrchestrator::preview_now).
//! These functions hold the small decisions those sources make before that
//! call.

use std::path::{Path, PathBuf};

/// Extensions offered by the file picker.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "txt"];

/// Read a markdown file into a string.
pub async fn load_markdown(path: &Path) -> std::io::Result<String> {
    let text = tokio::fs::read_to_string(path).await?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "Loaded markdown");
    Ok(text)
}

/// The dropped file to load, if exactly one file was dropped.
#[must_use]
pub fn single_dropped_file(paths: &[PathBuf]) -> Option<&Path> {
    match paths {
        [path] => Some(path.as_path()),
        _ => None,
    }
}

/// Whether `path` has one of the extensions the file picker offers.
#[must_use]
pub fn is_markdown_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Whether a paste should trigger an automatic preview.
///
/// A paste that leaves the buffer empty pasted nothing, so there is nothing
/// new to show. Explicit preview requests never go through this check.
#[must_use]
pub fn should_preview_after_paste(text_after_paste: &str) -> bool {
    !text_after_paste.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_dropped_file_accepts_one() {
        let paths = vec![PathBuf::from("README.md")];
        assert_eq!(single_dropped_file(&paths), Some(Path::new("README.md")));
    }

    #[test]
    fn single_dropped_file_rejects_none_or_many() {
        assert_eq!(single_dropped_file(&[]), None);
        let paths = vec![PathBuf::from("a.md"), PathBuf::from("b.md")];
        assert_eq!(single_dropped_file(&paths), None);
    }

    #[test]
    fn is_markdown_path_known_extensions() {
        assert!(is_markdown_path(Path::new("docs/guide.md")));
        assert!(is_markdown_path(Path::new("NOTES.TXT")));
        assert!(is_markdown_path(Path::new("x.markdown")));
        assert!(!is_markdown_path(Path::new("image.png")));
        assert!(!is_markdown_path(Path::new("Makefile")));
    }

    #[test]
    fn paste_of_nothing_skips_preview() {
        assert!(!should_preview_after_paste(""));
        assert!(should_preview_after_paste("# pasted"));
        assert!(should_preview_after_paste(" "));
    }

    #[tokio::test]
    async fn load_markdown_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Title\n").unwrap();

        assert_eq!(load_markdown(&path).await.unwrap(), "# Title\n");
    }

    #[tokio::test]
    async fn load_markdown_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_markdown(&dir.path().join("missing.md")).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
