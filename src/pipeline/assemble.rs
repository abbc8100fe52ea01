//! Deck assembly: preamble, frames, closing marker, written to disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Tex2BeamerError;

/// File name of the assembled deck inside the workspace.
pub const DECK_FILENAME: &str = "presentation.tex";

/// Build the full deck source from ordered frames.
///
/// The deck is valid Beamer input even with zero frames: the title page
/// still renders, so a paper with no recognisable sections compiles to a
/// one-page deck rather than an error.
pub fn assemble_deck(frames: &[String], title: &str, theme: &str) -> String {
    let mut deck = String::new();
    deck.push_str("\\documentclass{beamer}\n");
    deck.push_str(&format!("\\usetheme{{{theme}}}\n"));
    deck.push_str("\\usepackage{graphicx}\n");
    deck.push_str(&format!("\\title{{{title}}}\n"));
    deck.push_str("\\begin{document}\n");
    deck.push_str("\\maketitle\n");
    for frame in frames {
        deck.push_str(frame);
        deck.push('\n');
    }
    deck.push_str("\\end{document}\n");
    deck
}

/// Write the deck into the workspace and return its path.
pub async fn write_deck(workspace: &Path, deck: &str) -> Result<PathBuf, Tex2BeamerError> {
    let path = workspace.join(DECK_FILENAME);
    tokio::fs::write(&path, deck)
        .await
        .map_err(|source| Tex2BeamerError::OutputWriteFailed {
            path: path.clone(),
            source,
        })?;
    debug!("Wrote {} byte deck to {}", deck.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_has_preamble_and_frames_in_order() {
        let frames = vec![
            "\\begin{frame}{A}\\end{frame}".to_string(),
            "\\begin{frame}{B}\\end{frame}".to_string(),
        ];
        let deck = assemble_deck(&frames, "My Paper", "metropolis");

        assert!(deck.starts_with("\\documentclass{beamer}\n"));
        assert!(deck.contains("\\usetheme{metropolis}"));
        assert!(deck.contains("\\title{My Paper}"));
        assert!(deck.contains("\\maketitle"));
        assert!(deck.ends_with("\\end{document}\n"));

        let a = deck.find("{A}").unwrap();
        let b = deck.find("{B}").unwrap();
        assert!(a < b);
    }

    #[test]
    fn empty_deck_is_still_valid_beamer() {
        let deck = assemble_deck(&[], "Empty", "metropolis");
        assert!(deck.contains("\\begin{document}"));
        assert!(deck.contains("\\maketitle"));
        assert!(deck.ends_with("\\end{document}\n"));
    }

    #[tokio::test]
    async fn writes_deck_into_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_deck(dir.path(), "content").await.unwrap();
        assert_eq!(path, dir.path().join(DECK_FILENAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "content");
    }

    #[tokio::test]
    async fn write_failure_is_reported_with_path() {
        let err = write_deck(Path::new("/nonexistent/dir"), "content")
            .await
            .unwrap_err();
        assert!(matches!(err, Tex2BeamerError::OutputWriteFailed { .. }));
    }
}
