//! Error types for the tex2beamer library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Tex2BeamerError`] — **Fatal**: the conversion cannot proceed at all
//!   (archive unreadable, no root document, provider not configured).
//!   Returned as `Err(Tex2BeamerError)` from the top-level `convert*`
//!   functions before any deck is produced.
//!
//! * [`SectionError`] — **Non-fatal**: a single section's distillation failed
//!   (transient API error, timeout) but every other section is fine. Stored
//!   inside [`crate::output::SectionResult`] next to the fallback frame that
//!   took the generated slide's place, so callers can inspect partial success
//!   rather than losing the whole deck to one bad section.
//!
//! Compilation failure is deliberately *not* an error type: by the time the
//! compiler runs, the deck source is already written and useful on its own.
//! It is reported as a non-success [`crate::output::CompileReport`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the tex2beamer library.
///
/// Section-level failures use [`SectionError`] and are stored in
/// [`crate::output::SectionResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Tex2BeamerError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Archive file was not found at the given path.
    #[error("Archive not found: '{path}'\nCheck the path exists and is readable.")]
    ArchiveNotFound { path: PathBuf },

    /// Process does not have read permission on the archive.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is neither a gzip stream nor a tar.
    #[error("File is not a tar archive: '{path}'\nFirst bytes: {magic:?}")]
    NotAnArchive { path: PathBuf, magic: [u8; 4] },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The archive could not be unpacked (truncated gzip, bad tar header).
    #[error("Failed to extract '{path}': {detail}")]
    ExtractionFailed { path: PathBuf, detail: String },

    /// No `.tex` file containing `\begin{document}` was found.
    #[error("No root document found under '{workspace}'\nThe archive must contain a .tex file with \\begin{{document}}.")]
    RootDocumentNotFound { workspace: PathBuf },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the assembled deck to the workspace.
    #[error("Failed to write deck file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single section.
///
/// Stored alongside the fallback frame in [`crate::output::SectionResult`]
/// when a section's distillation fails. The overall run always continues.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum SectionError {
    /// Generation call failed after all retries.
    #[error("Section {index}: generation failed after {retries} retries: {detail}")]
    GenerationFailed {
        index: usize,
        retries: u8,
        detail: String,
    },

    /// Generation call timed out.
    #[error("Section {index}: generation timed out after {secs}s")]
    Timeout { index: usize, secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_failed_display() {
        let e = Tex2BeamerError::ExtractionFailed {
            path: PathBuf::from("paper.tar.gz"),
            detail: "unexpected EOF".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("paper.tar.gz"), "got: {msg}");
        assert!(msg.contains("unexpected EOF"));
    }

    #[test]
    fn root_document_not_found_display() {
        let e = Tex2BeamerError::RootDocumentNotFound {
            workspace: PathBuf::from("/tmp/paper_extracted"),
        };
        assert!(e.to_string().contains("paper_extracted"));
        assert!(e.to_string().contains("\\begin{document}"));
    }

    #[test]
    fn section_error_display() {
        let e = SectionError::GenerationFailed {
            index: 3,
            retries: 3,
            detail: "HTTP 429".into(),
        };
        assert!(e.to_string().contains("Section 3"));
        assert!(e.to_string().contains("HTTP 429"));
    }

    #[test]
    fn section_timeout_display() {
        let e = SectionError::Timeout { index: 2, secs: 60 };
        assert!(e.to_string().contains("60s"));
    }
}
