//! Output types: per-section results, run statistics, and the final deck.
//!
//! Everything here is serde-serialisable so the CLI can emit the whole run
//! as structured JSON (`--json`) and callers can persist or diff runs.

use crate::error::SectionError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The outcome of distilling one section into one slide.
///
/// Invariant: `latex` is always a complete `\begin{frame}…\end{frame}` block.
/// When `error` is `Some`, the block is the fixed fallback frame carrying the
/// section title and a failure notice — the deck stays structurally valid
/// either way, and every input section yields exactly one `SectionResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResult {
    /// 1-indexed position of the section in the source document.
    pub index: usize,
    /// Sanitized display title (markup commands stripped).
    pub title: String,
    /// The frame block as it will appear in the deck.
    pub latex: String,
    /// Prompt tokens consumed by the generation call (0 for fallback).
    pub input_tokens: u32,
    /// Completion tokens produced by the generation call (0 for fallback).
    pub output_tokens: u32,
    /// Wall-clock time spent on this section, including retries.
    pub duration_ms: u64,
    /// Number of retries that were needed (0 = first attempt succeeded).
    pub retries: u8,
    /// The failure that forced the fallback frame, if any.
    pub error: Option<SectionError>,
}

impl SectionResult {
    /// True when this slide is the fallback placeholder, not generated content.
    pub fn is_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate statistics for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Sections discovered in the root document.
    pub sections_found: usize,
    /// Sections actually distilled (capped at `max_sections`).
    pub sections_processed: usize,
    /// Sections that fell back to the placeholder frame.
    pub fallback_sections: usize,
    /// Total prompt tokens across all generation calls.
    pub total_input_tokens: u64,
    /// Total completion tokens across all generation calls.
    pub total_output_tokens: u64,
    /// End-to-end wall-clock time, extraction through compilation.
    pub total_duration_ms: u64,
    /// Time spent in the distillation stage only.
    pub distill_duration_ms: u64,
}

/// Result of invoking the external LaTeX compiler.
///
/// A non-success report is informational, not an error: the deck source at
/// [`ConversionOutput::tex_path`] is retained for manual retry either way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileReport {
    /// True when the compiler exited cleanly.
    pub success: bool,
    /// Expected location of the typeset PDF (present only on success).
    pub pdf_path: Option<PathBuf>,
    /// The compiler's own diagnostic log, for the operator to inspect.
    pub log_path: PathBuf,
    /// Human-readable failure description (exit status, missing tool, timeout).
    pub detail: Option<String>,
}

/// Full result of a conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The assembled deck source, exactly as written to `tex_path`.
    pub deck: String,
    /// Where the deck was written (`<workspace>/presentation.tex`).
    pub tex_path: PathBuf,
    /// The extracted workspace directory; persists after the run.
    pub workspace: PathBuf,
    /// Per-section results, in document order.
    pub sections: Vec<SectionResult>,
    /// Aggregate statistics.
    pub stats: ConversionStats,
    /// Compiler outcome; `None` when compilation was disabled.
    pub compile: Option<CompileReport>,
}
