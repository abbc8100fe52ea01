//! Pipeline stages for archive-to-deck conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. change how sections are segmented) without
//! touching other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ archive ──▶ workspace ──▶ segment ──▶ distill ──▶ postprocess ──▶ assemble ──▶ compile
//! (URL/path) (untar)    (scan)        (split)     (LLM)       (cleanup)       (deck.tex)   (pdflatex)
//! ```
//!
//! 1. [`input`]     — canonicalise the user-supplied path or URL to a local archive
//! 2. [`archive`]   — unpack the tar bundle into the workspace; idempotent,
//!    format auto-detected from magic bytes
//! 3. [`workspace`] — deterministic walk: collect image assets, locate the
//!    root document
//! 4. [`segment`]   — strip comments and split the root document into
//!    ordered (title, body) sections
//! 5. [`distill`]   — drive the generation call with retry/backoff and the
//!    fallback bulkhead; the only stage with network I/O
//! 6. [`postprocess`] — deterministic cleanup of generated frames
//!    (code fences, line endings, unbalanced frames)
//! 7. [`assemble`]  — preamble + frames + closing marker, written to
//!    `presentation.tex`
//! 8. [`compile`]   — run the external LaTeX compiler in the workspace
//!    without touching the ambient working directory

pub mod archive;
pub mod assemble;
pub mod compile;
pub mod distill;
pub mod input;
pub mod postprocess;
pub mod segment;
pub mod workspace;
