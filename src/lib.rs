//! # tex2beamer
//!
//! Turn a LaTeX paper archive into a Beamer slide deck using LLM-powered
//! section distillation.
//!
//! ## Why this crate?
//!
//! Making slides from a paper is mechanical work: each section boils down
//! to one frame of bullets, the math is copied verbatim, and a figure or
//! two gets dropped in. This crate automates exactly that: point it at an
//! arXiv-style `.tar.gz` bundle (local file or URL) and it extracts the
//! sources, finds the root document, splits it into sections, asks a
//! language model to condense each section into one frame, and assembles
//! and compiles the resulting `presentation.tex`.
//!
//! ## Pipeline
//!
//! ```text
//! archive (.tar.gz / URL)
//!    │ extract
//!    ▼
//! workspace scan ──▶ root .tex + image assets
//!    │ segment
//!    ▼
//! sections ──▶ one LLM call each (retry + fallback) ──▶ cleaned frames
//!    │ assemble
//!    ▼
//! presentation.tex ──▶ pdflatex ──▶ presentation.pdf
//! ```
//!
//! A failed section never aborts the run: it becomes a placeholder frame
//! and is reported in the output. Only unusable input, a broken archive,
//! a missing root document, or a missing provider are fatal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tex2beamer::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .model("gpt-4o-mini")
//!         .max_sections(8)
//!         .build()?;
//!
//!     let output = convert("paper.tar.gz", &config).await?;
//!     println!("deck written to {}", output.tex_path.display());
//!     for section in &output.sections {
//!         println!("  [{}] {} ({} chars)", section.index, section.title, section.latex.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Synchronous callers can use [`convert_sync`] instead.
//!
//! ## Providers
//!
//! Generation goes through the [`TextGenerator`] trait. By default a
//! provider is resolved from configuration and environment (`OPENAI_API_KEY`
//! and friends, or the `EDGEQUAKE_LLM_PROVIDER`/`EDGEQUAKE_MODEL` pair);
//! tests and embedders can inject their own implementation via
//! [`ConversionConfig::builder`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | yes     | The `tex2beamer` binary (clap, indicatif, tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync};
pub use error::{SectionError, Tex2BeamerError};
pub use generate::{
    GenerateError, Generation, GenerationRequest, LlmGenerator, TextGenerator, DEFAULT_MODEL,
};
pub use output::{CompileReport, ConversionOutput, ConversionStats, SectionResult};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
