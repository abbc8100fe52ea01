//! High-level conversion entry points.
//!
//! [`convert`] drives the whole pipeline from user input to written deck;
//! [`convert_sync`] wraps it for callers without a Tokio runtime.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::StreamExt;
use tracing::info;

use crate::config::ConversionConfig;
use crate::error::Tex2BeamerError;
use crate::generate::{resolve_generator, TextGenerator};
use crate::output::{ConversionOutput, ConversionStats, SectionResult};
use crate::pipeline::segment::Section;
use crate::pipeline::{archive, assemble, compile, distill, input, segment, workspace};
use crate::progress::{NoopProgressCallback, ProgressCallback};

/// Convert a paper archive (local path or URL) into a Beamer deck.
///
/// Fatal errors — unreachable input, broken archive, no root document,
/// no usable provider — surface as `Err`. Per-section generation failures
/// do not: they become fallback frames recorded in the returned
/// [`ConversionOutput`]. A compile failure likewise lands in the output's
/// [`CompileReport`](crate::output::CompileReport) rather than in `Err`,
/// since the `.tex` deck already exists on disk at that point.
pub async fn convert(
    input_str: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2BeamerError> {
    let run_started = Instant::now();
    let cb: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));

    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;

    let archive_path = resolved.path().to_path_buf();
    let workspace_dir = run_blocking(move || archive::extract(&archive_path)).await??;

    let scan_dir = workspace_dir.clone();
    let index = run_blocking(move || workspace::index_workspace(&scan_dir)).await??;

    let root = index
        .root_document
        .ok_or_else(|| Tex2BeamerError::RootDocumentNotFound {
            workspace: workspace_dir.clone(),
        })?;

    let bytes = tokio::fs::read(&root)
        .await
        .map_err(|e| Tex2BeamerError::ExtractionFailed {
            path: root.clone(),
            detail: format!("failed to read root document: {e}"),
        })?;
    let source = segment::strip_comments(&String::from_utf8_lossy(&bytes));
    let sections = segment::split_sections(&source);

    let found = sections.len();
    let processing = found.min(config.max_sections);
    info!("Found {} sections, processing first {}", found, processing);
    cb.on_run_start(found, processing);

    let distill_started = Instant::now();
    let results = if processing > 0 {
        let generator = resolve_generator(config)?;
        let batch = &sections[..processing];
        if config.concurrency > 1 {
            process_concurrent(generator, batch, &index.assets, config, &cb).await
        } else {
            process_sequential(generator, batch, &index.assets, config, &cb).await
        }
    } else {
        Vec::new()
    };
    let distill_duration_ms = distill_started.elapsed().as_millis() as u64;

    let frames: Vec<String> = results.iter().map(|r| r.latex.clone()).collect();
    let deck = assemble::assemble_deck(&frames, &config.deck_title, &config.theme);
    let tex_path = assemble::write_deck(&workspace_dir, &deck).await?;

    let compile_report = if config.compile {
        cb.on_compile_start();
        Some(compile::compile_deck(&workspace_dir, config).await)
    } else {
        None
    };

    let fallbacks = results.iter().filter(|r| r.is_fallback()).count();
    let stats = ConversionStats {
        sections_found: found,
        sections_processed: processing,
        fallback_sections: fallbacks,
        total_input_tokens: results.iter().map(|r| u64::from(r.input_tokens)).sum(),
        total_output_tokens: results.iter().map(|r| u64::from(r.output_tokens)).sum(),
        total_duration_ms: run_started.elapsed().as_millis() as u64,
        distill_duration_ms,
    };

    cb.on_run_complete(processing, fallbacks, compile_report.as_ref().map(|r| r.success));

    Ok(ConversionOutput {
        deck,
        tex_path,
        workspace: workspace_dir,
        sections: results,
        stats,
        compile: compile_report,
    })
}

/// Blocking-friendly wrapper around [`convert`] for callers without an
/// async runtime of their own.
pub fn convert_sync(
    input_str: &str,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Tex2BeamerError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Tex2BeamerError::Internal(format!("failed to start runtime: {e}")))?;
    runtime.block_on(convert(input_str, config))
}

/// One section after another, pausing between calls so sequential runs
/// stay polite to rate-limited providers.
async fn process_sequential(
    generator: Arc<dyn TextGenerator>,
    sections: &[Section],
    assets: &[String],
    config: &ConversionConfig,
    cb: &ProgressCallback,
) -> Vec<SectionResult> {
    let total = sections.len();
    let mut results = Vec::with_capacity(total);

    for (i, section) in sections.iter().enumerate() {
        let index = i + 1;
        cb.on_section_start(index, total, &section.title);
        let result =
            distill::distill_section(generator.as_ref(), index, section, assets, config).await;
        report_section(cb, &result, total);
        results.push(result);

        if index < total && config.throttle_ms > 0 {
            tokio::time::sleep(Duration::from_millis(config.throttle_ms)).await;
        }
    }

    results
}

/// Up to `concurrency` sections in flight at once. `buffered` yields
/// results in input order, so frames never need re-sorting and throttling
/// between calls is unnecessary.
async fn process_concurrent(
    generator: Arc<dyn TextGenerator>,
    sections: &[Section],
    assets: &[String],
    config: &ConversionConfig,
    cb: &ProgressCallback,
) -> Vec<SectionResult> {
    let total = sections.len();

    let results: Vec<SectionResult> = futures::stream::iter(sections.iter().enumerate().map(
        |(i, section)| {
            let generator = Arc::clone(&generator);
            let cb = Arc::clone(cb);
            async move {
                let index = i + 1;
                cb.on_section_start(index, total, &section.title);
                distill::distill_section(generator.as_ref(), index, section, assets, config).await
            }
        },
    ))
    .buffered(config.concurrency)
    .collect()
    .await;

    for result in &results {
        report_section(cb, result, total);
    }
    results
}

fn report_section(cb: &ProgressCallback, result: &SectionResult, total: usize) {
    match &result.error {
        Some(err) => cb.on_section_fallback(result.index, total, err.to_string()),
        None => cb.on_section_complete(result.index, total, result.latex.len()),
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, Tex2BeamerError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Tex2BeamerError::Internal(format!("blocking task failed: {e}")))
}
