//! CLI binary for tex2beamer.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tex2beamer::{
    convert, ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-section
/// log lines using [indicatif]. Works correctly when sections complete
/// out-of-order (concurrent mode).
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-section wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of sections that fell back to a placeholder frame.
    fallbacks: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically by
    /// `on_run_start` (called once the document has been segmented).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_run_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Extracting archive…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            fallbacks: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>2}/{len} sections  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Distilling");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, found: usize, processing: usize) {
        self.activate_bar(processing);
        let note = if processing < found {
            format!("Found {found} sections, distilling first {processing}…")
        } else {
            format!("Distilling {processing} sections…")
        };
        self.bar.println(format!("{} {}", cyan("◆"), bold(&note)));
    }

    fn on_section_start(&self, index: usize, _total: usize, title: &str) {
        self.start_times
            .lock()
            .unwrap()
            .insert(index, Instant::now());
        self.bar.set_message(title.to_string());
    }

    fn on_section_complete(&self, index: usize, total: usize, latex_len: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Section {:>2}/{:<2}  {:<8}  {}",
            green("✓"),
            index,
            total,
            dim(&format!("{latex_len:>5} chars")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_section_fallback(&self, index: usize, total: usize, error: String) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&index)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.fallbacks.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error
        };

        self.bar.println(format!(
            "  {} Section {:>2}/{:<2}  {}  {}",
            red("✗"),
            index,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_compile_start(&self) {
        self.bar.set_prefix("Compiling");
        self.bar.set_message("running LaTeX…");
    }

    fn on_run_complete(&self, total: usize, fallbacks: usize, compiled: Option<bool>) {
        self.bar.finish_and_clear();

        let distilled = total.saturating_sub(fallbacks);
        if fallbacks == 0 {
            eprintln!(
                "{} {} sections distilled successfully",
                green("✔"),
                bold(&distilled.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} sections distilled  ({} placeholder)",
                if distilled == 0 { red("✘") } else { cyan("⚠") },
                bold(&distilled.to_string()),
                total,
                red(&fallbacks.to_string()),
            );
        }

        match compiled {
            Some(true) => eprintln!("{} deck compiled successfully", green("✔")),
            Some(false) => eprintln!(
                "{} compilation issue — see the log next to the deck",
                cyan("⚠")
            ),
            None => {}
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (compiles presentation.pdf next to the sources)
  tex2beamer paper.tar.gz

  # Convert an arXiv source bundle from a URL
  tex2beamer https://arxiv.org/e-print/1706.03762

  # Use a specific model and provider
  tex2beamer --model gpt-4o --provider openai paper.tar.gz

  # More sections, bigger excerpts, no LaTeX compilation
  tex2beamer --sections 12 --body-budget 3000 --no-compile paper.tar.gz

  # Concurrent distillation
  tex2beamer --concurrency 4 paper.tar.gz

  # Structured JSON report
  tex2beamer --json paper.tar.gz > report.json

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID

SETUP:
  1. Set API key:     export OPENAI_API_KEY=sk-...
  2. Convert:         tex2beamer paper.tar.gz

  The archive is extracted to a `<name>_extracted/` directory next to it;
  the deck lands there as presentation.tex (and presentation.pdf when a
  LaTeX toolchain is installed).
"#;

/// Convert LaTeX paper archives into Beamer slide decks using LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "tex2beamer",
    version,
    about = "Convert LaTeX paper archives into Beamer slide decks using LLMs",
    long_about = "Convert an arXiv-style LaTeX source archive (local .tar.gz or URL) into a \
Beamer presentation. Each paper section is distilled into one frame by a language model; \
the deck is assembled and compiled with pdflatex. Supports OpenAI, Anthropic, Google \
Gemini, and any OpenAI-compatible endpoint.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local archive path (.tar.gz/.tgz/.tar) or HTTP/HTTPS URL.
    input: String,

    /// LLM model ID (e.g. gpt-4o-mini, claude-sonnet-4-20250514).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(
        long,
        env = "EDGEQUAKE_PROVIDER",
        long_help = "LLM provider. Auto-detected from API key env vars if not set.\n\
          Supported: openai, anthropic, gemini, azure, ollama, or any OpenAI-compatible URL."
    )]
    provider: Option<String>,

    /// Maximum number of sections to distill (1-64).
    #[arg(long, env = "TEX2BEAMER_SECTIONS", default_value_t = 10,
          value_parser = clap::value_parser!(usize))]
    sections: usize,

    /// Number of concurrent LLM calls (1 = sequential with throttling).
    #[arg(short, long, env = "TEX2BEAMER_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Max characters of section body sent per prompt.
    #[arg(long, env = "TEX2BEAMER_BODY_BUDGET", default_value_t = 2000)]
    body_budget: usize,

    /// Beamer theme for the deck.
    #[arg(long, env = "TEX2BEAMER_THEME", default_value = "metropolis")]
    theme: String,

    /// Title shown on the deck's title page.
    #[arg(long, env = "TEX2BEAMER_TITLE", default_value = "Research Presentation")]
    title: String,

    /// Skip the LaTeX compilation step; only write presentation.tex.
    #[arg(long, env = "TEX2BEAMER_NO_COMPILE")]
    no_compile: bool,

    /// LaTeX compiler binary to invoke.
    #[arg(long, env = "TEX2BEAMER_COMPILER", default_value = "pdflatex")]
    compiler: String,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "TEX2BEAMER_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max LLM output tokens per section.
    #[arg(long, env = "TEX2BEAMER_MAX_TOKENS", default_value_t = 1024)]
    max_tokens: usize,

    /// LLM temperature (0.0-2.0).
    #[arg(long, env = "TEX2BEAMER_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Retries per section on LLM failure.
    #[arg(long, env = "TEX2BEAMER_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Pause between sequential LLM calls, in milliseconds.
    #[arg(long, env = "TEX2BEAMER_THROTTLE_MS", default_value_t = 500)]
    throttle_ms: u64,

    /// Output a structured JSON report instead of the summary.
    #[arg(long, env = "TEX2BEAMER_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "TEX2BEAMER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEX2BEAMER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "TEX2BEAMER_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "TEX2BEAMER_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Per-section LLM call timeout in seconds.
    #[arg(long, env = "TEX2BEAMER_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// LaTeX compilation timeout in seconds.
    #[arg(long, env = "TEX2BEAMER_COMPILE_TIMEOUT", default_value_t = 120)]
    compile_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let config = build_config(&cli, progress_cb).await?;

    // ── Run conversion ───────────────────────────────────────────────────
    // Per-section failures and compile problems are reported inside the
    // output, not as errors; only unusable input is fatal here.
    let output = convert(&cli.input, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
        return Ok(());
    }

    if !cli.quiet {
        eprintln!(
            "{}  deck written to {}",
            green("✔"),
            bold(&output.tex_path.display().to_string())
        );
        if !show_progress {
            eprintln!(
                "Distilled {}/{} sections in {}ms",
                output.stats.sections_processed - output.stats.fallback_sections,
                output.stats.sections_processed,
                output.stats.total_duration_ms
            );
            match output.compile.as_ref().map(|r| r.success) {
                Some(true) => eprintln!("deck compiled successfully"),
                Some(false) => eprintln!(
                    "compilation issue — see {}",
                    output
                        .compile
                        .as_ref()
                        .map(|r| r.log_path.display().to_string())
                        .unwrap_or_default()
                ),
                None => {}
            }
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .max_sections(cli.sections)
        .body_char_budget(cli.body_budget)
        .concurrency(cli.concurrency)
        .throttle_ms(cli.throttle_ms)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .deck_title(&cli.title)
        .theme(&cli.theme)
        .compile(!cli.no_compile)
        .compiler(&cli.compiler)
        .compile_timeout_secs(cli.compile_timeout)
        .download_timeout_secs(cli.download_timeout)
        .api_timeout_secs(cli.api_timeout);

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    let mut config = builder.build().context("Invalid configuration")?;

    // Apply fields the builder doesn't need validation for.
    config.model = cli.model.clone();
    config.provider_name = cli.provider.clone();
    config.system_prompt = system_prompt;

    Ok(config)
}
