//! Configuration types for archive-to-deck conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across tasks and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A twenty-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! documented defaults for the rest.

use crate::error::Tex2BeamerError;
use crate::generate::TextGenerator;
use crate::progress::ProgressCallback;
use std::fmt;
use std::sync::Arc;

/// Configuration for one archive-to-deck conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use tex2beamer::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .max_sections(8)
///     .model("gpt-4o-mini")
///     .compile(false)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Maximum number of sections to distill. Range: 1–64. Default: 10.
    ///
    /// A cost control, not a correctness requirement: each section is one
    /// paid LLM call, and decks past ten content slides stop being talks.
    /// Sections beyond the cap are dropped, and the run reports
    /// "found M, processing K" so the truncation is never silent.
    pub max_sections: usize,

    /// Character budget for a section body sent to the LLM. Default: 2000.
    ///
    /// Long sections blow up prompt cost without improving the slide — the
    /// model only needs enough context to pick the key points. Truncation
    /// happens on a char boundary; the source document is never modified.
    pub body_char_budget: usize,

    /// Number of concurrent generation calls. Default: 1 (document order).
    ///
    /// Sections are independent, so raising this parallelises the network
    /// wait; slide order is restored before assembly regardless. Keep at 1
    /// for rate-limited keys — sequential mode also applies `throttle_ms`
    /// between calls.
    pub concurrency: usize,

    /// Fixed delay after each generation call in sequential mode, in
    /// milliseconds. Default: 500.
    ///
    /// A deliberate rate-limit safety margin, not accidental latency.
    /// Ignored when `concurrency > 1` (pacing a parallel stream this way
    /// would serialise it again).
    pub throttle_ms: u64,

    /// LLM model identifier, e.g. "gpt-4o-mini", "gemini-2.0-flash".
    /// If None, uses the provider default.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "gemini", "ollama").
    /// If None along with `generator`, the provider is auto-detected from
    /// the environment.
    pub provider_name: Option<String>,

    /// Pre-constructed text generator. Takes precedence over `provider_name`.
    /// This is the injection point for tests and custom middleware.
    pub generator: Option<Arc<dyn TextGenerator>>,

    /// Sampling temperature for the generation call. Default: 0.3.
    ///
    /// Low temperature keeps the model close to the source text — slides
    /// should condense the section, not embellish it.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per section. Default: 1024.
    ///
    /// A single frame rarely needs more than a few hundred tokens; 1024
    /// covers dense math-heavy slides while keeping per-section cost
    /// predictable.
    pub max_tokens: usize,

    /// Maximum retry attempts on a transient generation failure. Default: 3.
    ///
    /// Most 5xx and timeout errors are transient. Retrying 3 times catches
    /// the vast majority; exhaustion produces the fallback frame rather
    /// than an error.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds (exponential backoff). Default: 500.
    ///
    /// Doubles after each attempt: 500 ms → 1 s → 2 s.
    pub retry_backoff_ms: u64,

    /// Per-generation-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Presentation title placed in the deck preamble.
    /// Default: "Research Presentation".
    pub deck_title: String,

    /// Beamer theme for the deck preamble. Default: "metropolis".
    pub theme: String,

    /// Run the LaTeX compiler after assembling the deck. Default: true.
    pub compile: bool,

    /// Compiler executable. Default: "pdflatex".
    pub compiler: String,

    /// Timeout for the compiler subprocess in seconds. Default: 120.
    pub compile_timeout_secs: u64,

    /// Progress callback; None disables progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            max_sections: 10,
            body_char_budget: 2000,
            concurrency: 1,
            throttle_ms: 500,
            model: None,
            provider_name: None,
            generator: None,
            temperature: 0.3,
            max_tokens: 1024,
            max_retries: 3,
            retry_backoff_ms: 500,
            api_timeout_secs: 60,
            download_timeout_secs: 120,
            system_prompt: None,
            deck_title: "Research Presentation".to_string(),
            theme: "metropolis".to_string(),
            compile: true,
            compiler: "pdflatex".to_string(),
            compile_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("max_sections", &self.max_sections)
            .field("body_char_budget", &self.body_char_budget)
            .field("concurrency", &self.concurrency)
            .field("throttle_ms", &self.throttle_ms)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field(
                "generator",
                &self.generator.as_ref().map(|_| "<dyn TextGenerator>"),
            )
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("deck_title", &self.deck_title)
            .field("theme", &self.theme)
            .field("compile", &self.compile)
            .field("compiler", &self.compiler)
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn max_sections(mut self, n: usize) -> Self {
        self.config.max_sections = n.clamp(1, 64);
        self
    }

    pub fn body_char_budget(mut self, n: usize) -> Self {
        self.config.body_char_budget = n.max(100);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn throttle_ms(mut self, ms: u64) -> Self {
        self.config.throttle_ms = ms;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.config.generator = Some(generator);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn deck_title(mut self, title: impl Into<String>) -> Self {
        self.config.deck_title = title.into();
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.config.theme = theme.into();
        self
    }

    pub fn compile(mut self, v: bool) -> Self {
        self.config.compile = v;
        self
    }

    pub fn compiler(mut self, compiler: impl Into<String>) -> Self {
        self.config.compiler = compiler.into();
        self
    }

    pub fn compile_timeout_secs(mut self, secs: u64) -> Self {
        self.config.compile_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Tex2BeamerError> {
        let c = &self.config;
        if c.max_sections == 0 || c.max_sections > 64 {
            return Err(Tex2BeamerError::InvalidConfig(format!(
                "max_sections must be 1–64, got {}",
                c.max_sections
            )));
        }
        if c.concurrency == 0 {
            return Err(Tex2BeamerError::InvalidConfig(
                "concurrency must be ≥ 1".into(),
            ));
        }
        if c.deck_title.is_empty() {
            return Err(Tex2BeamerError::InvalidConfig(
                "deck_title must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConversionConfig::builder().build().expect("defaults valid");
        assert_eq!(config.max_sections, 10);
        assert_eq!(config.body_char_budget, 2000);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.theme, "metropolis");
        assert!(config.compile);
    }

    #[test]
    fn setters_clamp_out_of_range_values() {
        let config = ConversionConfig::builder()
            .max_sections(500)
            .concurrency(0)
            .temperature(9.0)
            .body_char_budget(1)
            .build()
            .expect("clamped values are valid");
        assert_eq!(config.max_sections, 64);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.temperature, 2.0);
        assert_eq!(config.body_char_budget, 100);
    }

    #[test]
    fn empty_deck_title_rejected() {
        let err = ConversionConfig::builder()
            .deck_title("")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("deck_title"));
    }

    #[test]
    fn debug_does_not_require_generator_debug() {
        let config = ConversionConfig::default();
        let s = format!("{:?}", config);
        assert!(s.contains("max_sections"));
    }
}
