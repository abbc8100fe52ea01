//! The text-generation seam: one narrow trait between the pipeline and
//! whichever LLM provider is configured.
//!
//! ## Why a trait instead of calling the provider directly?
//!
//! The distiller needs exactly one capability — "turn this prompt into
//! text" — while providers differ in wire protocol, auth, and defaults.
//! Hiding them behind [`TextGenerator`] keeps the pipeline provider-agnostic
//! and lets tests substitute a scripted generator (canned frames, simulated
//! failures) without touching the network.
//!
//! The production implementation, [`LlmGenerator`], wraps any
//! `edgequake_llm::LLMProvider`, so every provider the factory knows about
//! (OpenAI, Anthropic, Gemini, Perplexity-compatible endpoints, Ollama, …)
//! is available through configuration alone.

use crate::config::ConversionConfig;
use crate::error::Tex2BeamerError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use thiserror::Error;

/// Default model when a provider is named without a model.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A single generation request: system instructions plus the user prompt.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f32,
    pub max_tokens: usize,
}

/// A completed generation with token accounting.
#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Errors a [`TextGenerator`] can return.
///
/// These never escape the distiller: each one is converted into a fallback
/// slide at that boundary.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    /// The underlying provider call failed (network, quota, API error).
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider returned an empty or whitespace-only completion.
    #[error("empty response from provider")]
    EmptyResponse,
}

/// The one capability the pipeline needs from the outside world.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerateError>;
}

/// Production [`TextGenerator`] backed by an `edgequake_llm` provider.
pub struct LlmGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl LlmGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl TextGenerator for LlmGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation, GenerateError> {
        let messages = vec![
            ChatMessage::system(request.system_prompt.clone()),
            ChatMessage::user(request.user_prompt.clone()),
        ];

        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| GenerateError::Provider(e.to_string()))?;

        if response.content.trim().is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(Generation {
            text: response.content,
            input_tokens: response.prompt_tokens as u32,
            output_tokens: response.completion_tokens as u32,
        })
    }
}

/// Instantiate a named provider with the given model.
fn create_generator(
    provider_name: &str,
    model: &str,
) -> Result<Arc<dyn TextGenerator>, Tex2BeamerError> {
    let provider = ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        Tex2BeamerError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })?;
    Ok(Arc::new(LlmGenerator::new(provider)))
}

/// Resolve the text generator, from most-specific to least-specific.
///
/// The four-level fallback chain lets library users and CLI users each set
/// exactly as much or as little as they need:
///
/// 1. **Pre-built generator** (`config.generator`) — the caller constructed
///    it entirely; we use it as-is. This is the injection point for tests.
///
/// 2. **Named provider + model** (`config.provider_name`) — reads the
///    corresponding API key (`OPENAI_API_KEY`, etc.) from the environment
///    via [`ProviderFactory::create_llm_provider`].
///
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`) —
///    both set means the execution environment (Makefile, CI) chose; checked
///    before full auto-detection so the model choice is honoured even when
///    multiple API keys are present.
///
/// 4. **Full auto-detection** (`ProviderFactory::from_env`) — scans all known
///    API key variables and picks the first available provider. An OpenAI
///    key is preferred when present so users with several keys get a
///    predictable default.
pub fn resolve_generator(
    config: &ConversionConfig,
) -> Result<Arc<dyn TextGenerator>, Tex2BeamerError> {
    // 1) User-provided generator takes priority
    if let Some(ref generator) = config.generator {
        return Ok(Arc::clone(generator));
    }

    // 2) Provider name + model
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_generator(name, model);
    }

    // 3) Honour EDGEQUAKE_LLM_PROVIDER + EDGEQUAKE_MODEL when both set
    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_generator(&prov, &model);
        }
    }

    // Prefer OpenAI explicitly when an OpenAI API key is present, so users
    // with multiple provider keys get a deterministic default.
    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_generator("openai", model);
        }
    }

    // 4) Full auto-detection
    let (provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| Tex2BeamerError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(Arc::new(LlmGenerator::new(provider)))
}
