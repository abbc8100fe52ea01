//! Per-section distillation: prompt the generator, retry on failure, and
//! fall back to a placeholder frame so one bad section never sinks the deck.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::error::SectionError;
use crate::generate::{GenerationRequest, TextGenerator};
use crate::output::SectionResult;
use crate::pipeline::postprocess;
use crate::pipeline::segment::Section;
use crate::prompts;

/// Distill one section into a Beamer frame.
///
/// `index` is 1-based and used for logging and error reports. The call
/// never returns an error: when every attempt fails the result carries a
/// placeholder frame plus the error that exhausted the retries, and the
/// caller decides how loudly to report it.
pub async fn distill_section(
    generator: &dyn TextGenerator,
    index: usize,
    section: &Section,
    assets: &[String],
    config: &ConversionConfig,
) -> SectionResult {
    let started = Instant::now();

    let body = truncate_chars(&section.body, config.body_char_budget);
    let request = GenerationRequest {
        system_prompt: config
            .system_prompt
            .clone()
            .unwrap_or_else(|| prompts::DEFAULT_SYSTEM_PROMPT.to_string()),
        user_prompt: prompts::section_prompt(&section.title, body, assets),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
    };

    let mut last_error = SectionError::GenerationFailed {
        index,
        retries: 0,
        detail: "no attempt made".to_string(),
    };

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Section {} attempt {} failed, retrying in {}ms",
                index, attempt, backoff
            );
            tokio::time::sleep(Duration::from_millis(backoff)).await;
        }

        let call = generator.generate(&request);
        match tokio::time::timeout(Duration::from_secs(config.api_timeout_secs), call).await {
            Ok(Ok(generation)) => {
                debug!(
                    "Section {} distilled in {:?} ({} -> {} tokens)",
                    index,
                    started.elapsed(),
                    generation.input_tokens,
                    generation.output_tokens
                );
                return SectionResult {
                    index,
                    title: section.title.clone(),
                    latex: postprocess::clean_frame(&generation.text, &section.title),
                    input_tokens: generation.input_tokens,
                    output_tokens: generation.output_tokens,
                    duration_ms: started.elapsed().as_millis() as u64,
                    retries: attempt as u8,
                    error: None,
                };
            }
            Ok(Err(err)) => {
                last_error = SectionError::GenerationFailed {
                    index,
                    retries: attempt as u8,
                    detail: err.to_string(),
                };
            }
            Err(_) => {
                last_error = SectionError::Timeout {
                    index,
                    secs: config.api_timeout_secs,
                };
            }
        }
    }

    warn!(
        "Section {} ({}) exhausted {} retries, using fallback frame",
        index, section.title, config.max_retries
    );
    SectionResult {
        index,
        title: section.title.clone(),
        latex: fallback_frame(&section.title),
        input_tokens: 0,
        output_tokens: 0,
        duration_ms: started.elapsed().as_millis() as u64,
        retries: config.max_retries as u8,
        error: Some(last_error),
    }
}

/// Placeholder frame emitted when distillation fails outright.
pub fn fallback_frame(title: &str) -> String {
    format!(
        "\\begin{{frame}}{{{title}}}\n\
         \\begin{{itemize}}\n\
         \\item Content distillation failed for this section.\n\
         \\end{{itemize}}\n\
         \\end{{frame}}"
    )
}

/// Truncate on a character boundary so multi-byte text never splits.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{GenerateError, Generation};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyGenerator {
        fail_first: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TextGenerator for FlakyGenerator {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> Result<Generation, GenerateError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                return Err(GenerateError::Provider("transient".to_string()));
            }
            Ok(Generation {
                text: format!(
                    "\\begin{{frame}}{{ok}}\n{}\n\\end{{frame}}",
                    request.user_prompt.len()
                ),
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }

    fn test_config() -> ConversionConfig {
        ConversionConfig::builder()
            .max_retries(2)
            .retry_backoff_ms(1)
            .api_timeout_secs(5)
            .build()
            .unwrap()
    }

    fn section() -> Section {
        Section {
            title: "Methods".to_string(),
            body: "We measure things.".to_string(),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let generator = FlakyGenerator {
            fail_first: 2,
            calls: AtomicUsize::new(0),
        };
        let result = distill_section(&generator, 1, &section(), &[], &test_config()).await;
        assert!(result.error.is_none());
        assert_eq!(result.retries, 2);
        assert_eq!(result.input_tokens, 10);
    }

    #[tokio::test]
    async fn falls_back_when_retries_exhaust() {
        let generator = FlakyGenerator {
            fail_first: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let result = distill_section(&generator, 3, &section(), &[], &test_config()).await;
        assert!(result.is_fallback());
        assert!(result.latex.contains("\\begin{frame}{Methods}"));
        assert!(result.latex.contains("Content distillation failed"));
        // 1 initial attempt + 2 retries.
        assert_eq!(generator.calls.load(Ordering::SeqCst), 3);
        match result.error {
            Some(SectionError::GenerationFailed { index, .. }) => assert_eq!(index, 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fallback_frame_is_balanced() {
        let frame = fallback_frame("Discussion");
        assert_eq!(frame.matches("\\begin{frame}").count(), 1);
        assert_eq!(frame.matches("\\end{frame}").count(), 1);
        assert!(frame.contains("{Discussion}"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
