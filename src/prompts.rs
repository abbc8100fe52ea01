//! Prompts for section-to-frame distillation.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — changing the default behaviour (e.g.
//!    tweaking how images are referenced) requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can inspect prompts directly without
//!    spinning up a real LLM, making prompt regressions easy to catch.
//!
//! Callers can override the system prompt via
//! [`crate::config::ConversionConfig::system_prompt`]; the constant here is
//! used only when no override is provided.

/// Default system prompt for converting a paper section to a Beamer frame.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"You are a Beamer slide expert. You convert one section of a LaTeX research paper into exactly one Beamer frame.

Follow these rules precisely:

1. OUTPUT FORMAT
   - Output ONLY LaTeX code, starting with \begin{frame}{Title} and ending with \end{frame}
   - Do NOT wrap the output in ```latex fences
   - Do NOT add commentary or explanations

2. CONTENT
   - Condense the section into 3-6 bullet points using \begin{itemize} and \item
   - Keep all mathematical formulas exactly as written ($...$ stays $...$)
   - Prefer the section's own wording over paraphrase for key terms

3. GRAPHICS
   - If one of the available graphics filenames clearly matches the content,
     include it via \includegraphics[width=0.5\textwidth]{filename}
   - Include at most one graphic, and only when it genuinely fits"#;

/// Build the per-section user prompt embedding title, body, and asset list.
///
/// The body is expected to be pre-truncated by the caller; this function does
/// no length management of its own.
pub fn section_prompt(title: &str, body: &str, assets: &[String]) -> String {
    format!(
        "Convert this research section into a single LaTeX Beamer frame.\n\
         Section title: {title}\n\
         Available graphics: {assets}\n\
         \n\
         Section content:\n\
         {body}",
        title = title,
        assets = if assets.is_empty() {
            "(none)".to_string()
        } else {
            assets.join(", ")
        },
        body = body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_forbids_fences_and_demands_frames() {
        assert!(DEFAULT_SYSTEM_PROMPT.contains("\\begin{frame}"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("\\end{frame}"));
        assert!(DEFAULT_SYSTEM_PROMPT.contains("```latex"));
    }

    #[test]
    fn section_prompt_embeds_all_parts() {
        let assets = vec!["figure1.png".to_string(), "arch.pdf".to_string()];
        let p = section_prompt("Introduction", "We study $x^2$.", &assets);
        assert!(p.contains("Introduction"));
        assert!(p.contains("We study $x^2$."));
        assert!(p.contains("figure1.png, arch.pdf"));
    }

    #[test]
    fn section_prompt_handles_empty_assets() {
        let p = section_prompt("Methods", "body", &[]);
        assert!(p.contains("(none)"));
    }
}
