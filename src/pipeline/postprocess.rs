//! Deterministic cleanup of generated frames.
//!
//! Language models are asked for bare LaTeX but routinely wrap it in
//! Markdown code fences or emit an unterminated environment. Each rule
//! here is small, pure, and applied in a fixed order so the output is
//! reproducible for a given input.

use once_cell::sync::Lazy;
use regex::Regex;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*```(?:latex|tex)?\s*$").unwrap());

/// Clean one generated frame so it can be dropped into the deck.
///
/// Applies, in order: line-ending normalisation, code-fence removal,
/// trailing-whitespace trimming, blank-run collapsing, and frame
/// balancing. `title` is used when the model forgot the frame
/// environment entirely and the content must be wrapped in one.
pub fn clean_frame(input: &str, title: &str) -> String {
    let text = normalize_line_endings(input);
    let text = strip_code_fences(&text);
    let text = trim_trailing_whitespace(&text);
    let text = collapse_blank_runs(&text);
    ensure_frame(text.trim(), title)
}

fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Drop Markdown fence lines (```latex, ```tex, or bare ```).
fn strip_code_fences(text: &str) -> String {
    OPENING_FENCE.split(text).collect::<Vec<_>>().join("")
}

fn trim_trailing_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of 4+ newlines down to 3 (two blank lines).
fn collapse_blank_runs(text: &str) -> String {
    static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{4,}").unwrap());
    BLANK_RUN.replace_all(text, "\n\n\n").into_owned()
}

/// Guarantee the result is exactly one balanced frame environment.
fn ensure_frame(text: &str, title: &str) -> String {
    let mut out = if text.contains("\\begin{frame}") {
        text.to_string()
    } else {
        format!("\\begin{{frame}}{{{title}}}\n{text}")
    };

    let opens = out.matches("\\begin{frame}").count();
    let closes = out.matches("\\end{frame}").count();
    for _ in closes..opens {
        out.push_str("\n\\end{frame}");
    }

    out.trim().to_string()
}
