//! Section segmentation: strip comments, split the root document into
//! ordered sections, and sanitise titles for slide headings.

use once_cell::sync::Lazy;
use regex::Regex;

/// One top-level section of the source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Sanitised heading text.
    pub title: String,
    /// Raw LaTeX body between this heading and the next boundary.
    pub body: String,
}

/// LaTeX commands with a single brace argument, e.g. `\cite{foo}`.
static COMMAND_WITH_ARG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\*?\{[^}]*\}").unwrap());

/// Remove LaTeX comments from the source.
///
/// Everything from an unescaped `%` to the end of the line is dropped;
/// `\%` is a literal percent sign and kept. Line structure is preserved.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for (i, line) in source.lines().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(strip_line_comment(line));
    }
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn strip_line_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2, // skip escaped character, \% included
            b'%' => return &line[..i],
            _ => i += 1,
        }
    }
    line
}

/// Split a comment-stripped document into its `\section{...}` units.
///
/// A section runs from its heading to the next `\section`, to
/// `\end{document}`, or to `\bibliography`, whichever comes first. A
/// heading with none of these after it has no measurable extent and is
/// dropped. Titles may contain nested braces (`\section{The \emph{big}
/// idea}`); matching is brace-balanced, and headings whose braces never
/// close are skipped.
pub fn split_sections(source: &str) -> Vec<Section> {
    const MARKER: &str = "\\section{";
    const TERMINATORS: [&str; 3] = ["\\section", "\\end{document}", "\\bibliography"];

    let mut sections = Vec::new();
    let mut cursor = 0;

    while let Some(found) = source[cursor..].find(MARKER) {
        let start = cursor + found;
        let title_start = start + MARKER.len();

        let Some(title_end) = balanced_brace_end(&source[title_start..]) else {
            break; // unclosed title, nothing sensible follows
        };
        let title_end = title_start + title_end;
        let body_start = title_end + 1;

        let Some(body_len) = TERMINATORS
            .iter()
            .filter_map(|t| source[body_start..].find(t))
            .min()
        else {
            // No boundary after the heading: the section has no bounded
            // body and is excluded.
            break;
        };

        sections.push(Section {
            title: sanitize_title(&source[title_start..title_end]),
            body: source[body_start..body_start + body_len].trim().to_string(),
        });
        cursor = body_start + body_len;
    }

    sections
}

/// Byte offset of the `}` that closes an argument starting right after
/// its opening `{`, or `None` if the braces never balance.
fn balanced_brace_end(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1, // skip escaped brace
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Reduce a raw heading to plain text suitable for a frame title.
///
/// Commands carrying a brace argument (`\cite{...}`, `\label{...}`) are
/// removed whole, bare commands lose their backslash prefix, and stray
/// braces are dropped.
pub fn sanitize_title(raw: &str) -> String {
    static BARE_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+\*?\s*").unwrap());

    let no_args = COMMAND_WITH_ARG.replace_all(raw, "");
    let no_commands = BARE_COMMAND.replace_all(&no_args, "");
    no_commands.replace(['{', '}'], "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comments_are_stripped_to_end_of_line() {
        let src = "before % a comment\nnext line\n";
        assert_eq!(strip_comments(src), "before \nnext line\n");
    }

    #[test]
    fn escaped_percent_is_kept() {
        assert_eq!(strip_comments("50\\% of cases % note"), "50\\% of cases ");
    }

    #[test]
    fn splits_sections_at_boundaries() {
        let src = "\\begin{document}\n\
                   \\section{Introduction}\nWe study things.\n\
                   \\section{Methods}\nWe do things.\n\
                   \\end{document}\n";
        let sections = split_sections(src);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].title, "Introduction");
        assert_eq!(sections[0].body, "We study things.");
        assert_eq!(sections[1].title, "Methods");
        assert_eq!(sections[1].body, "We do things.");
    }

    #[test]
    fn bibliography_terminates_last_section() {
        let src = "\\section{Intro}\nFirst.\n\
                   \\section{Methods}\nSecond.\n\
                   \\section{Results}\nNumbers.\n\
                   \\bibliography{refs}\n";
        let sections = split_sections(src);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[2].body, "Numbers.");
        assert!(!sections[2].body.contains("refs"));
    }

    #[test]
    fn unterminated_trailing_section_is_dropped() {
        let src = "\\section{Intro}\nBody.\n\\section{Dangling}\nNo end marker here.";
        let sections = split_sections(src);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "Intro");
    }

    #[test]
    fn subsections_do_not_split() {
        let src = "\\section{Methods}\nIntro text.\n\\subsection{Details}\nMore.\n\\end{document}";
        let sections = split_sections(src);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].body.contains("\\subsection{Details}"));
    }

    #[test]
    fn nested_braces_in_titles_are_balanced() {
        let src = "\\section{The \\emph{big} idea}\nBody.\n\\end{document}";
        let sections = split_sections(src);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, "The big idea");
    }

    #[test]
    fn titles_lose_citation_commands() {
        assert_eq!(sanitize_title("Intro\\cite{foo}"), "Intro");
        assert_eq!(sanitize_title("Results \\label{sec:res}"), "Results");
        assert_eq!(sanitize_title("Plain Title"), "Plain Title");
    }

    #[test]
    fn empty_document_yields_no_sections() {
        assert!(split_sections("\\begin{document}\\end{document}").is_empty());
        assert!(split_sections("").is_empty());
    }
}
