// docstring.rs - Numpy-style doc text parsing
//
// Commands can attach a documentation block; the first paragraph becomes the
// command description and a `Parameters` section supplies per-option
// descriptions. Only the subset needed for that is parsed here.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a parameter header line such as `url : str` or `count`.
static PARAM_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*(?::.*)?$").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDoc {
    pub short_description: Option<String>,
    pub params: HashMap<String, String>,
}

/// Parse a doc block into its summary line(s) and parameter descriptions.
pub fn parse(doc: &str) -> ParsedDoc {
    let lines = dedent(doc);
    let mut parsed = ParsedDoc::default();

    // Summary: the first block of non-empty lines.
    let mut summary = Vec::new();
    for line in &lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if !summary.is_empty() {
                break;
            }
            continue;
        }
        if trimmed == "Parameters" {
            break;
        }
        summary.push(trimmed);
    }
    if !summary.is_empty() {
        parsed.short_description = Some(summary.join(" "));
    }

    // Parameters section: entries are `name : type` headers at the margin
    // followed by indented description lines.
    let Some(start) = section_start(&lines, "Parameters") else {
        return parsed;
    };

    let mut current: Option<(String, Vec<String>)> = None;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !line.starts_with(char::is_whitespace) {
            // A margin-level header ends the section when it introduces the
            // next underlined section (e.g. `Returns`).
            if is_section_header(&lines, index) {
                break;
            }
            if is_underline(trimmed) {
                continue;
            }
            if let Some(caps) = PARAM_HEADER.captures(trimmed) {
                finish(&mut parsed, current.take());
                current = Some((caps[1].to_owned(), Vec::new()));
            }
        } else if let Some((_, body)) = current.as_mut() {
            body.push(trimmed.to_owned());
        }
    }
    finish(&mut parsed, current.take());

    parsed
}

fn finish(parsed: &mut ParsedDoc, entry: Option<(String, Vec<String>)>) {
    if let Some((name, body)) = entry {
        parsed.params.insert(name, body.join(" "));
    }
}

/// Index of the first line after a `header` line underlined with dashes.
fn section_start(lines: &[String], header: &str) -> Option<usize> {
    lines.iter().enumerate().find_map(|(index, line)| {
        let next = lines.get(index + 1)?;
        (line.trim() == header && is_underline(next.trim())).then_some(index + 2)
    })
}

fn is_section_header(lines: &[String], index: usize) -> bool {
    match lines.get(index + 1) {
        Some(next) => is_underline(next.trim()),
        None => false,
    }
}

fn is_underline(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Normalize indentation: the first line is trimmed as-is, the remaining
/// lines lose their common leading indentation. Doc blocks written as
/// indented string literals come out at the margin either way.
fn dedent(doc: &str) -> Vec<String> {
    let mut lines = doc.lines();
    let first = lines.next().map(|line| line.trim().to_owned());
    let rest: Vec<&str> = lines.collect();
    let indent = rest
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out = Vec::new();
    out.extend(first);
    for line in rest {
        if line.len() >= indent {
            out.push(line[indent..].to_owned());
        } else {
            out.push(line.trim_start().to_owned());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_and_params() {
        let doc = "
            Rank and analyze web content.

            Runs the analyzer against a URL and reports findings.

            Parameters
            ----------
            url : str
                URL to analyze
            analysis_type : str, optional
                Type of analysis to perform,
                spanning two lines

            Returns
            -------
            None
        ";
        let parsed = parse(doc);
        assert_eq!(
            parsed.short_description.as_deref(),
            Some("Rank and analyze web content.")
        );
        assert_eq!(parsed.params.len(), 2);
        assert_eq!(parsed.params["url"], "URL to analyze");
        assert_eq!(
            parsed.params["analysis_type"],
            "Type of analysis to perform, spanning two lines"
        );
    }

    #[test]
    fn summary_only_doc_has_no_params() {
        let parsed = parse("Echo the given message back.");
        assert_eq!(
            parsed.short_description.as_deref(),
            Some("Echo the given message back.")
        );
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn param_header_without_type_is_accepted() {
        let doc = "Summary.\n\nParameters\n----------\nmessage\n    What to echo\n";
        let parsed = parse(doc);
        assert_eq!(parsed.params["message"], "What to echo");
    }

    #[test]
    fn first_line_at_margin_still_dedents_the_rest() {
        let doc = "Echo back your message.

            Parameters
            ----------
            message : str
                The message to echo
            ";
        let parsed = parse(doc);
        assert_eq!(
            parsed.short_description.as_deref(),
            Some("Echo back your message.")
        );
        assert_eq!(parsed.params["message"], "The message to echo");
    }

    #[test]
    fn empty_doc_parses_to_nothing() {
        assert_eq!(parse(""), ParsedDoc::default());
    }
}
