//! Markdown assembly: fence unwrapping and page concatenation.
//!
//! Models are told not to wrap their transcription in a fenced code block;
//! they sometimes do anyway. [`unwrap_markdown_fence`] removes exactly that
//! artefact — an enclosing ```` ```markdown ```` wrapper — and nothing else.
//! No whitespace normalisation, heading renumbering, or table repair
//! happens here: the transcription is the model's, quirks included.

use once_cell::sync::Lazy;
use regex::Regex;

/// An enclosing fenced block whose language tag is `markdown`, any case.
static RE_MARKDOWN_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)^```markdown\s*\n(.*?)\n?```\s*$").expect("valid regex"));

/// Remove a fenced-code-block wrapper tagged `markdown` (case-insensitive).
///
/// Text without such a wrapper — including fenced blocks with other
/// language tags — passes through unchanged.
pub fn unwrap_markdown_fence(text: &str) -> String {
    match RE_MARKDOWN_FENCE.captures(text.trim()) {
        Some(caps) => caps[1].to_string(),
        None => text.to_string(),
    }
}

/// Concatenate per-page fragments into the final document.
///
/// Each fragment is fence-unwrapped and followed by a blank-line separator
/// (`\n\n`), in the order given — ascending page order by the time the
/// pipeline calls this. Empty fragments from exhausted retries still
/// contribute their separator, so page boundaries stay aligned.
pub fn assemble(fragments: &[String]) -> String {
    let mut document = String::new();
    for fragment in fragments {
        document.push_str(&unwrap_markdown_fence(fragment));
        document.push_str("\n\n");
    }
    document
}
