//! Render the original input as HTML with corrected phrases marked.
//!
//! Matching runs on the raw text and the result is escaped piece by piece,
//! so a phrase can never match inside markup or an entity.

use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::warn;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";
pub const LINE_BREAK: &str = "<br>";

static AMPERSAND: OnceLock<Regex> = OnceLock::new();

fn ampersand_regex() -> &'static Regex {
    AMPERSAND.get_or_init(|| {
        Regex::new(r"&(#[0-9]+;|#[xX][0-9a-fA-F]+;|[A-Za-z][A-Za-z0-9]*;)?").unwrap()
    })
}

/// Escape `<`, `>` and bare `&`.
///
/// An `&` that already starts a character reference is kept, which makes the
/// function idempotent.
pub fn escape_html(text: &str) -> String {
    let amps = ampersand_regex().replace_all(text, |caps: &Captures| {
        if caps.get(1).is_some() {
            caps[0].to_string()
        } else {
            "&amp;".to_string()
        }
    });
    amps.replace('<', "&lt;").replace('>', "&gt;")
}

/// Convert `\n` and `\r\n` to the display line break.
pub fn line_breaks_to_html(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

/// Distinct non-blank phrases, first occurrence wins.
pub fn unique_phrases(words: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(words.len());
    for word in words {
        let word = word.as_str();
        if word.trim().is_empty() || seen.contains(&word) {
            continue;
        }
        seen.push(word);
    }
    seen
}

/// Case-insensitive pattern for `phrase`, anchored on word boundaries where
/// the phrase starts or ends with a word character.
fn phrase_pattern(phrase: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let leading = if phrase.starts_with(is_word) { r"\b" } else { "" };
    let trailing = if phrase.ends_with(is_word) { r"\b" } else { "" };
    format!("(?i){leading}{}{trailing}", regex::escape(phrase))
}

/// Byte ranges of `text` to mark, in ascending order.
///
/// Phrases are applied in order; a match that overlaps an earlier mark is
/// skipped, so a broad early phrase can shadow a later, narrower one.
pub fn marked_ranges(text: &str, wrong_words: &[String]) -> Vec<Range<usize>> {
    let mut marked: Vec<Range<usize>> = Vec::new();

    for phrase in unique_phrases(wrong_words) {
        let re = match Regex::new(&phrase_pattern(phrase)) {
            Ok(re) => re,
            Err(e) => {
                warn!(phrase, error = %e, "skipping phrase that does not compile");
                continue;
            }
        };
        for m in re.find_iter(text) {
            let overlaps = marked
                .iter()
                .any(|r| m.start() < r.end && r.start < m.end());
            if !overlaps && !m.range().is_empty() {
                marked.push(m.range());
            }
        }
    }

    marked.sort_by_key(|r| r.start);
    marked
}

/// HTML rendering of `original` with every occurrence of each wrong word
/// wrapped in `<mark>`.
pub fn highlight(original: &str, wrong_words: &[String]) -> String {
    let text = original.replace("\r\n", "\n");
    let ranges = marked_ranges(&text, wrong_words);

    let mut html = String::with_capacity(text.len() + ranges.len() * 13);
    let mut cursor = 0;
    for range in ranges {
        html.push_str(&line_breaks_to_html(&escape_html(&text[cursor..range.start])));
        html.push_str(MARK_OPEN);
        html.push_str(&line_breaks_to_html(&escape_html(&text[range.clone()])));
        html.push_str(MARK_CLOSE);
        cursor = range.end;
    }
    html.push_str(&line_breaks_to_html(&escape_html(&text[cursor..])));
    html
}
