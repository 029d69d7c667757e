//! Text cleaning for titles and descriptions.

use html_escape::decode_html_entities;
use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("static regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));
// letters, digits, whitespace and everyday punctuation survive
static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[^\w\s.,!?:;'"()\&%$/+\-’‘“”–—…]"#).expect("static regex")
});

const WORDS_PER_MINUTE: f64 = 200.0;

/// Decode entities, drop markup and disallowed characters, collapse whitespace.
///
/// An input that is only markup or symbols comes back empty.
pub fn clean_text(raw: &str) -> String {
    let decoded = decode_html_entities(raw);
    let without_code = SCRIPT_OR_STYLE.replace_all(&decoded, " ");
    let without_tags = TAG.replace_all(&without_code, " ");
    // a second decode catches entities that were escaped inside CDATA markup
    let decoded_again = decode_html_entities(&without_tags);
    let allowed = DISALLOWED.replace_all(&decoded_again, "");
    allowed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to at most `max_chars` characters on a word boundary, marking
/// the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ',' || c == '.'))
}

/// Minutes to read `text` at 200 words per minute, never less than one.
pub fn reading_time(text: &str) -> u32 {
    let words = text.split_whitespace().count() as f64;
    ((words / WORDS_PER_MINUTE).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_strips_markup_and_entities() {
        assert_eq!(
            clean_text("<p>Researchers <b>announced</b>&nbsp;a   model &amp; dataset.</p>"),
            "Researchers announced a model & dataset."
        );
    }

    #[test]
    fn test_clean_text_handles_escaped_markup() {
        assert_eq!(clean_text("&lt;p&gt;Long body&lt;/p&gt;"), "Long body");
    }

    #[test]
    fn test_clean_text_drops_scripts_and_symbols() {
        assert_eq!(
            clean_text("<script>var x = 1;</script>Hello ★ world <style>p{}</style>"),
            "Hello world"
        );
        assert_eq!(clean_text("<img src=x> ★ ◆"), "");
    }

    #[test]
    fn test_clean_text_keeps_common_punctuation() {
        assert_eq!(
            clean_text("GPT-5: what’s next? (50% faster)"),
            "GPT-5: what’s next? (50% faster)"
        );
    }

    #[test]
    fn test_truncate_chars_on_word_boundary() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("one two three four", 12), "one two...");
        assert_eq!(truncate_chars("averyveryverylongword", 5), "avery...");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time(&"word ".repeat(250)), 1);
        assert_eq!(reading_time(&"word ".repeat(300)), 2);
        assert_eq!(reading_time(&"word ".repeat(1000)), 5);
    }
}
