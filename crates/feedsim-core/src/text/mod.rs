//! Text processing for similarity scoring: markup stripping, normalization
//! and stopword-filtered tokenization

mod stopwords;

pub use stopwords::StopWords;

use crate::error::{FeedsimError, Result};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::sync::OnceLock;

static MARKUP: OnceLock<Option<Regex>> = OnceLock::new();
static NON_WORDS: OnceLock<Option<Regex>> = OnceLock::new();
static WHITESPACE: OnceLock<Option<Regex>> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(pattern, error = %e, "Failed to compile text regex");
            None
        }
    })
    .as_ref()
}

/// Remove `<...>` tag markers, keeping the text between them
pub fn strip_markup(text: &str) -> String {
    match compiled(&MARKUP, r"<.*?>") {
        Some(re) => re.replace_all(text, "").into_owned(),
        None => text.to_string(),
    }
}

/// Remove punctuation and symbols, lowercase, and collapse whitespace
pub fn strip_non_words(text: &str) -> String {
    let cleaned = match compiled(&NON_WORDS, r"[^\w\s]+") {
        Some(re) => re.replace_all(text, "").to_lowercase(),
        None => text.to_lowercase(),
    };
    match compiled(&WHITESPACE, r"\s+") {
        Some(re) => re.replace_all(&cleaned, " ").trim().to_string(),
        None => cleaned.split_whitespace().collect::<Vec<_>>().join(" "),
    }
}

/// Build the comparable form of an entry from its title and content.
///
/// Markup is stripped from each part separately so an unbalanced `<` in the
/// title cannot swallow the start of the content. Entities are decoded
/// after tag removal, so `&lt;b&gt;` stays text.
///
/// Total and deterministic; `normalize("", &normalize(t, c)) == normalize(t, c)`.
pub fn normalize(title: &str, content: &str) -> String {
    let joined = format!("{} {}", strip_markup(title), strip_markup(content));
    strip_non_words(&html_escape::decode_html_entities(&joined))
}

/// Splits normalized text into terms.
///
/// Implementations must report malformed input as an error instead of
/// panicking; callers decide whether to recover.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

fn check_length(text: &str, max_bytes: usize) -> Result<()> {
    if text.len() > max_bytes {
        return Err(FeedsimError::InvalidDocument {
            reason: format!("{} bytes exceeds limit of {}", text.len(), max_bytes),
        });
    }
    Ok(())
}

/// Whitespace splitter with stopword removal
#[derive(Debug, Clone)]
pub struct WhitespaceTokenizer {
    stop_words: StopWords,
    max_bytes: usize,
}

impl WhitespaceTokenizer {
    pub fn new(stop_words: StopWords, max_bytes: usize) -> Self {
        Self {
            stop_words,
            max_bytes,
        }
    }

    fn split(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|s| s.to_lowercase())
            .filter(|s| !self.stop_words.contains(s))
            .collect()
    }
}

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        check_length(text, self.max_bytes)?;
        Ok(self.split(text))
    }
}

/// Whitespace splitter followed by English Snowball stemming, so that
/// "graph" and "graphs" count as the same term
pub struct StemmingTokenizer {
    inner: WhitespaceTokenizer,
    stemmer: Stemmer,
}

impl StemmingTokenizer {
    pub fn new(stop_words: StopWords, max_bytes: usize) -> Self {
        Self {
            inner: WhitespaceTokenizer::new(stop_words, max_bytes),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }
}

impl Tokenizer for StemmingTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.inner.tokenize(text)?;
        Ok(tokens
            .iter()
            .map(|t| self.stemmer.stem(t).into_owned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> WhitespaceTokenizer {
        WhitespaceTokenizer::new(StopWords::english(), 1024)
    }

    #[test]
    fn test_strip_markup() {
        let cases = [
            (
                "<p>This is a <strong>sample</strong> text with <a href=\"http://example.com\">HTML</a> tags.</p>",
                "This is a sample text with HTML tags.",
            ),
            (
                "<div><p>Nested <span>tags</span> example.</p></div>",
                "Nested tags example.",
            ),
            ("No HTML tags here!", "No HTML tags here!"),
            ("<a href='#'>Link</a>", "Link"),
            ("<img src='image.jpg' alt='image'/>", ""),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_markup(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_strip_non_words() {
        let cases = [
            (
                "This is a sample text with punctuation, and CAPITAL letters!",
                "this is a sample text with punctuation and capital letters",
            ),
            (
                "Multiple    spaces   should be  reduced.",
                "multiple spaces should be reduced",
            ),
            (
                "Numbers 123 and symbols #$%^ should be removed.",
                "numbers 123 and symbols should be removed",
            ),
            ("Special characters: @#$%^&*()!", "special characters"),
        ];
        for (input, expected) in cases {
            assert_eq!(strip_non_words(input), expected, "input: {input}");
        }
    }

    #[test]
    fn test_normalize_title_and_content() {
        let normalized = normalize(
            "Breaking: <em>Rust</em> 2.0!",
            "<div>Text with <span>nested <strong>HTML</strong></span> tags &amp; symbols.</div>",
        );
        assert_eq!(
            normalized,
            "breaking rust 20 text with nested html tags symbols"
        );
    }

    #[test]
    fn test_normalize_decodes_entities() {
        assert_eq!(
            normalize("Fish&nbsp;&amp;&nbsp;Chips", "caf&#233; &quot;open&quot; &#8212; &lt;b&gt; late"),
            "fish chips café open b late"
        );
    }

    #[test]
    fn test_normalize_keeps_title_and_content_apart() {
        assert_eq!(normalize("a<b", "c>d"), "ab cd");
        assert_eq!(normalize("<em>Title", "body</em> text"), "title body text");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize("", ""), "");
        assert_eq!(normalize("   ", "\n\t"), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            ("Title", "<p>Hello,   <b>World</b>!</p>"),
            ("", "snake_case stays put"),
            ("Ünïcödé Tïtle", "Straße — café"),
            ("<<broken", "tags> here <and"),
            ("Q&amp;A &nbsp;", "&lt;tag&gt; &amp;amp;"),
        ];
        for (title, content) in inputs {
            let once = normalize(title, content);
            assert_eq!(normalize("", &once), once, "input: {title:?} {content:?}");
        }
    }

    #[test]
    fn test_tokenize_drops_stop_words() {
        let tokens = tokenizer().tokenize("the quick brown fox and the dog").unwrap();
        assert_eq!(tokens, vec!["quick", "brown", "fox", "dog"]);
    }

    #[test]
    fn test_tokenize_stop_words_case_insensitive() {
        let tokens = tokenizer().tokenize("The AND Graph").unwrap();
        assert_eq!(tokens, vec!["graph"]);
    }

    #[test]
    fn test_tokenize_all_stop_words_is_empty() {
        let tokens = tokenizer().tokenize("the a an and or").unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_tokenize_extra_stop_words() {
        let stop_words = StopWords::english().with_extra(["fox"]);
        let tokens = WhitespaceTokenizer::new(stop_words, 1024)
            .tokenize("quick fox")
            .unwrap();
        assert_eq!(tokens, vec!["quick"]);
    }

    #[test]
    fn test_tokenize_rejects_oversized_document() {
        let tokenizer = WhitespaceTokenizer::new(StopWords::english(), 8);
        let err = tokenizer.tokenize("far too long for the limit").unwrap_err();
        assert!(matches!(err, FeedsimError::InvalidDocument { .. }));
        assert_eq!(err.error_type(), "invalid_document");
    }

    #[test]
    fn test_stemming_tokenizer_merges_plurals() {
        let tokenizer = StemmingTokenizer::new(StopWords::english(), 1024);
        let tokens = tokenizer.tokenize("graph graphs network networks").unwrap();
        assert_eq!(tokens, vec!["graph", "graph", "network", "network"]);
    }
}
