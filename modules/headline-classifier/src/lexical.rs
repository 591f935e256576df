// Lexical scan: which tokens of a headline belong to the suspicious-word vocabulary.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use regex::Regex;

/// Tokens treated as conspiracy-style signals.
pub const SUSPICIOUS_WORDS: [&str; 7] = [
    "hoax", "secret", "hidden", "exposed", "leak", "cover-up", "agenda",
];

/// Word runs with internal apostrophes or hyphens kept together ("cover-up", "don't").
static RE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*").unwrap());

/// Splits text into tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Default tokenizer: Unicode word runs, punctuation dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        RE_WORD
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

/// Intersects a headline's tokens with a fixed vocabulary.
#[derive(Clone)]
pub struct SuspiciousWordScanner {
    tokenizer: Arc<dyn Tokenizer>,
    vocabulary: HashSet<&'static str>,
}

impl SuspiciousWordScanner {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self {
            tokenizer,
            vocabulary: SUSPICIOUS_WORDS.into_iter().collect(),
        }
    }

    /// Matching tokens of the lower-cased text, de-duplicated in first-seen order.
    pub fn scan(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut seen = HashSet::new();
        self.tokenizer
            .tokenize(&lowered)
            .into_iter()
            .filter(|token| self.vocabulary.contains(token.as_str()))
            .filter(|token| seen.insert(token.clone()))
            .collect()
    }
}

impl Default for SuspiciousWordScanner {
    fn default() -> Self {
        Self::new(Arc::new(WordTokenizer))
    }
}

impl std::fmt::Debug for SuspiciousWordScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuspiciousWordScanner")
            .field("vocabulary", &self.vocabulary.len())
            .finish()
    }
}
