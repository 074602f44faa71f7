//! Text normalization.
//!
//! The learner never looks at raw text directly: every document and every
//! query goes through a [`Normalizer`] first. The same instance is used for
//! training and for classification, so both sides agree on the term space.

pub mod stem;
pub mod stopwords;

use std::sync::LazyLock;

use regex::Regex;

use crate::text::stem::PorterStemmer;
use crate::text::stopwords::StopWords;

/// markup entities left over from feed extraction (`&lt;`, `&#1234;`)
static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;|&gt;|&amp;|&#[0-9]+;").expect("entity pattern is valid"));

/// Turns raw text into a sequence of terms.
///
/// Implementations must be deterministic and idempotent on their own output:
/// normalizing the same text twice yields the same terms.
pub trait Normalizer {
    fn normalize(&self, text: &str) -> Vec<String>;

    /// Normalize a single query term.
    /// `None` unless the input reduces to exactly one term: stop words and
    /// noise yield nothing, compounds like `long-term` yield two.
    fn normalize_term(&self, term: &str) -> Option<String> {
        let mut terms = self.normalize(term).into_iter();
        match (terms.next(), terms.next()) {
            (Some(term), None) => Some(term),
            _ => None,
        }
    }
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn normalize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// English pipeline: lowercase, drop markup entities and noisy words,
/// strip punctuation, remove stop words, then stem.
#[derive(Debug, Clone, Copy)]
pub struct EnglishNormalizer {
    stop_words: StopWords,
    noise_words: StopWords,
    stemmer: PorterStemmer,
    stem: bool,
}

impl EnglishNormalizer {
    pub fn new() -> Self {
        EnglishNormalizer {
            stop_words: StopWords::english(),
            noise_words: StopWords::feed_noise(),
            stemmer: PorterStemmer::new(),
            stem: true,
        }
    }

    /// Same filtering, no suffix stripping.
    pub fn without_stemming() -> Self {
        EnglishNormalizer {
            stem: false,
            ..Self::new()
        }
    }

    /// words carrying digits, underscores or `@` are identifiers, not vocabulary
    #[inline]
    fn is_noise(word: &str) -> bool {
        word.chars().any(|c| c.is_ascii_digit() || c == '_' || c == '@')
    }

    fn reduce(&self, raw: &str) -> Option<String> {
        if Self::is_noise(raw) {
            return None;
        }
        let word: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        if word.is_empty() || self.stop_words.contains(&word) || self.noise_words.contains(&word) {
            return None;
        }
        let term = if self.stem { self.stemmer.stem(&word) } else { word };
        (!term.is_empty()).then_some(term)
    }
}

impl Default for EnglishNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer for EnglishNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let cleaned = RE_ENTITY.replace_all(&lowered, " ");
        cleaned
            .split(|c: char| c.is_whitespace() || matches!(c, '-' | '&' | ';'))
            .filter_map(|raw| self.reduce(raw))
            .collect()
    }
}

/// Lowercase and split on whitespace, trimming punctuation at word edges.
/// No stop words, no stemming.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceNormalizer;

impl Normalizer for WhitespaceNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|w| !w.is_empty())
            .collect()
    }
}
