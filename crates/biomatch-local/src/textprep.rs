//! Minimal, deterministic text normalization helpers.
//!
//! Bios and queries go through the same whitespace split + stopword filter so
//! their document strings are comparable after vectorization.

use biomatch_core::{Error, Result};
use std::collections::BTreeSet;
use std::path::Path;

/// NLTK's English stopword list.
const ENGLISH: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// A fixed set of words dropped from token lists. Matching is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwords {
    words: BTreeSet<String>,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::english()
    }
}

impl Stopwords {
    pub fn english() -> Self {
        ENGLISH.iter().copied().collect()
    }

    pub fn empty() -> Self {
        Self {
            words: BTreeSet::new(),
        }
    }

    /// One word per line; blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .collect()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Stopwords(format!("{}: {e}", path.display())))?;
        Ok(Self::parse(&text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Stopwords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Bio paragraph normalization: trimmed and lower-cased.
pub fn normalize_paragraph(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Whitespace-split every paragraph, flatten in order, drop stopwords.
///
/// Duplicates are kept: the result is a frequency-bearing bag.
pub fn tokenize_paragraphs<S: AsRef<str>>(paragraphs: &[S], stopwords: &Stopwords) -> Vec<String> {
    paragraphs
        .iter()
        .flat_map(|p| p.as_ref().split_whitespace())
        .filter(|w| !stopwords.contains(w))
        .map(str::to_string)
        .collect()
}

/// Query normalization: lower-case, split, filter, rejoin with single spaces.
pub fn normalize_query(query: &str, stopwords: &Stopwords) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !stopwords.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}
