//! Tokenization and the derived search vector
//!
//! Documents and queries share one tokenizer: Unicode word segmentation,
//! lowercasing, removal of common English stop words and Snowball English
//! stemming. A document's [`TokenVector`] maps each stemmed term to the
//! 1-based positions it occurs at.

use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use unicode_segmentation::UnicodeSegmentation;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me",
    "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only",
    "or", "other", "our", "ours", "ourselves", "out", "over", "own", "s", "same", "she", "should",
    "so", "some", "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who", "whom",
    "why", "will", "with", "you", "your", "yours", "yourself", "yourselves",
];

fn is_stop_word(term: &str) -> bool {
    STOP_WORDS.binary_search(&term).is_ok()
}

/// Split text into stemmed terms, in order, stop words removed
pub fn tokenize(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    text.unicode_words()
        .map(|w| w.to_lowercase())
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .filter(|w| !is_stop_word(w))
        .map(|w| stemmer.stem(&w).into_owned())
        .collect()
}

/// Distinct query terms in first-occurrence order
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in tokenize(query) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Searchable representation of a document: term -> positions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenVector {
    terms: BTreeMap<String, Vec<u32>>,
}

impl TokenVector {
    /// Build the vector for a document's text
    pub fn from_text(text: &str) -> Self {
        let mut terms: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (i, term) in tokenize(text).into_iter().enumerate() {
            terms.entry(term).or_default().push(i as u32 + 1);
        }
        Self { terms }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of distinct terms
    pub fn distinct_terms(&self) -> usize {
        self.terms.len()
    }

    /// Total number of indexed tokens
    pub fn token_count(&self) -> usize {
        self.terms.values().map(Vec::len).sum()
    }

    /// How often a term occurs
    pub fn frequency(&self, term: &str) -> usize {
        self.terms.get(term).map_or(0, Vec::len)
    }

    /// Iterate `(term, frequency)` pairs in term order
    pub fn frequencies(&self) -> impl Iterator<Item = (&str, usize)> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p.len()))
    }

    /// Render in the stored `'term':1,4` form used for display
    pub fn to_display_string(&self) -> String {
        self.terms
            .iter()
            .map(|(term, positions)| {
                let pos = positions
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                format!("'{}':{}", term, pos)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_sorted() {
        let mut sorted = STOP_WORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOP_WORDS);
    }

    #[test]
    fn test_tokenize() {
        let terms = tokenize("SEO means Search-Engine optimization, and the results are great!");
        assert_eq!(
            terms,
            vec!["seo", "mean", "search", "engin", "optim", "result", "great"]
        );
    }

    #[test]
    fn test_inflections_share_a_stem() {
        assert_eq!(tokenize("optimize engines"), tokenize("optimization engine"));
        assert_eq!(tokenize("searching"), tokenize("search"));
        assert_eq!(query_terms("Ranking ranked ranks"), vec!["rank"]);
    }

    #[test]
    fn test_query_terms_dedupe_and_operators() {
        assert_eq!(query_terms("seo & SEO | ranking"), vec!["seo", "rank"]);
        assert!(query_terms("the of and").is_empty());
        assert!(query_terms("  & | ").is_empty());
    }

    #[test]
    fn test_token_vector() {
        let vector = TokenVector::from_text("Rust is fast. Rust is solid.");
        assert_eq!(vector.frequency("rust"), 2);
        assert_eq!(vector.frequency("is"), 0);
        assert_eq!(vector.token_count(), 4);
        assert_eq!(vector.distinct_terms(), 3);
        assert_eq!(vector.to_display_string(), "'fast':2 'rust':1,3 'solid':4");
    }

    #[test]
    fn test_empty_text() {
        let vector = TokenVector::from_text("");
        assert!(vector.is_empty());
        assert_eq!(vector.token_count(), 0);
    }

    #[test]
    fn test_json_shape() {
        let vector = TokenVector::from_text("alpha beta alpha");
        let json = serde_json::to_string(&vector).unwrap();
        assert_eq!(json, r#"{"alpha":[1,3],"beta":[2]}"#);
        let back: TokenVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vector);
    }
}
