//! Keyword frequency extraction for the word-clouds

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Whole words of at least five ASCII letters
    static ref KEYWORD_PATTERN: Regex = Regex::new(r"\b[a-zA-Z]{5,}\b").unwrap();
}

/// Word to occurrence count, ordered by descending count.
///
/// Ties keep the order in which the words were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordFrequencies(IndexMap<String, usize>);

impl KeywordFrequencies {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<usize> {
        self.0.get(word).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(word, count)| (word.as_str(), *count))
    }

    /// Highest count in the mapping
    pub fn max_count(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }
}

impl FromIterator<(String, usize)> for KeywordFrequencies {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Count lower-cased words of five or more letters and keep the `limit`
/// most frequent.
///
/// No stop-word filtering is applied, so frequent long function words
/// ("their", "about", "which") show up like any other word.
pub fn extract_keywords(text: &str, limit: usize) -> KeywordFrequencies {
    let lowered = text.to_lowercase();

    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for m in KEYWORD_PATTERN.find_iter(&lowered) {
        *counts.entry(m.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // Stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);

    ranked
        .into_iter()
        .map(|(word, count)| (word.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_case_insensitively() {
        let keywords = extract_keywords("Apple apple BANANA banana banana", 30);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords.get("apple"), Some(2));
        assert_eq!(keywords.get("banana"), Some(3));

        let ordered: Vec<_> = keywords.iter().collect();
        assert_eq!(ordered, vec![("banana", 3), ("apple", 2)]);
    }

    #[test]
    fn test_short_words_ignored() {
        let keywords = extract_keywords("the cat sat on a mat with dogs", 30);
        assert!(keywords.is_empty());
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let keywords = extract_keywords("zebra alpha mango alpha zebra mango", 30);
        let ordered: Vec<_> = keywords.iter().map(|(w, _)| w).collect();
        assert_eq!(ordered, vec!["zebra", "alpha", "mango"]);
    }

    #[test]
    fn test_only_whole_ascii_words() {
        // Digits and underscores are word characters, so these are not whole words
        let keywords = extract_keywords("layer2norm deep_learning résumé models", 30);
        let words: Vec<_> = keywords.iter().map(|(w, _)| w).collect();
        assert_eq!(words, vec!["models"]);
    }

    #[test]
    fn test_limit_applied() {
        let text: String = (0..50)
            .map(|i| format!("word{} ", i))
            .chain((0..50).map(|i| {
                let letters: String = format!("{:02}", i)
                    .chars()
                    .map(|c| (b'a' + c.to_digit(10).unwrap_or(0) as u8) as char)
                    .collect();
                format!("token{} ", letters)
            }))
            .collect();
        let keywords = extract_keywords(&text, 30);
        assert_eq!(keywords.len(), 30);
    }

    #[test]
    fn test_max_count() {
        let keywords = extract_keywords("graph graph graph nodes", 30);
        assert_eq!(keywords.max_count(), 3);
        assert_eq!(KeywordFrequencies::default().max_count(), 0);
    }

    #[test]
    fn test_serializes_as_map() {
        let keywords = extract_keywords("Apple apple BANANA banana banana", 30);
        let json = serde_json::to_string(&keywords).unwrap();
        assert_eq!(json, r#"{"banana":3,"apple":2}"#);
    }
}
