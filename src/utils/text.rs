use sha2::{Digest, Sha256};
use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Lowercase, strip punctuation, collapse whitespace and drop stopwords.
/// Comparison form for duplicate detection; never shown to a reviewer.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Jaccard similarity over the word sets of two normalized strings.
pub fn jaccard(a: &str, b: &str) -> f64 {
    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();

    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();
    intersection as f64 / union as f64
}

/// SHA-256 hex digest of a normalized response, for the exact-duplicate check.
pub fn response_hash(normalized: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

/// 3-4 word phrases longer than 10 chars, used for cross-response phrase reuse.
pub fn extract_phrases(text: &str) -> HashSet<String> {
    let words: Vec<String> = text.to_lowercase().split_whitespace().map(String::from).collect();
    let mut phrases = HashSet::new();

    for i in 0..words.len() {
        for len in 3..=4 {
            if i + len > words.len() {
                break;
            }
            let phrase = words[i..i + len].join(" ");
            if phrase.len() > 10 {
                phrases.insert(phrase);
            }
        }
    }

    phrases
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Word counts of the non-empty sentences, split on '.'.
pub fn sentence_lengths(text: &str) -> Vec<usize> {
    text.split('.')
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.split_whitespace().count())
        .collect()
}

/// Crude complexity: 0.3 * avg word length + 0.3 * avg sentence length
/// + 0.4 * (type-token ratio * 10), capped at 10.
pub fn complexity_score(text: &str) -> f64 {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }

    let avg_word_length =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;

    let sentence_count = sentence_lengths(text).len().max(1);
    let avg_sentence_length = words.len() as f64 / sentence_count as f64;

    let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let vocabulary_diversity = unique.len() as f64 / words.len() as f64;

    let score =
        avg_word_length * 0.3 + avg_sentence_length * 0.3 + vocabulary_diversity * 10.0 * 0.4;
    score.min(10.0)
}
