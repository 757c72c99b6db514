//! Frequency-based keyword extraction for cluster labels.

use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z]{3,}").expect("valid regex"));

/// Generic English filler.
pub const BASE_STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "have", "has", "had", "was", "were",
    "are", "been", "but", "not", "you", "your", "they", "their", "them", "our", "out", "into",
    "about", "just", "very", "much", "more", "than", "also", "can", "will", "would", "could",
    "should", "one", "two", "three", "get", "got", "make", "made", "even", "still", "over",
    "well", "per", "each", "every", "across", "because", "while", "when", "where", "what",
    "who", "why", "how", "does", "did", "doing", "done", "other", "another", "such", "like",
    "some", "any", "all", "many", "most", "few", "new", "old",
];

/// Organisation names and HR nouns present in nearly every comment.
pub const DOMAIN_STOP_WORDS: &[&str] = &[
    "rio", "tinto", "riotinto", "company", "work", "working", "worked", "role", "job",
    "jobs", "people", "person", "team", "teams", "employee", "employees", "staff", "manager",
    "management", "business", "place", "industry", "site", "sites", "mine", "mines", "mining",
    "year", "years", "month", "months", "day", "days", "time", "times", "pros", "cons",
    "advice", "summary", "review", "reviews",
];

/// Counts alphabetic tokens of three or more letters outside a stop list.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stop_words: HashSet<String>,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            stop_words: BASE_STOP_WORDS
                .iter()
                .chain(DOMAIN_STOP_WORDS)
                .map(|w| w.to_string())
                .collect(),
        }
    }
}

impl KeywordExtractor {
    /// Default stop list plus extra exclusions (lower-cased).
    pub fn with_exclusions<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut extractor = Self::default();
        extractor
            .stop_words
            .extend(extra.into_iter().map(|w| w.as_ref().trim().to_lowercase()));
        extractor
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Token frequencies in first-seen order, most frequent first.
    pub fn counts<S: AsRef<str>>(&self, texts: &[S]) -> Vec<(String, usize)> {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for text in texts {
            let lower = text.as_ref().to_lowercase();
            for token in TOKEN.find_iter(&lower) {
                let token = token.as_str();
                if self.is_stop_word(token) {
                    continue;
                }
                *counts.entry(token.to_string()).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        // stable sort keeps first-seen order among equal counts
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    /// The `k` most frequent keywords.
    pub fn top<S: AsRef<str>>(&self, texts: &[S], k: usize) -> Vec<String> {
        self.counts(texts)
            .into_iter()
            .take(k)
            .map(|(word, _)| word)
            .collect()
    }
}
