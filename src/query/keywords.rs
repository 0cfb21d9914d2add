//! Keyword extraction for board statistics.
//!
//! Extraction is behind the [`KeywordExtractor`] trait so the stats
//! endpoint can swap strategies. [`TitleKeywords`] is the default: it
//! counts salient title words across the board and reports the most
//! frequent ones.

use std::cmp::Reverse;
use std::collections::HashMap;

use unicode_segmentation::UnicodeSegmentation;

use crate::models::Post;

/// Derives a list of salient terms from a set of posts.
pub trait KeywordExtractor: Send + Sync {
    /// Extract keywords, most salient first. Must be deterministic.
    fn extract(&self, posts: &[Post]) -> Vec<String>;
}

/// Configuration for title keyword extraction.
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    /// Minimum token length in characters (default: 3)
    pub min_token_length: usize,
    /// Maximum keywords returned (default: 10)
    pub limit: usize,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            min_token_length: 3,
            limit: 10,
        }
    }
}

/// Frequency-ranked keywords from post titles.
#[derive(Debug, Clone, Default)]
pub struct TitleKeywords {
    config: KeywordConfig,
}

impl TitleKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: KeywordConfig) -> Self {
        Self { config }
    }

    /// Tokenize a title into normalized keywords.
    fn tokenize<'a>(&self, normalized: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let min_len = self.config.min_token_length;
        normalized
            .unicode_words()
            .filter(move |word| word.chars().count() >= min_len)
            .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
            .filter(|word| !is_stopword(word))
    }
}

impl KeywordExtractor for TitleKeywords {
    fn extract(&self, posts: &[Post]) -> Vec<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for post in posts {
            let normalized = post.title.to_lowercase();
            for token in self.tokenize(&normalized) {
                *counts.entry(token.to_string()).or_default() += 1;
            }
        }

        let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
        ranked.sort_by(|(a_word, a_count), (b_word, b_count)| {
            Reverse(a_count)
                .cmp(&Reverse(b_count))
                .then_with(|| a_word.cmp(b_word))
        });

        ranked
            .into_iter()
            .take(self.config.limit)
            .map(|(word, _)| word)
            .collect()
    }
}

/// Check if a word is a common English stopword.
fn is_stopword(word: &str) -> bool {
    const STOPWORDS: &[&str] = &[
        "the", "and", "are", "was", "were", "been", "being", "have", "has", "had", "does", "did",
        "will", "would", "could", "should", "may", "might", "can", "must", "shall", "for", "with",
        "from", "but", "then", "than", "that", "this", "these", "those", "when", "what", "who",
        "how", "why", "where", "your", "you", "our", "their", "they", "them", "its", "his", "her",
        "not", "all", "just", "into", "out", "about", "after", "before", "again", "get", "got",
        // Common URL/HTML artifacts
        "http", "https", "www", "com", "html", "php",
    ];
    STOPWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(titles: &[&str]) -> Vec<Post> {
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| Post {
                id: i as i64,
                title: title.to_string(),
                ..Post::default()
            })
            .collect()
    }

    #[test]
    fn test_empty_board_has_no_keywords() {
        assert!(TitleKeywords::new().extract(&[]).is_empty());
    }

    #[test]
    fn test_ranked_by_frequency_then_alphabet() {
        let posts = titled(&[
            "When the deploy fails",
            "Deploy on Friday",
            "When the tests pass on Friday",
            "Deploy rollback",
        ]);
        let keywords = TitleKeywords::new().extract(&posts);
        assert_eq!(keywords[0], "deploy");
        assert_eq!(keywords[1], "friday");
        // Remaining singletons in alphabetical order
        assert_eq!(&keywords[2..], &["fails", "pass", "rollback", "tests"]);
    }

    #[test]
    fn test_stopwords_short_tokens_and_numbers_dropped() {
        let posts = titled(&["The 2024 DB is on fire and we can't fix it"]);
        let keywords = TitleKeywords::new().extract(&posts);
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"2024".to_string()));
        assert!(!keywords.contains(&"db".to_string()));
        assert!(keywords.contains(&"fire".to_string()));
        assert!(keywords.contains(&"fix".to_string()));
    }

    #[test]
    fn test_limit() {
        let posts = titled(&["alpha bravo charlie delta echo foxtrot"]);
        let extractor = TitleKeywords::with_config(KeywordConfig {
            min_token_length: 3,
            limit: 2,
        });
        assert_eq!(extractor.extract(&posts), vec!["alpha", "bravo"]);
    }
}
