//! Concept extraction from free text.
//!
//! Concepts are the unit of retrieval for the memory store: every memory
//! carries the concepts of its content, queries are reduced to concepts, and
//! relevance is set overlap between the two.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Upper bound on concepts kept per text.
pub const MAX_CONCEPTS: usize = 25;

const STOPWORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "this", "that",
    "is", "are", "was", "were",
];

/// Fillers that disqualify a two-word phrase.
const PHRASE_FILLERS: &[&str] = &["the ", "and ", "but ", "for ", "with "];

/// (pattern, capture group holding the concept; 0 = whole match)
///
/// All patterns are case-insensitive, so the technical-term alternation
/// also picks up ordinary words of two or more letters.
static PATTERNS: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
    [
        // technical terms: camelCase, snake_case, UPPER_CASE
        (
            r"(?i)\b[a-zA-Z]+[A-Z][a-zA-Z]*\b|\b[a-z]+_[a-z_]+\b|\b[A-Z_]{2,}\b",
            0,
        ),
        // file paths
        (
            r"(?i)\b[\w/\\.-]+\.(?:py|js|ts|rs|go|json|md|txt|yml|yaml|toml|cfg|html|css)\b",
            0,
        ),
        // function names followed by a call paren
        (r"(?i)\b([a-z_][a-z0-9_]*)\s*\(", 1),
        // quoted terms
        (r#"(?i)["']([^"']{3,30})["']"#, 1),
        // urls
        (r"(?i)https?://[^\s]+", 0),
        // inline code spans
        (r"`([^`]+)`", 1),
        // shell variables and assignments
        (r"(?i)\$[a-zA-Z_][a-zA-Z0-9_]*|\b[a-z_][a-z0-9_]*\s*[=:]", 0),
    ]
    .into_iter()
    .filter_map(|(pattern, group)| Regex::new(pattern).ok().map(|re| (re, group)))
    .collect()
});

static WORDS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[a-zA-Z]{3,}\b").ok());

fn keep(concept: &str) -> bool {
    concept.chars().count() >= 3
        && !STOPWORDS.contains(&concept)
        && !concept.chars().all(|c| c.is_ascii_digit())
        && concept.chars().collect::<HashSet<char>>().len() > 1
}

/// Extract lowercased, deduplicated concepts in first-seen order.
pub fn extract_concepts(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut raw: Vec<String> = Vec::new();

    for (re, group) in PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(*group) {
                raw.push(m.as_str().to_string());
            }
        }
    }

    if let Some(words_re) = WORDS.as_ref() {
        let words: Vec<&str> = words_re.find_iter(text).map(|m| m.as_str()).collect();
        for pair in words.windows(2) {
            let phrase = format!("{} {}", pair[0], pair[1]);
            let lower = phrase.to_lowercase();
            if phrase.len() > 6 && !PHRASE_FILLERS.iter().any(|f| lower.contains(f)) {
                raw.push(phrase);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut concepts = Vec::new();
    for candidate in raw {
        let concept = candidate
            .trim()
            .trim_end_matches(['=', ':'])
            .trim()
            .to_lowercase();
        if keep(&concept) && seen.insert(concept.clone()) {
            concepts.push(concept);
            if concepts.len() == MAX_CONCEPTS {
                break;
            }
        }
    }

    concepts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_concepts() {
        assert!(extract_concepts("").is_empty());
        assert!(extract_concepts("   \n").is_empty());
    }

    #[test]
    fn extracts_identifiers_and_paths() {
        let concepts = extract_concepts("Call parse_config() in src/config.rs before startServer");
        assert!(concepts.contains(&"parse_config".to_string()));
        assert!(concepts.contains(&"src/config.rs".to_string()));
        assert!(concepts.contains(&"startserver".to_string()));
    }

    #[test]
    fn extracts_quoted_terms_and_code_spans() {
        let concepts = extract_concepts("Use `cargo nextest` with the 'retry budget' option");
        assert!(concepts.contains(&"cargo nextest".to_string()));
        assert!(concepts.contains(&"retry budget".to_string()));
    }

    #[test]
    fn assignments_lose_their_operator() {
        let concepts = extract_concepts("timeout = 30 and $HOME_DIR");
        assert!(concepts.contains(&"timeout".to_string()));
        assert!(concepts.contains(&"$home_dir".to_string()));
        assert!(!concepts.iter().any(|c| c.ends_with('=')));
    }

    #[test]
    fn filters_stopwords_digits_and_repeated_chars() {
        let concepts = extract_concepts("the 12345 aaa were this");
        assert!(!concepts.contains(&"the".to_string()));
        assert!(!concepts.contains(&"12345".to_string()));
        assert!(!concepts.contains(&"aaa".to_string()));
        assert!(!concepts.contains(&"were".to_string()));
    }

    #[test]
    fn phrases_skip_fillers() {
        let concepts = extract_concepts("database migration with rollback");
        assert!(concepts.contains(&"database migration".to_string()));
        assert!(!concepts.iter().any(|c| c.contains("with ")));
    }

    #[test]
    fn concepts_are_deduplicated_case_insensitively() {
        let concepts = extract_concepts("Tokio tokio TOKIO");
        assert_eq!(concepts.iter().filter(|c| *c == "tokio").count(), 1);
    }

    #[test]
    fn concept_count_is_capped() {
        let text = (0u8..100)
            .map(|i| format!("zq{}{}", (b'a' + i / 26) as char, (b'a' + i % 26) as char))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(extract_concepts(&text).len(), MAX_CONCEPTS);
    }
}
