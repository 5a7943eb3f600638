//! Category weights, importance heuristics and concept-set relevance.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// Category used when a caller passes an unknown or empty name.
pub const DEFAULT_CATEGORY: &str = "note";

/// (category, base weight) in descending weight order.
pub const CATEGORIES: &[(&str, f64)] = &[
    ("insight", 0.95),
    ("decision", 0.90),
    ("pattern", 0.85),
    ("solution", 0.80),
    ("architecture", 0.75),
    ("learning", 0.70),
    ("context", 0.60),
    ("fact", 0.50),
    ("note", 0.40),
    ("temp", 0.20),
];

const TECHNICAL_INDICATORS: &[&str] = &[
    "error",
    "bug",
    "fix",
    "solution",
    "optimize",
    "performance",
    "architecture",
    "design",
    "pattern",
    "algorithm",
    "implementation",
    "debug",
    "issue",
    "problem",
    "resolve",
    "discovered",
    "learned",
];

const INSIGHT_INDICATORS: &[&str] = &[
    "decided",
    "realized",
    "understood",
    "insight",
    "breakthrough",
    "important",
    "critical",
    "key",
    "significant",
    "major",
];

const HIGH_VALUE_TAGS: &[&str] = &["critical", "important", "breakthrough", "architecture", "security"];

/// Base weight of a category, if it is known.
pub fn category_weight(category: &str) -> Option<f64> {
    CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, weight)| *weight)
}

/// Normalize a requested category: trimmed, lowercased, unknown -> `note`.
pub fn normalize_category(category: Option<&str>) -> String {
    let requested = category.unwrap_or_default().trim().to_lowercase();
    if category_weight(&requested).is_some() {
        requested
    } else {
        if !requested.is_empty() {
            tracing::warn!(category = %requested, "Unknown memory category, using note");
        }
        DEFAULT_CATEGORY.to_string()
    }
}

/// Heuristic importance in `0.0..=1.0`.
pub fn calculate_importance(content: &str, category: &str, tags: &[String]) -> f64 {
    let base = category_weight(category).unwrap_or(0.4);
    let lower = content.to_lowercase();

    let length_bonus = (content.chars().count() as f64 / 500.0).min(0.15);

    let technical = TECHNICAL_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count() as f64;
    let technical_bonus = (technical * 0.05).min(0.25);

    let insight = INSIGHT_INDICATORS
        .iter()
        .filter(|indicator| lower.contains(*indicator))
        .count() as f64;
    let insight_bonus = (insight * 0.08).min(0.20);

    let valuable_tags = tags
        .iter()
        .filter(|tag| HIGH_VALUE_TAGS.contains(&tag.to_lowercase().as_str()))
        .count() as f64;
    let tag_bonus = (valuable_tags * 0.1).min(0.15);

    (base + length_bonus + technical_bonus + insight_bonus + tag_bonus).min(1.0)
}

/// Clamp a caller supplied importance; NaN is treated as absent.
pub fn clamp_importance(importance: f64) -> Option<f64> {
    if importance.is_nan() {
        None
    } else {
        Some(importance.clamp(0.0, 1.0))
    }
}

/// Jaccard similarity of two concept lists, compared case-insensitively.
pub fn relevance(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let left: HashSet<String> = a.iter().map(|c| c.to_lowercase()).collect();
    let right: HashSet<String> = b.iter().map(|c| c.to_lowercase()).collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// First 16 hex chars of the SHA-256 of the content.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

/// `{category}_{unix_ts}_{hash8}`
pub fn default_key(category: &str, unix_ts: i64, hash: &str) -> String {
    let short: String = hash.chars().take(8).collect();
    format!("{}_{}_{}", category, unix_ts, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn known_categories_keep_their_name() {
        assert_eq!(normalize_category(Some("Insight")), "insight");
        assert_eq!(normalize_category(Some(" temp ")), "temp");
    }

    #[test]
    fn unknown_categories_fall_back_to_note() {
        assert_eq!(normalize_category(Some("gossip")), "note");
        assert_eq!(normalize_category(None), "note");
    }

    #[test]
    fn importance_starts_at_category_weight() {
        let importance = calculate_importance("x", "temp", &[]);
        assert!((importance - (0.20 + 1.0 / 500.0)).abs() < 1e-9);
    }

    #[test]
    fn importance_adds_indicator_and_tag_bonuses() {
        let plain = calculate_importance("short note", "note", &[]);
        let rich = calculate_importance(
            "Realized the bug fix was a critical performance issue",
            "note",
            &strings(&["security"]),
        );
        assert!(rich > plain);
        // fix, bug, performance, issue -> 0.20; realized, critical -> 0.16; security -> 0.10
        let expected: f64 = 0.40 + (53.0 / 500.0) + 0.20 + 0.16 + 0.10;
        assert!((rich - expected.min(1.0)).abs() < 1e-9);
    }

    #[test]
    fn importance_is_capped_at_one() {
        let content = "insight breakthrough critical important decided realized error bug fix \
                       solution optimize performance architecture design pattern "
            .repeat(10);
        let importance = calculate_importance(
            &content,
            "insight",
            &strings(&["critical", "important", "security"]),
        );
        assert_eq!(importance, 1.0);
    }

    #[test]
    fn clamp_handles_out_of_range_and_nan() {
        assert_eq!(clamp_importance(1.7), Some(1.0));
        assert_eq!(clamp_importance(-0.2), Some(0.0));
        assert_eq!(clamp_importance(f64::NAN), None);
    }

    #[test]
    fn relevance_is_jaccard() {
        let a = strings(&["tokio", "async", "runtime"]);
        let b = strings(&["Tokio", "runtime", "threads", "pool"]);
        assert!((relevance(&a, &b) - 2.0 / 5.0).abs() < 1e-9);
        assert_eq!(relevance(&a, &[]), 0.0);
        assert_eq!(relevance(&a, &a), 1.0);
    }

    #[test]
    fn hash_and_key_shapes() {
        let hash = content_hash("hello");
        assert_eq!(hash, "2cf24dba5fb0a30e");
        assert_eq!(default_key("insight", 1700000000, &hash), "insight_1700000000_2cf24dba");
    }
}
