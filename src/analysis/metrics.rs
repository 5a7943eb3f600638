//! Line-based quality metrics.

use serde::Serialize;

use super::language::{Language, count};

pub const LONG_LINE_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub functions: usize,
    pub classes: usize,
    pub imports: usize,
}

impl Overview {
    pub fn of(code: &str, language: Language) -> Self {
        let p = language.patterns();
        Self {
            functions: count(&p.functions, code),
            classes: count(&p.classes, code),
            imports: count(&p.imports, code),
        }
    }

    /// "3 functions, 1 classes"; empty when nothing was found.
    pub fn constructs(&self) -> Vec<String> {
        [
            (self.functions, "functions"),
            (self.classes, "classes"),
            (self.imports, "imports"),
        ]
        .into_iter()
        .filter(|(n, _)| *n > 0)
        .map(|(n, label)| format!("{} {}", n, label))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Percentages of total lines.
    pub comment_ratio: f64,
    pub code_density: f64,
    pub avg_line_length: f64,
    pub long_lines: usize,
    pub branch_count: usize,
    pub complexity: Level,
    pub maintainability_score: u32,
    pub maintainability: Level,
    pub cyclomatic: usize,
}

impl Metrics {
    pub fn of(code: &str, language: Language) -> Self {
        let lines: Vec<&str> = code.lines().collect();
        let total = lines.len();
        let denominator = total.max(1) as f64;

        let blank_lines = lines.iter().filter(|l| l.trim().is_empty()).count();
        let comment_lines = lines
            .iter()
            .filter(|l| !l.trim().is_empty() && language.is_comment(l))
            .count();
        let code_lines = total - blank_lines - comment_lines;

        let char_total: usize = lines.iter().map(|l| l.chars().count()).sum();
        let avg_line_length = char_total as f64 / denominator;
        let long_lines = lines
            .iter()
            .filter(|l| l.chars().count() > LONG_LINE_CHARS)
            .count();

        let comment_ratio = comment_lines as f64 / denominator * 100.0;
        let patterns = language.patterns();
        let branch_count = count(&patterns.branches, code);

        let mut score: u32 = 100;
        if avg_line_length > 80.0 {
            score -= 20;
        }
        if long_lines as f64 > total as f64 * 0.1 {
            score -= 15;
        }
        if comment_ratio < 10.0 {
            score -= 10;
        }

        Self {
            total_lines: total,
            code_lines,
            comment_lines,
            blank_lines,
            comment_ratio,
            code_density: (total - blank_lines) as f64 / denominator * 100.0,
            avg_line_length,
            long_lines,
            branch_count,
            complexity: complexity_bucket(branch_count),
            maintainability_score: score,
            maintainability: maintainability_level(score),
            cyclomatic: 1 + count(&patterns.decisions, code),
        }
    }
}

pub fn complexity_bucket(branches: usize) -> Level {
    match branches {
        0..5 => Level::Low,
        5..15 => Level::Medium,
        _ => Level::High,
    }
}

pub fn maintainability_level(score: u32) -> Level {
    if score > 80 {
        Level::High
    } else if score > 60 {
        Level::Medium
    } else {
        Level::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"import os
# compute things
def add(a, b):
    if a > b:
        return a + b

class Box:
    pass
"#;

    #[test]
    fn overview_counts_constructs() {
        let overview = Overview::of(SAMPLE, Language::Python);
        assert_eq!(overview.functions, 1);
        assert_eq!(overview.classes, 1);
        assert_eq!(overview.imports, 1);
        assert_eq!(
            overview.constructs(),
            vec!["1 functions", "1 classes", "1 imports"]
        );
    }

    #[test]
    fn metrics_split_lines() {
        let m = Metrics::of(SAMPLE, Language::Python);
        assert_eq!(m.total_lines, 7);
        assert_eq!(m.blank_lines, 1);
        assert_eq!(m.comment_lines, 1);
        assert_eq!(m.code_lines, 5);
        assert_eq!(m.complexity, Level::Low);
        // 1 comment out of 7 lines is above 10%
        assert_eq!(m.maintainability_score, 100);
        assert_eq!(m.maintainability, Level::High);
        assert_eq!(m.cyclomatic, 2);
    }

    #[test]
    fn uncommented_long_lines_lower_maintainability() {
        let line = format!("x = \"{}\"\n", "a".repeat(120));
        let code = line.repeat(3);
        let m = Metrics::of(&code, Language::Python);
        assert_eq!(m.long_lines, 3);
        assert_eq!(m.maintainability_score, 55);
        assert_eq!(m.maintainability, Level::Low);
    }

    #[test]
    fn complexity_buckets() {
        assert_eq!(complexity_bucket(4), Level::Low);
        assert_eq!(complexity_bucket(5), Level::Medium);
        assert_eq!(complexity_bucket(15), Level::High);
    }

    #[test]
    fn empty_code_has_zero_ratios() {
        let m = Metrics::of("", Language::Rust);
        assert_eq!(m.total_lines, 0);
        assert_eq!(m.comment_ratio, 0.0);
        assert_eq!(m.cyclomatic, 1);
    }
}
