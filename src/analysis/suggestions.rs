//! Targeted improvement suggestions with before/after snippets.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::error::AnalysisError;
use super::language::{Language, count};
use super::metrics::LONG_LINE_CHARS;
use super::review::{MAX_PARAMS, functions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FocusArea {
    #[default]
    All,
    Performance,
    Security,
    Readability,
    Maintainability,
}

impl FocusArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusArea::All => "all",
            FocusArea::Performance => "performance",
            FocusArea::Security => "security",
            FocusArea::Readability => "readability",
            FocusArea::Maintainability => "maintainability",
        }
    }

    fn covers(&self, category: Category) -> bool {
        matches!(
            (self, category),
            (FocusArea::All, _)
                | (FocusArea::Performance, Category::Performance)
                | (FocusArea::Security, Category::Security)
                | (FocusArea::Readability, Category::Readability)
                | (FocusArea::Maintainability, Category::Maintainability)
        )
    }
}

impl FromStr for FocusArea {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(FocusArea::All),
            "performance" => Ok(FocusArea::Performance),
            "security" => Ok(FocusArea::Security),
            "readability" => Ok(FocusArea::Readability),
            "maintainability" => Ok(FocusArea::Maintainability),
            other => Err(AnalysisError::InvalidInput {
                message: format!("unknown focus area '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Beginner => "beginner",
            SkillLevel::Intermediate => "intermediate",
            SkillLevel::Advanced => "advanced",
        }
    }

    pub fn recommendations(&self) -> [&'static str; 3] {
        match self {
            SkillLevel::Beginner => [
                "Focus on readability and clear variable naming",
                "Add comments to explain complex logic",
                "Use built-in functions when available",
            ],
            SkillLevel::Intermediate => [
                "Consider design patterns for better structure",
                "Implement error handling and validation",
                "Optimize for performance where needed",
            ],
            SkillLevel::Advanced => [
                "Apply advanced optimization techniques",
                "Consider architectural patterns",
                "Implement comprehensive testing strategies",
            ],
        }
    }
}

impl FromStr for SkillLevel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(SkillLevel::Beginner),
            "" | "intermediate" => Ok(SkillLevel::Intermediate),
            "advanced" => Ok(SkillLevel::Advanced),
            other => Err(AnalysisError::InvalidInput {
                message: format!("unknown skill level '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Category {
    Performance,
    Security,
    Readability,
    Maintainability,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Performance,
        Category::Security,
        Category::Readability,
        Category::Maintainability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Performance => "Performance",
            Category::Security => "Security",
            Category::Readability => "Readability",
            Category::Maintainability => "Maintainability",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Impact {
    Low,
    Medium,
    High,
    Critical,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "Low",
            Impact::Medium => "Medium",
            Impact::High => "High",
            Impact::Critical => "Critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub category: Category,
    pub title: String,
    pub description: &'static str,
    pub current: Option<&'static str>,
    pub improved: Option<&'static str>,
    pub explanation: &'static str,
    pub impact: Impact,
}

static APPEND_LOOP: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"for\s+\w+\s+in[^:\n]*:\s*\n?\s*\w+\.append\(").ok());
static STRING_CONCAT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"\w+\s*\+=\s*(?:["'f]|str\()"#).ok());
static MAGIC_NUMBER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[=<>]\s*\d{3,}\b").ok());

fn performance(code: &str, language: Language) -> Vec<Suggestion> {
    let mut out = Vec::new();
    if language == Language::Python && count(&APPEND_LOOP, code) > 0 {
        out.push(Suggestion {
            category: Category::Performance,
            title: "Use List Comprehension".to_string(),
            description: "Replace append loop with list comprehension",
            current: Some("for item in items:\n    result.append(transform(item))"),
            improved: Some("result = [transform(item) for item in items]"),
            explanation: "List comprehensions avoid repeated method lookups and read as one expression",
            impact: Impact::Medium,
        });
    }
    if count(&STRING_CONCAT, code) > 0 {
        out.push(Suggestion {
            category: Category::Performance,
            title: "Optimize String Concatenation".to_string(),
            description: "Build strings with join() or a buffer instead of repeated +=",
            current: None,
            improved: None,
            explanation: "Repeated concatenation copies the string on every step",
            impact: Impact::High,
        });
    }
    if language == Language::Python && code.contains("range(len(") {
        out.push(Suggestion {
            category: Category::Performance,
            title: "Iterate Directly".to_string(),
            description: "Use enumerate() rather than indexing through range(len())",
            current: Some("for i in range(len(items)):\n    print(i, items[i])"),
            improved: Some("for i, item in enumerate(items):\n    print(i, item)"),
            explanation: "Direct iteration skips the index lookups",
            impact: Impact::Low,
        });
    }
    out
}

fn security(code: &str, language: Language) -> Vec<Suggestion> {
    let mut out = Vec::new();
    if code.contains("eval(") {
        let (current, improved) = match language {
            Language::JavaScript => (
                "const value = eval(userInput);",
                "const value = JSON.parse(userInput);",
            ),
            _ => (
                "result = eval(user_input)",
                "import ast\nresult = ast.literal_eval(user_input)",
            ),
        };
        out.push(Suggestion {
            category: Category::Security,
            title: "Avoid eval() Function".to_string(),
            description: "Replace eval() with a data-only parser",
            current: Some(current),
            improved: Some(improved),
            explanation: "eval() executes arbitrary code supplied at runtime",
            impact: Impact::Critical,
        });
    }
    if language == Language::Python && code.contains("shell=True") {
        out.push(Suggestion {
            category: Category::Security,
            title: "Drop shell=True".to_string(),
            description: "Pass subprocess arguments as a list",
            current: Some("subprocess.run(f\"ls {path}\", shell=True)"),
            improved: Some("subprocess.run([\"ls\", path])"),
            explanation: "A shell interprets metacharacters in interpolated input",
            impact: Impact::High,
        });
    }
    if language == Language::JavaScript && code.contains("innerHTML") {
        out.push(Suggestion {
            category: Category::Security,
            title: "Prefer textContent".to_string(),
            description: "Avoid assigning untrusted strings to innerHTML",
            current: Some("el.innerHTML = message;"),
            improved: Some("el.textContent = message;"),
            explanation: "innerHTML parses markup and runs inline handlers",
            impact: Impact::High,
        });
    }
    out
}

fn readability(code: &str, _language: Language) -> Vec<Suggestion> {
    let mut out = Vec::new();
    if code.lines().any(|l| l.chars().count() > LONG_LINE_CHARS) {
        out.push(Suggestion {
            category: Category::Readability,
            title: "Break Long Lines".to_string(),
            description: "Keep lines under 80-100 characters",
            current: None,
            improved: None,
            explanation: "Short lines can be read without horizontal scrolling",
            impact: Impact::Medium,
        });
    }
    if count(&MAGIC_NUMBER, code) > 0 {
        out.push(Suggestion {
            category: Category::Readability,
            title: "Name Magic Numbers".to_string(),
            description: "Move literal thresholds into named constants",
            current: None,
            improved: None,
            explanation: "A name documents what the number means",
            impact: Impact::Low,
        });
    }
    out
}

fn maintainability(code: &str, language: Language) -> Vec<Suggestion> {
    let branches = &language.patterns().branches;
    let sigs = functions(code, language);
    let mut out = Vec::new();
    for (i, f) in sigs.iter().enumerate() {
        // body runs to the next definition
        let start = line_offset(code, f.line);
        let end = sigs
            .get(i + 1)
            .map(|next| line_offset(code, next.line))
            .unwrap_or(code.len());
        if count(branches, &code[start..end]) > 5 {
            out.push(Suggestion {
                category: Category::Maintainability,
                title: format!("Simplify Function: {}", f.name),
                description: "Break down the function into smaller functions",
                current: None,
                improved: None,
                explanation: "Smaller functions are easier to test and maintain",
                impact: Impact::High,
            });
        }
        if f.params > MAX_PARAMS {
            out.push(Suggestion {
                category: Category::Maintainability,
                title: format!("Reduce Parameters: {}", f.name),
                description: "Group related parameters into a struct or config object",
                current: None,
                improved: None,
                explanation: "Long parameter lists are easy to call in the wrong order",
                impact: Impact::Medium,
            });
        }
    }
    out
}

fn line_offset(code: &str, line: usize) -> usize {
    if line <= 1 {
        return 0;
    }
    code.match_indices('\n')
        .nth(line - 2)
        .map(|(i, _)| i + 1)
        .unwrap_or(code.len())
}

/// Suggestions for `focus`, dropping low-impact items for advanced users.
pub fn targeted(
    code: &str,
    language: Language,
    focus: FocusArea,
    skill: SkillLevel,
) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for category in Category::ALL {
        if !focus.covers(category) {
            continue;
        }
        out.extend(match category {
            Category::Performance => performance(code, language),
            Category::Security => security(code, language),
            Category::Readability => readability(code, language),
            Category::Maintainability => maintainability(code, language),
        });
    }
    if skill == SkillLevel::Advanced {
        out.retain(|s| s.impact > Impact::Low);
    }
    out
}
