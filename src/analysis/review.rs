//! Whole-file review: design and anti patterns, naming style, dependencies,
//! improvement suggestions and an overall assessment.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::language::{Language, count};
use super::metrics::{Level, Metrics, Overview};
use super::security::{self, RiskLevel, SecurityIssue};

/// Parameters beyond which a function is flagged.
pub const MAX_PARAMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Grade {
    Good,
    Fair,
    Poor,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::Good => "Good",
            Grade::Fair => "Fair",
            Grade::Poor => "Poor",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSig {
    pub name: String,
    pub params: usize,
    pub line: usize,
}

/// Named function definitions with their parameter counts. `self`
/// receivers are not counted.
pub fn functions(code: &str, language: Language) -> Vec<FunctionSig> {
    let Some(re) = &language.patterns().signatures else {
        return Vec::new();
    };
    re.captures_iter(code)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_string();
            let params = caps
                .get(2)
                .map(|p| {
                    p.as_str()
                        .split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .filter(|p| {
                            let p = p.trim_start_matches('&').trim_start_matches("mut ");
                            p != "self" && p != "cls" && !p.starts_with("self:")
                        })
                        .count()
                })
                .unwrap_or(0);
            Some(FunctionSig {
                name,
                params,
                line: code[..whole.start()].matches('\n').count() + 1,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Patterns {
    pub design: Vec<&'static str>,
    pub anti: Vec<&'static str>,
    pub naming: &'static str,
}

type Table = Vec<(Regex, &'static str)>;

fn table(entries: &[(&str, &'static str)]) -> Table {
    entries
        .iter()
        .filter_map(|(p, label)| Regex::new(p).ok().map(|re| (re, *label)))
        .collect()
}

static DESIGN: LazyLock<Table> = LazyLock::new(|| {
    table(&[
        (r"(?:class|struct)\s+\w*Factory\b|\bcreate_\w+\s*\(", "Factory Pattern"),
        (
            r"(?:class|struct)\s+\w*Singleton\b|__new__|getInstance\s*\(|\bOnceLock\b|sync\.Once\b",
            "Singleton Pattern",
        ),
        (
            r"(?:class|struct)\s+\w*Observer\b|(?i:\bnotify\w*\s*\()|\bsubscribe\s*\(|addEventListener",
            "Observer Pattern",
        ),
        (r"(?:class|struct)\s+\w*Builder\b|\.build\(\)", "Builder Pattern"),
        (r"(?m)^\s*@\w+", "Decorator Usage"),
    ])
});

static ANTI: LazyLock<Table> = LazyLock::new(|| {
    table(&[
        (r"(?m)\bif\b.*==\s*(?:True|true)\b", "Explicit comparison with True"),
        (r"catch\s*(?:\([^)]*\))?\s*\{\s*\}", "Empty catch block"),
    ])
});

static LANGUAGE_ANTI: LazyLock<Vec<(Language, Regex, &'static str)>> = LazyLock::new(|| {
    [
        (Language::Python, r"(?m)^\s*except\s*:", "Bare except clause"),
        (Language::Python, r"(?m)^\s*global\s+\w+", "Global variable usage"),
        (Language::JavaScript, r"(?m)^\s*var\s+\w+", "Function-scoped var declarations"),
        (Language::JavaScript, r"[^=!]==[^=]", "Loose equality comparison"),
        (Language::Rust, r"\.unwrap\(\)", "Unchecked unwrap() calls"),
        (Language::Go, r"_\s*=\s*err\b|,\s*_\s*:?=\s*\w+\(", "Ignored error values"),
    ]
    .into_iter()
    .filter_map(|(lang, p, label)| Regex::new(p).ok().map(|re| (lang, re, label)))
    .collect()
});

static SNAKE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\b[a-z]+_[a-z]+\b").ok());
static CAMEL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\b[a-z]+[A-Z][a-z]+\b").ok());

pub fn naming_style(code: &str, language: Language) -> &'static str {
    let snake = count(&SNAKE, code);
    let camel = count(&CAMEL, code);
    match snake.cmp(&camel) {
        _ if snake == 0 && camel == 0 => "Unknown",
        std::cmp::Ordering::Greater if language == Language::Python => "Snake Case (PEP 8)",
        std::cmp::Ordering::Greater => "Snake Case",
        std::cmp::Ordering::Less => "Camel Case",
        std::cmp::Ordering::Equal => "Mixed",
    }
}

pub fn patterns(code: &str, language: Language) -> Patterns {
    let design = DESIGN
        .iter()
        .filter(|(re, _)| re.is_match(code))
        .map(|(_, label)| *label)
        .collect();
    let mut anti: Vec<&'static str> = ANTI
        .iter()
        .filter(|(re, _)| re.is_match(code))
        .map(|(_, label)| *label)
        .collect();
    anti.extend(
        LANGUAGE_ANTI
            .iter()
            .filter(|(lang, re, _)| *lang == language && re.is_match(code))
            .map(|(_, _, label)| *label),
    );
    Patterns {
        design,
        anti,
        naming: naming_style(code, language),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependencies {
    pub imports: Vec<String>,
    pub stdlib: Vec<String>,
    pub external: Vec<String>,
}

/// Imported module names in first-seen order, split into standard library
/// and external.
pub fn dependencies(code: &str, language: Language) -> Dependencies {
    let mut deps = Dependencies::default();
    for re in &language.patterns().import_names {
        for caps in re.captures_iter(code) {
            if let Some(name) = caps.get(1).map(|m| m.as_str().to_string())
                && !deps.imports.contains(&name)
            {
                deps.imports.push(name);
            }
        }
    }
    for import in &deps.imports {
        if language.is_stdlib(import) {
            deps.stdlib.push(import.clone());
        } else {
            deps.external.push(import.clone());
        }
    }
    deps
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Improvements {
    pub performance: Vec<String>,
    pub security: Vec<String>,
    pub readability: Vec<String>,
    pub maintainability: Vec<String>,
}

impl Improvements {
    pub fn is_empty(&self) -> bool {
        self.performance.is_empty()
            && self.security.is_empty()
            && self.readability.is_empty()
            && self.maintainability.is_empty()
    }

    pub fn categories(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Performance", &self.performance),
            ("Security", &self.security),
            ("Readability", &self.readability),
            ("Maintainability", &self.maintainability),
        ]
    }
}

pub fn improvements(
    code: &str,
    language: Language,
    metrics: &Metrics,
    issues: &[SecurityIssue],
) -> Improvements {
    let mut out = Improvements::default();

    if language == Language::Python {
        if code.contains("for") && code.contains("range(len(") {
            out.performance
                .push("Consider using enumerate() instead of range(len())".to_string());
        }
        if code.contains("+=") && code.to_lowercase().contains("str") {
            out.performance
                .push("Consider using join() for string concatenation in loops".to_string());
        }
    }
    if language == Language::Rust && code.contains(".clone()") {
        out.performance
            .push("Check whether .clone() calls can borrow instead".to_string());
    }

    if !issues.is_empty() {
        out.security
            .push("Address security vulnerabilities found in analysis".to_string());
    }

    if metrics.long_lines > 0 {
        out.readability
            .push("Consider breaking long lines for better readability".to_string());
    }
    if metrics.comment_ratio < 10.0 {
        out.readability
            .push("Add more comments to explain complex logic".to_string());
    }

    if metrics.complexity == Level::High {
        out.maintainability
            .push("Consider breaking down complex functions".to_string());
    }
    for f in functions(code, language) {
        if f.params > MAX_PARAMS {
            out.maintainability.push(format!(
                "Function '{}' has many parameters, consider using a config object",
                f.name
            ));
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assessment {
    pub readability: Grade,
    pub maintainability: Level,
    pub complexity: Level,
    /// `None` when security was not scanned.
    pub security: Option<Grade>,
}

pub fn assess(metrics: &Metrics, issues: Option<&[SecurityIssue]>) -> Assessment {
    let readability = if metrics.comment_ratio > 15.0 {
        Grade::Good
    } else if metrics.comment_ratio > 5.0 {
        Grade::Fair
    } else {
        Grade::Poor
    };
    Assessment {
        readability,
        maintainability: metrics.maintainability,
        complexity: metrics.complexity,
        security: issues.map(|issues| match issues.len() {
            0 => Grade::Good,
            1 | 2 => Grade::Fair,
            _ => Grade::Poor,
        }),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SecurityScan {
    pub issues: Vec<SecurityIssue>,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodeAnalysis {
    pub language: Language,
    pub characters: usize,
    pub overview: Overview,
    pub metrics: Option<Metrics>,
    pub security: Option<SecurityScan>,
    pub patterns: Patterns,
    pub dependencies: Dependencies,
    pub suggestions: Option<Improvements>,
    pub assessment: Assessment,
}

pub fn analyze(
    code: &str,
    language: Language,
    include_security: bool,
    include_metrics: bool,
    include_suggestions: bool,
) -> CodeAnalysis {
    let metrics = Metrics::of(code, language);
    let issues = security::scan(code, language);

    let assessment = assess(&metrics, include_security.then_some(issues.as_slice()));
    let suggestions =
        include_suggestions.then(|| improvements(code, language, &metrics, &issues));

    CodeAnalysis {
        language,
        characters: code.chars().count(),
        overview: Overview::of(code, language),
        patterns: patterns(code, language),
        dependencies: dependencies(code, language),
        security: include_security.then(|| SecurityScan {
            risk: RiskLevel::from_issue_count(issues.len()),
            issues,
        }),
        metrics: include_metrics.then_some(metrics),
        suggestions,
        assessment,
    }
}
