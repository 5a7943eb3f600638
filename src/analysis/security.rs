//! Pattern based security scanning and audit scoring.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::error::AnalysisError;
use super::language::Language;
use super::metrics::Overview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    /// Classify a finding from the words in its description.
    pub fn classify(description: &str) -> Self {
        let lower = description.to_lowercase();
        if ["eval", "exec", "pickle", "system"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Severity::Critical
        } else if ["sql", "injection", "xss", "csrf"]
            .iter()
            .any(|k| lower.contains(k))
        {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            Severity::Critical => 30,
            Severity::High => 20,
            Severity::Medium => 10,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityIssue {
    pub title: String,
    pub severity: Severity,
    pub line: usize,
    pub snippet: String,
    pub remediation: &'static str,
}

pub fn remediation(description: &str) -> &'static str {
    const ADVICE: &[(&str, &str)] = &[
        ("eval", "Use a literal parser (e.g. ast.literal_eval) instead of evaluating code"),
        ("system", "Run processes with an argument list and validate every input"),
        ("exec", "Avoid dynamic code execution; dispatch to known functions instead"),
        ("pickle", "Use JSON or another data-only serialization format"),
        ("sql", "Use parameterized queries or prepared statements"),
        ("innerhtml", "Assign textContent or sanitize markup before inserting it"),
        ("credential", "Load secrets from the environment or a secret manager"),
        ("http url", "Use HTTPS endpoints"),
        ("hash", "Use SHA-256 or a dedicated password hash such as argon2"),
    ];
    let lower = description.to_lowercase();
    ADVICE
        .iter()
        .find(|(k, _)| lower.contains(k))
        .map(|(_, advice)| *advice)
        .unwrap_or("Review code for security implications and apply appropriate safeguards")
}

static THOROUGH_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (
            r#"(?i)\b(?:password|passwd|secret|api_?key|token)\s*[:=]\s*["'][^"']{4,}["']"#,
            "Hardcoded credential",
        ),
        (r#"["']http://[^"'\s]+"#, "Insecure HTTP URL"),
        (r"(?i)\b(?:md5|sha1)\b", "Weak hash algorithm (MD5/SHA1)"),
    ]
    .into_iter()
    .filter_map(|(p, d)| Regex::new(p).ok().map(|re| (re, d)))
    .collect()
});

/// Every match of `patterns` in `code`, in pattern order.
fn find(code: &str, patterns: &[(Regex, &'static str)]) -> Vec<SecurityIssue> {
    let lines: Vec<&str> = code.lines().collect();
    let mut issues = Vec::new();
    for (re, description) in patterns {
        for m in re.find_iter(code) {
            let line = code[..m.start()].matches('\n').count() + 1;
            issues.push(SecurityIssue {
                title: description.to_string(),
                severity: Severity::classify(description),
                line,
                snippet: lines
                    .get(line - 1)
                    .map(|l| l.trim().to_string())
                    .unwrap_or_default(),
                remediation: remediation(description),
            });
        }
    }
    issues
}

/// Language pattern matches, used by `analyze_code`.
pub fn scan(code: &str, language: Language) -> Vec<SecurityIssue> {
    find(code, &language.patterns().security)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            70.. => RiskLevel::Critical,
            40.. => RiskLevel::High,
            20.. => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// Coarse level for the quick scan: by issue count.
    pub fn from_issue_count(count: usize) -> Self {
        match count {
            0 => RiskLevel::Low,
            1 | 2 => RiskLevel::Medium,
            _ => RiskLevel::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "Immediate security review required",
            RiskLevel::High => "Security improvements needed",
            RiskLevel::Medium => "Monitor and improve security practices",
            RiskLevel::Low => "Continue current security practices",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AuditLevel {
    /// Critical and high findings only.
    Basic,
    #[default]
    Standard,
    /// Standard plus credential, plain HTTP and weak hash checks.
    Thorough,
}

impl AuditLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditLevel::Basic => "basic",
            AuditLevel::Standard => "standard",
            AuditLevel::Thorough => "thorough",
        }
    }
}

impl FromStr for AuditLevel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(AuditLevel::Basic),
            "" | "standard" => Ok(AuditLevel::Standard),
            "thorough" => Ok(AuditLevel::Thorough),
            other => Err(AnalysisError::InvalidInput {
                message: format!(
                    "unknown audit level '{}' (expected basic, standard or thorough)",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Compliance {
    /// Critical and high findings.
    pub owasp: usize,
    /// All findings.
    pub cwe: usize,
    /// Critical findings.
    pub sans: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub language: Language,
    pub level: AuditLevel,
    pub vulnerabilities: Vec<SecurityIssue>,
    pub best_practices: Vec<(&'static str, bool)>,
    pub compliance: Compliance,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<&'static str>,
    pub patterns_checked: usize,
    pub functions_analyzed: usize,
    pub dependencies_scanned: usize,
}

impl AuditReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

fn best_practices(code: &str, language: Language) -> Vec<(&'static str, bool)> {
    let error_handling = match language {
        Language::Python => code.contains("try:") && code.contains("except"),
        Language::JavaScript => code.contains("try") && code.contains("catch"),
        Language::Rust => code.contains("Result<") || code.contains('?'),
        Language::Go => code.contains("err != nil"),
        Language::Other => code.contains("try") || code.contains("catch"),
    };
    vec![
        (
            "Input Validation",
            !code.contains("input(") && !code.contains("raw_input("),
        ),
        ("Error Handling", error_handling),
        (
            "Secure Imports",
            !code.contains("pickle") && !code.contains("eval"),
        ),
        (
            "SQL Injection Prevention",
            !code.contains("execute(") || code.to_lowercase().contains("parameterized"),
        ),
    ]
}

pub fn audit(code: &str, language: Language, level: AuditLevel) -> AuditReport {
    let patterns = &language.patterns().security;
    let mut vulnerabilities = find(code, patterns);
    let mut patterns_checked = patterns.len();

    match level {
        AuditLevel::Basic => vulnerabilities.retain(|v| v.severity != Severity::Medium),
        AuditLevel::Standard => {}
        AuditLevel::Thorough => {
            vulnerabilities.extend(find(code, &THOROUGH_PATTERNS));
            patterns_checked += THOROUGH_PATTERNS.len();
        }
    }
    vulnerabilities.sort_by_key(|v| (v.severity, v.line));

    let score: u32 = vulnerabilities.iter().map(|v| v.severity.weight()).sum();
    let risk_score = score.min(100);

    let critical = vulnerabilities
        .iter()
        .filter(|v| v.severity == Severity::Critical)
        .count();
    let high = vulnerabilities
        .iter()
        .filter(|v| v.severity == Severity::High)
        .count();

    let recommendations = if vulnerabilities.is_empty() {
        Vec::new()
    } else {
        vec![
            "Address all critical and high severity vulnerabilities",
            "Implement input validation and sanitization",
            "Use parameterized queries for database operations",
            "Avoid dynamic code execution (eval, exec)",
            "Implement proper error handling",
        ]
    };

    let overview = Overview::of(code, language);
    AuditReport {
        language,
        level,
        compliance: Compliance {
            owasp: critical + high,
            cwe: vulnerabilities.len(),
            sans: critical,
        },
        best_practices: best_practices(code, language),
        vulnerabilities,
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
        recommendations,
        patterns_checked,
        functions_analyzed: overview.functions,
        dependencies_scanned: overview.imports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RISKY: &str = r#"import pickle
data = pickle.loads(blob)
result = eval(user_input)
cursor.execute("SELECT * FROM users WHERE id = " + uid)
open("out.txt", "w")
"#;

    #[test]
    fn severity_follows_description_keywords() {
        assert_eq!(Severity::classify("Dangerous eval() usage"), Severity::Critical);
        assert_eq!(Severity::classify("InnerHTML assignment (XSS risk)"), Severity::High);
        assert_eq!(Severity::classify("File write operation"), Severity::Medium);
    }

    #[test]
    fn scan_reports_lines_and_snippets() {
        let issues = scan(RISKY, Language::Python);
        let eval = issues
            .iter()
            .find(|i| i.title.contains("eval"))
            .unwrap();
        assert_eq!(eval.line, 3);
        assert_eq!(eval.snippet, "result = eval(user_input)");
        assert_eq!(eval.severity, Severity::Critical);
        assert!(issues.iter().any(|i| i.title.starts_with("SQL")));
    }

    #[test]
    fn standard_audit_scores_and_levels() {
        let report = audit(RISKY, Language::Python, AuditLevel::Standard);
        // pickle + eval critical, SQL high, file write medium
        assert_eq!(report.count(Severity::Critical), 2);
        assert_eq!(report.count(Severity::High), 1);
        assert_eq!(report.count(Severity::Medium), 1);
        assert_eq!(report.risk_score, 90);
        assert_eq!(report.risk_level, RiskLevel::Critical);
        assert_eq!(report.compliance.owasp, 3);
        assert_eq!(report.compliance.cwe, 4);
        assert_eq!(report.compliance.sans, 2);
        assert_eq!(report.recommendations.len(), 5);
        assert_eq!(report.patterns_checked, 9);
        assert_eq!(report.vulnerabilities[0].severity, Severity::Critical);
    }

    #[test]
    fn basic_audit_drops_medium_findings() {
        let report = audit(RISKY, Language::Python, AuditLevel::Basic);
        assert_eq!(report.count(Severity::Medium), 0);
        assert_eq!(report.vulnerabilities.len(), 3);
    }

    #[test]
    fn thorough_audit_adds_generic_checks() {
        let code = "API_KEY = \"sk-live-123456\"\nurl = \"http://example.com\"\nh = hashlib.md5(x)\n";
        let report = audit(code, Language::Python, AuditLevel::Thorough);
        let titles: Vec<&str> = report.vulnerabilities.iter().map(|v| v.title.as_str()).collect();
        assert!(titles.contains(&"Hardcoded credential"));
        assert!(titles.contains(&"Insecure HTTP URL"));
        assert!(titles.contains(&"Weak hash algorithm (MD5/SHA1)"));
        assert_eq!(report.risk_score, 30);
        assert_eq!(report.risk_level, RiskLevel::Medium);

        let standard = audit(code, Language::Python, AuditLevel::Standard);
        assert!(standard.vulnerabilities.is_empty());
        assert_eq!(standard.risk_level, RiskLevel::Low);
        assert!(standard.recommendations.is_empty());
    }

    #[test]
    fn risk_levels_from_scores() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_issue_count(2), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_issue_count(3), RiskLevel::High);
    }

    #[test]
    fn audit_levels_parse() {
        assert_eq!("Thorough".parse::<AuditLevel>().unwrap(), AuditLevel::Thorough);
        assert_eq!("".parse::<AuditLevel>().unwrap(), AuditLevel::Standard);
        assert!("paranoid".parse::<AuditLevel>().is_err());
    }
}
