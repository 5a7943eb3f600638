use tempfile::TempDir;

use super::metrics::Level;
use super::review::{self, Grade};
use super::security::RiskLevel;
use super::*;

const PYTHON: &str = r#"import os
import requests
from collections import defaultdict

class WidgetFactory:
    def __new__(cls):
        return super().__new__(cls)

def load_user_data(user_id, retries, timeout, verbose, cache, session):
    global counter
    try:
        if verbose == True:
            print(user_id)
    except:
        pass
    return eval(user_id)
"#;

#[test]
fn review_detects_patterns_and_style() {
    let patterns = review::patterns(PYTHON, Language::Python);
    assert_eq!(patterns.design, vec!["Factory Pattern", "Singleton Pattern"]);
    assert_eq!(
        patterns.anti,
        vec![
            "Explicit comparison with True",
            "Bare except clause",
            "Global variable usage"
        ]
    );
    assert_eq!(patterns.naming, "Snake Case (PEP 8)");
}

#[test]
fn dependencies_split_stdlib_and_external() {
    let python = review::dependencies(PYTHON, Language::Python);
    assert_eq!(python.imports, vec!["os", "requests", "collections"]);
    assert_eq!(python.stdlib, vec!["os", "collections"]);
    assert_eq!(python.external, vec!["requests"]);

    let rust = review::dependencies(
        "use std::collections::HashMap;\nuse tokio::sync::Mutex;\n",
        Language::Rust,
    );
    assert_eq!(rust.stdlib, vec!["std"]);
    assert_eq!(rust.external, vec!["tokio"]);

    let go = review::dependencies(
        "import (\n\t\"fmt\"\n\t\"github.com/spf13/cobra\"\n)\n",
        Language::Go,
    );
    assert_eq!(go.stdlib, vec!["fmt"]);
    assert_eq!(go.external, vec!["github.com/spf13/cobra"]);

    let js = review::dependencies(
        "import React from 'react';\nconst fs = require('fs');\n",
        Language::JavaScript,
    );
    assert_eq!(js.stdlib, vec!["fs"]);
    assert_eq!(js.external, vec!["react"]);
}

#[test]
fn analyze_combines_every_section() {
    let analysis = review::analyze(PYTHON, Language::Python, true, true, true);

    assert_eq!(analysis.overview.classes, 1);
    assert_eq!(analysis.overview.functions, 2);
    assert_eq!(analysis.overview.imports, 3);

    let scan = analysis.security.as_ref().unwrap();
    assert_eq!(scan.issues.len(), 1);
    assert_eq!(scan.risk, RiskLevel::Medium);

    let suggestions = analysis.suggestions.as_ref().unwrap();
    assert_eq!(
        suggestions.security,
        vec!["Address security vulnerabilities found in analysis"]
    );
    assert!(
        suggestions
            .readability
            .contains(&"Add more comments to explain complex logic".to_string())
    );
    assert!(suggestions.maintainability[0].contains("load_user_data"));

    assert_eq!(analysis.assessment.readability, Grade::Poor);
    assert_eq!(analysis.assessment.security, Some(Grade::Fair));
    assert_eq!(analysis.assessment.complexity, Level::Low);
}

#[test]
fn excluded_sections_are_absent() {
    let analysis = review::analyze(PYTHON, Language::Python, false, false, false);
    assert!(analysis.security.is_none());
    assert!(analysis.metrics.is_none());
    assert!(analysis.suggestions.is_none());
    assert_eq!(analysis.assessment.security, None);
}

#[tokio::test(flavor = "multi_thread")]
async fn analyze_code_reads_files_and_infers_language() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("lib.rs");
    std::fs::write(
        &path,
        "use std::fs;\n\n// entry point\npub fn run(path: &str) -> usize {\n    unsafe { 0 }\n}\n",
    )
    .unwrap();

    let analyzer = CodeAnalyzer::new();
    let (source, analysis) = analyzer
        .analyze_code("", path.to_str(), None, true, true, true)
        .await
        .unwrap();
    assert_eq!(source.language, Language::Rust);
    assert_eq!(source.origin.as_deref(), path.to_str());
    assert_eq!(analysis.overview.functions, 1);
    assert_eq!(analysis.security.unwrap().issues[0].title, "Unsafe block");

    let markdown = render::analysis(&source, &review::analyze(&source.code, source.language, true, true, true));
    assert!(markdown.contains("- **Language:** Rust"));
    assert!(markdown.contains("**Overall Assessment:**"));
    assert!(markdown.contains("- Security: Fair"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_sources_are_errors() {
    let analyzer = CodeAnalyzer::new();
    assert!(matches!(
        analyzer.analyze_code("  ", None, None, true, true, true).await,
        Err(AnalysisError::EmptyCode)
    ));

    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.py");
    assert!(matches!(
        analyzer
            .security_audit("", missing.to_str(), None, "standard")
            .await,
        Err(AnalysisError::Read { .. })
    ));
    assert!(matches!(
        analyzer.security_audit("eval(x)", None, None, "extreme").await,
        Err(AnalysisError::InvalidInput { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn security_audit_renders_report() {
    let analyzer = CodeAnalyzer::new();
    let (source, report) = analyzer
        .security_audit("result = eval(user_input)\n", None, Some("python"), "standard")
        .await
        .unwrap();
    assert_eq!(report.count(Severity::Critical), 1);

    let markdown = render::audit(&source, &report, true);
    assert!(markdown.contains("**Risk Score:** 30/100 (Medium)"));
    assert!(markdown.contains("- OWASP Top 10: 1"));
    assert!(markdown.contains("- [ ] Secure Imports"));

    let without = render::audit(&source, &report, false);
    assert!(!without.contains("Compliance Findings"));
}

#[test]
fn code_suggestions_render_by_category() {
    let analyzer = CodeAnalyzer::new();
    let report = analyzer
        .code_suggestions("x = eval(data)\n", Some("python"), "security", "beginner")
        .unwrap();
    assert_eq!(report.suggestions.len(), 1);

    let markdown = render::suggestions(&report);
    assert!(markdown.contains("### Security Suggestions"));
    assert!(markdown.contains("ast.literal_eval"));
    assert!(markdown.contains("**Beginner Level Recommendations:**"));

    let quiet = analyzer
        .code_suggestions("print('hi')\n", None, "performance", "advanced")
        .unwrap();
    assert!(render::suggestions(&quiet).contains("No immediate suggestions"));

    assert!(matches!(
        analyzer.code_suggestions("x = 1", None, "speed", "beginner"),
        Err(AnalysisError::InvalidInput { .. })
    ));
    assert!(matches!(
        analyzer.code_suggestions("", None, "all", "beginner"),
        Err(AnalysisError::EmptyCode)
    ));
}
