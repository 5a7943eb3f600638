//! Tests for code analysis MCP tools

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorCode, RawContent};

use crate::analysis::CodeAnalyzer;
use crate::mcp::tools::code::{
    AnalyzeCodeParams, CodeSuggestionsParams, CodeTools, ExecuteCodeParams, SecurityAuditParams,
};

const SAMPLE: &str = "import json\n\nclass Loader:\n    def load(self, raw):\n        return json.loads(raw)\n\ndef run(expr):\n    return eval(expr)\n";

fn setup() -> CodeTools {
    CodeTools::new(Arc::new(CodeAnalyzer::new()))
}

fn text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

fn analyze(code: &str) -> Parameters<AnalyzeCodeParams> {
    Parameters(AnalyzeCodeParams {
        code: Some(code.to_string()),
        file_path: None,
        language: Some("python".to_string()),
        include_security: None,
        include_metrics: None,
        include_suggestions: None,
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_code() {
    let tools = setup();

    let result = tools.analyze_code(analyze(SAMPLE)).await.unwrap();
    let report = text(&result);
    assert!(report.starts_with("## Code Analysis"));
    assert!(report.contains("- **Language:** Python"));
    assert!(report.contains("**Overview:**"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_requires_code_or_file() {
    let tools = setup();

    let err = tools
        .analyze_code(analyze("   \n"))
        .await
        .expect_err("blank code should fail");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_missing_file_is_not_found() {
    let tools = setup();

    let err = tools
        .analyze_code(Parameters(AnalyzeCodeParams {
            code: None,
            file_path: Some("/definitely/not/here.py".to_string()),
            language: None,
            include_security: None,
            include_metrics: None,
            include_suggestions: None,
        }))
        .await
        .expect_err("unreadable file should fail");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_code_suggestions() {
    let tools = setup();

    let result = tools
        .code_suggestions(Parameters(CodeSuggestionsParams {
            code: SAMPLE.to_string(),
            language: None,
            focus_area: Some("security".to_string()),
            skill_level: Some("beginner".to_string()),
        }))
        .await
        .unwrap();
    assert!(text(&result).starts_with("## Code Suggestions"));

    let err = tools
        .code_suggestions(Parameters(CodeSuggestionsParams {
            code: SAMPLE.to_string(),
            language: None,
            focus_area: Some("style-points".to_string()),
            skill_level: None,
        }))
        .await
        .expect_err("unknown focus area should fail");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_security_audit() {
    let tools = setup();

    let result = tools
        .security_audit(Parameters(SecurityAuditParams {
            code: Some(SAMPLE.to_string()),
            file_path: None,
            language: None,
            audit_level: Some("thorough".to_string()),
            include_compliance: Some(true),
        }))
        .await
        .unwrap();
    let report = text(&result);
    assert!(report.starts_with("## Security Audit"));
    assert!(report.contains("**Risk Score:**"));
    assert!(report.contains("**Compliance Findings:**"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_execute_blocks_dangerous_code() {
    let tools = setup();

    let result = tools
        .execute_code_safely(Parameters(ExecuteCodeParams {
            code: "import os\nos.remove('x')\n".to_string(),
            timeout: None,
            capture_output: None,
            analyze_result: None,
        }))
        .await
        .unwrap();
    let report = text(&result);
    assert!(report.starts_with("## Safe Code Execution"));
    assert!(report.contains("**Execution blocked:**"));
    assert!(report.contains("OS module import"));
}
