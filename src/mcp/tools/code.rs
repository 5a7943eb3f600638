//! MCP tools for code analysis.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisError, CodeAnalyzer, render};

use super::{internal, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeCodeParams {
    #[schemars(description = "Source code to analyze (takes precedence over file_path)")]
    pub code: Option<String>,
    #[schemars(description = "File to analyze when no code is given")]
    pub file_path: Option<String>,
    #[schemars(description = "Language: python, javascript, rust or go (inferred from the file extension, default python)")]
    pub language: Option<String>,
    #[schemars(description = "Include the security scan (default: true)")]
    pub include_security: Option<bool>,
    #[schemars(description = "Include code metrics (default: true)")]
    pub include_metrics: Option<bool>,
    #[schemars(description = "Include improvement suggestions (default: true)")]
    pub include_suggestions: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CodeSuggestionsParams {
    #[schemars(description = "Source code")]
    pub code: String,
    #[schemars(description = "Language (default: python)")]
    pub language: Option<String>,
    #[schemars(description = "Focus: all, performance, security, readability or maintainability (default: all)")]
    pub focus_area: Option<String>,
    #[schemars(description = "Skill level: beginner, intermediate or advanced (default: intermediate)")]
    pub skill_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SecurityAuditParams {
    #[schemars(description = "Source code to audit (takes precedence over file_path)")]
    pub code: Option<String>,
    #[schemars(description = "File to audit when no code is given")]
    pub file_path: Option<String>,
    #[schemars(description = "Language (inferred from the file extension, default python)")]
    pub language: Option<String>,
    #[schemars(description = "Audit level: basic, standard or thorough (default: standard)")]
    pub audit_level: Option<String>,
    #[schemars(description = "Include OWASP/CWE/SANS compliance counts (default: true)")]
    pub include_compliance: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteCodeParams {
    #[schemars(description = "Python code to run")]
    pub code: String,
    #[schemars(description = "Timeout in seconds, 1 to 30 (default: 10)")]
    pub timeout: Option<u64>,
    #[schemars(description = "Capture stdout and stderr (default: true)")]
    pub capture_output: Option<bool>,
    #[schemars(description = "Analyze the code and the run (default: true)")]
    pub analyze_result: Option<bool>,
}

fn analysis_error(e: AnalysisError) -> McpError {
    match e {
        AnalysisError::EmptyCode | AnalysisError::InvalidInput { .. } => invalid(e),
        AnalysisError::Read { .. } => not_found("file_not_readable", e),
        _ => internal("analysis_error", e),
    }
}

#[derive(Clone)]
pub struct CodeTools {
    analyzer: Arc<CodeAnalyzer>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl CodeTools {
    pub fn new(analyzer: Arc<CodeAnalyzer>) -> Self {
        Self {
            analyzer,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_analyze_code",
        description = "Analyze source code: structure, metrics, security issues, design patterns, dependencies and suggestions."
    )]
    pub async fn analyze_code(
        &self,
        params: Parameters<AnalyzeCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let (source, analysis) = self
            .analyzer
            .analyze_code(
                p.code.as_deref().unwrap_or_default(),
                p.file_path.as_deref(),
                p.language.as_deref(),
                p.include_security.unwrap_or(true),
                p.include_metrics.unwrap_or(true),
                p.include_suggestions.unwrap_or(true),
            )
            .await
            .map_err(analysis_error)?;
        markdown(render::analysis(&source, &analysis))
    }

    #[tool(
        name = "bb7_code_suggestions",
        description = "Targeted improvement suggestions for a focus area, pitched at a skill level."
    )]
    pub async fn code_suggestions(
        &self,
        params: Parameters<CodeSuggestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let report = self
            .analyzer
            .code_suggestions(
                &p.code,
                p.language.as_deref(),
                p.focus_area.as_deref().unwrap_or("all"),
                p.skill_level.as_deref().unwrap_or("intermediate"),
            )
            .map_err(analysis_error)?;
        markdown(render::suggestions(&report))
    }

    #[tool(
        name = "bb7_security_audit",
        description = "Security audit with severities, remediation, a best-practice checklist and a risk score."
    )]
    pub async fn security_audit(
        &self,
        params: Parameters<SecurityAuditParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let (source, report) = self
            .analyzer
            .security_audit(
                p.code.as_deref().unwrap_or_default(),
                p.file_path.as_deref(),
                p.language.as_deref(),
                p.audit_level.as_deref().unwrap_or("standard"),
            )
            .await
            .map_err(analysis_error)?;
        markdown(render::audit(
            &source,
            &report,
            p.include_compliance.unwrap_or(true),
        ))
    }

    #[tool(
        name = "bb7_execute_code_safely",
        description = "Run Python code in an isolated interpreter with a timeout, after blocking dangerous operations."
    )]
    pub async fn execute_code_safely(
        &self,
        params: Parameters<ExecuteCodeParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let outcome = self
            .analyzer
            .execute_code_safely(
                &p.code,
                p.timeout,
                p.capture_output.unwrap_or(true),
                p.analyze_result.unwrap_or(true),
            )
            .await
            .map_err(analysis_error)?;
        markdown(render::execution(&p.code, &outcome))
    }
}
