//! The code analysis tool: source loading plus the four analysis entry
//! points.

use std::path::Path;

use serde::Serialize;

use super::error::{AnalysisError, AnalysisResult};
use super::language::Language;
use super::review::{self, CodeAnalysis};
use super::sandbox::{Sandbox, SandboxOutcome};
use super::security::{self, AuditLevel, AuditReport};
use super::suggestions::{self, FocusArea, SkillLevel, Suggestion};

/// Source text and where it came from.
#[derive(Debug, Clone)]
pub struct Source {
    pub code: String,
    pub language: Language,
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestionReport {
    pub language: Language,
    pub focus: FocusArea,
    pub skill: SkillLevel,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Default)]
pub struct CodeAnalyzer {
    sandbox: Sandbox,
}

impl CodeAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sandbox(sandbox: Sandbox) -> Self {
        Self { sandbox }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Inline `code` wins; otherwise `file_path` is read. Without an explicit
    /// language the file extension decides, falling back to Python.
    pub async fn load(
        &self,
        code: &str,
        file_path: Option<&str>,
        language: Option<&str>,
    ) -> AnalysisResult<Source> {
        let from_name = |path: Option<&Path>| {
            language
                .filter(|l| !l.trim().is_empty())
                .map(Language::from_name)
                .or_else(|| {
                    path.and_then(|p| p.extension())
                        .and_then(|e| e.to_str())
                        .map(Language::from_name)
                })
                .unwrap_or(Language::Python)
        };

        if !code.trim().is_empty() {
            return Ok(Source {
                code: code.to_string(),
                language: from_name(None),
                origin: None,
            });
        }

        let Some(file_path) = file_path.filter(|p| !p.trim().is_empty()) else {
            return Err(AnalysisError::EmptyCode);
        };
        let path = crate::files::resolve_path(file_path).map_err(|e| {
            AnalysisError::InvalidInput {
                message: e.to_string(),
            }
        })?;
        let code = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AnalysisError::Read {
                path: path.clone(),
                source,
            })?;
        if code.trim().is_empty() {
            return Err(AnalysisError::EmptyCode);
        }
        Ok(Source {
            code,
            language: from_name(Some(&path)),
            origin: Some(path.display().to_string()),
        })
    }

    pub async fn analyze_code(
        &self,
        code: &str,
        file_path: Option<&str>,
        language: Option<&str>,
        include_security: bool,
        include_metrics: bool,
        include_suggestions: bool,
    ) -> AnalysisResult<(Source, CodeAnalysis)> {
        let source = self.load(code, file_path, language).await?;
        let analysis = review::analyze(
            &source.code,
            source.language,
            include_security,
            include_metrics,
            include_suggestions,
        );
        tracing::info!(
            language = %source.language,
            characters = analysis.characters,
            "Analyzed code"
        );
        Ok((source, analysis))
    }

    pub fn code_suggestions(
        &self,
        code: &str,
        language: Option<&str>,
        focus_area: &str,
        skill_level: &str,
    ) -> AnalysisResult<SuggestionReport> {
        if code.trim().is_empty() {
            return Err(AnalysisError::EmptyCode);
        }
        let language = Language::from_name(language.unwrap_or_default());
        let focus: FocusArea = focus_area.parse()?;
        let skill: SkillLevel = skill_level.parse()?;
        let suggestions = suggestions::targeted(code, language, focus, skill);
        tracing::info!(count = suggestions.len(), "Generated code suggestions");
        Ok(SuggestionReport {
            language,
            focus,
            skill,
            suggestions,
        })
    }

    pub async fn security_audit(
        &self,
        code: &str,
        file_path: Option<&str>,
        language: Option<&str>,
        audit_level: &str,
    ) -> AnalysisResult<(Source, AuditReport)> {
        let level: AuditLevel = audit_level.parse()?;
        let source = self.load(code, file_path, language).await?;
        let report = security::audit(&source.code, source.language, level);
        tracing::info!(
            vulnerabilities = report.vulnerabilities.len(),
            risk_score = report.risk_score,
            "Security audit complete"
        );
        Ok((source, report))
    }

    pub async fn execute_code_safely(
        &self,
        code: &str,
        timeout_secs: Option<u64>,
        capture_output: bool,
        analyze_result: bool,
    ) -> AnalysisResult<SandboxOutcome> {
        self.sandbox
            .execute(code, timeout_secs, capture_output, analyze_result)
            .await
    }
}
