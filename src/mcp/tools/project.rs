//! MCP tools for project context.

use rmcp::{
    ErrorData as McpError,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars,
    schemars::JsonSchema,
    tool, tool_router,
};
use serde::{Deserialize, Serialize};

use crate::project::{
    ProjectError, ScanOptions, analyze_structure, health_check, project_dependencies, render,
};

use super::{blocking, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AnalyzeStructureParams {
    #[schemars(description = "Project root (default: .)")]
    pub path: Option<String>,
    #[schemars(description = "Maximum directory depth (default: 4)")]
    pub max_depth: Option<usize>,
    #[schemars(description = "Include hidden and vendored directories (default: false)")]
    pub include_hidden: Option<bool>,
    #[schemars(description = "Scan source files for security issues (default: true)")]
    pub include_security: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectDependenciesParams {
    #[schemars(description = "Project root (default: .)")]
    pub path: Option<String>,
    #[schemars(description = "Include development dependencies (default: true)")]
    pub include_dev: Option<bool>,
    #[schemars(description = "Flag unpinned versions (default: false)")]
    pub check_security: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ProjectHealthParams {
    #[schemars(description = "Project root (default: .)")]
    pub path: Option<String>,
    #[schemars(description = "Include recommendations (default: true)")]
    pub include_recommendations: Option<bool>,
    #[schemars(description = "Report size and large files (default: false)")]
    pub check_performance: Option<bool>,
}

fn project_error(e: ProjectError) -> McpError {
    match e {
        ProjectError::NotFound { .. } => not_found("project_not_found", e),
        _ => invalid(e),
    }
}

fn root_or_cwd(path: Option<String>) -> String {
    path.filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| ".".to_string())
}

#[derive(Clone)]
pub struct ProjectTools {
    tool_router: ToolRouter<Self>,
}

impl Default for ProjectTools {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_router]
impl ProjectTools {
    pub fn new() -> Self {
        Self {
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_analyze_project_structure",
        description = "Survey a project: file and language counts, frameworks, tests, docs, large files, security findings and recommendations."
    )]
    pub async fn analyze_project_structure(
        &self,
        params: Parameters<AnalyzeStructureParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let defaults = ScanOptions::default();
        let options = ScanOptions {
            max_depth: p.max_depth.unwrap_or(defaults.max_depth),
            include_hidden: p.include_hidden.unwrap_or(defaults.include_hidden),
        };
        let path = root_or_cwd(p.path);
        let include_security = p.include_security.unwrap_or(true);
        let report = blocking(move || analyze_structure(&path, options, include_security))
            .await?
            .map_err(project_error)?;
        markdown(render::structure(&report))
    }

    #[tool(
        name = "bb7_get_project_dependencies",
        description = "Collect dependencies from package.json, requirements.txt, Pipfile, pyproject.toml, pom.xml, go.mod, Cargo.toml and environment.yml."
    )]
    pub async fn get_project_dependencies(
        &self,
        params: Parameters<ProjectDependenciesParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let path = root_or_cwd(p.path);
        let include_dev = p.include_dev.unwrap_or(true);
        let report = blocking(move || project_dependencies(&path, include_dev))
            .await?
            .map_err(project_error)?;
        markdown(render::dependencies(
            &report,
            include_dev,
            p.check_security.unwrap_or(false),
        ))
    }

    #[tool(
        name = "bb7_project_health_check",
        description = "Score project health out of 100 from docs, version control, dependencies, tests and configuration."
    )]
    pub async fn project_health_check(
        &self,
        params: Parameters<ProjectHealthParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let path = root_or_cwd(p.path);
        let include_recommendations = p.include_recommendations.unwrap_or(true);
        let check_performance = p.check_performance.unwrap_or(false);
        let report =
            blocking(move || health_check(&path, include_recommendations, check_performance))
                .await?
                .map_err(project_error)?;
        markdown(render::health(&report))
    }
}
