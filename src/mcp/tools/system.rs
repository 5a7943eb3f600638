//! Server-level tools: capabilities, health and a getting-started guide.

use std::path::Path;
use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, handler::server::router::tool::ToolRouter, model::*, tool, tool_router,
};

use crate::config::Config;
use crate::db::Database;
use crate::render::title_case;

use super::markdown;

/// A tool family and how many tools it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFamily {
    pub name: &'static str,
    pub tools: usize,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "enabled" } else { "disabled" }
}

fn marker(exists: bool) -> &'static str {
    if exists { "[ok]" } else { "[missing]" }
}

fn dir_label(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}

pub struct SystemTools<D: Database> {
    config: Arc<Config>,
    db: Arc<D>,
    families: Arc<Vec<ToolFamily>>,
    tool_router: ToolRouter<Self>,
}

impl<D: Database> Clone for SystemTools<D> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            db: Arc::clone(&self.db),
            families: Arc::clone(&self.families),
            tool_router: self.tool_router.clone(),
        }
    }
}

#[tool_router]
impl<D: Database + 'static> SystemTools<D> {
    /// `families` lists the other tool families; this family is appended.
    pub fn new(config: Arc<Config>, db: Arc<D>, mut families: Vec<ToolFamily>) -> Self {
        let tool_router = Self::tool_router();
        families.push(ToolFamily {
            name: "System",
            tools: tool_router.list_all().len(),
        });
        Self {
            config,
            db,
            families: Arc::new(families),
            tool_router,
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    pub fn families(&self) -> &[ToolFamily] {
        &self.families
    }

    #[tool(
        name = "bb7_server_info",
        description = "Server configuration, loaded tool families, platform and data directory status."
    )]
    pub async fn server_info(&self) -> Result<CallToolResult, McpError> {
        let flags = self.config.flags;
        let mut out = format!(
            "## bb7 Server v{}\n\n### Configuration\n\n",
            env!("CARGO_PKG_VERSION")
        );
        out.push_str(&format!("- Claude Mode: {}\n", yes_no(flags.claude_mode)));
        out.push_str(&format!(
            "- Enhanced Reasoning: {}\n",
            yes_no(flags.enhanced_reasoning)
        ));
        out.push_str(&format!("- Long Context Mode: {}\n", yes_no(flags.long_context)));
        out.push_str(&format!(
            "- Cross-Project Synthesis: {}\n",
            yes_no(flags.cross_project_synthesis)
        ));

        let total: usize = self.families.iter().map(|f| f.tools).sum();
        out.push_str(&format!(
            "\n### Tool Families ({} families, {} tools)\n\n",
            self.families.len(),
            total
        ));
        for family in self.families.iter() {
            out.push_str(&format!("- {}: {} tools\n", family.name, family.tools));
        }

        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| "unknown".to_string());
        out.push_str("\n### System\n\n");
        out.push_str(&format!("- Working Directory: {}\n", cwd));
        out.push_str(&format!(
            "- Platform: {} ({})\n",
            std::env::consts::OS,
            std::env::consts::ARCH
        ));
        out.push_str(&format!(
            "- Data Directory: {} {}\n",
            marker(self.config.data_dir.is_dir()),
            self.config.data_dir.display()
        ));
        for dir in self.config.data_dirs() {
            out.push_str(&format!("  - {}: {}\n", dir_label(&dir), marker(dir.is_dir())));
        }

        out.push_str("\n### Quick Start\n\n");
        out.push_str("- `bb7_welcome`: introduction and overview\n");
        out.push_str("- `bb7_start_session`: begin a development session\n");
        out.push_str("- `bb7_memory_store`: save an insight\n");
        out.push_str("- `bb7_health_check`: verify system status\n");
        markdown(out)
    }

    #[tool(
        name = "bb7_health_check",
        description = "Check data directories, database reachability and configuration."
    )]
    pub async fn health_check(&self) -> Result<CallToolResult, McpError> {
        let mut issues = Vec::new();
        let mut out = String::from("## System Health Check\n\n");

        let missing: Vec<String> = self
            .config
            .data_dirs()
            .iter()
            .filter(|d| !d.is_dir())
            .map(|d| dir_label(d))
            .collect();
        out.push_str(&format!(
            "- **Data Directories:** {}\n",
            marker(missing.is_empty())
        ));
        for name in &missing {
            issues.push(format!("{} directory missing", title_case(name)));
        }

        match self.db.ping().await {
            Ok(()) => out.push_str("- **Database:** [ok]\n"),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                out.push_str("- **Database:** [unreachable]\n");
                issues.push(format!("Database unreachable: {}", e));
            }
        }

        let total: usize = self.families.iter().map(|f| f.tools).sum();
        out.push_str(&format!(
            "- **Tool Families:** {} loaded, {} tools\n",
            self.families.len(),
            total
        ));

        if !self.config.flags.claude_mode {
            issues.push("Claude Mode not enabled".to_string());
        }
        out.push_str(&format!(
            "- **Configuration:** {}\n\n",
            if issues.is_empty() { "[ok]" } else { "[warn]" }
        ));

        if issues.is_empty() {
            out.push_str("**Overall Status:** Healthy, all systems operational");
        } else {
            out.push_str("**Overall Status:** Issues detected\n\n**Issues Found:**\n");
            for issue in &issues {
                out.push_str(&format!("- {}\n", issue));
            }
            out.push_str("\nAddress the issues above for full functionality.");
        }
        markdown(out)
    }

    #[tool(
        name = "bb7_welcome",
        description = "Introduction to the toolbox and a getting-started list."
    )]
    pub async fn welcome(&self) -> Result<CallToolResult, McpError> {
        let mut out = String::from("## Welcome to bb7\n\n");
        out.push_str(
            "A development toolbox with persistent memory, session journaling, project \
             understanding and direct access to files, shells and the web.\n\n",
        );
        out.push_str("### What You Get\n\n");
        out.push_str("- **Persistent Memory:** insights survive across conversations\n");
        out.push_str("- **Session Continuity:** goals, decisions and touched files are journaled\n");
        out.push_str("- **Project Intelligence:** structure, dependencies and health at a glance\n");
        out.push_str("- **Tool Integration:** files, shells, web and code analysis in one place\n\n");
        out.push_str("### Getting Started\n\n");
        out.push_str("1. `bb7_start_session`: begin a session\n");
        out.push_str("2. `bb7_memory_store`: save important insights\n");
        out.push_str("3. `bb7_analyze_project_structure`: survey your project\n");
        out.push_str("4. `bb7_server_info`: see every available capability\n");
        out.push_str("5. `bb7_health_check`: verify everything works\n");
        markdown(out)
    }
}
