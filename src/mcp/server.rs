//! MCP server coordinator
//!
//! Shared services live in a [`Toolbox`] built once at startup. Each
//! transport session gets its own [`McpServer`], which is cheap to build
//! because every service is behind an `Arc`.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolCallContext,
    model::{
        CallToolRequestParams, CallToolResult, ListToolsResult, PaginatedRequestParams,
        ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
};

use crate::analysis::CodeAnalyzer;
use crate::config::Config;
use crate::db::Database;
use crate::files::FileTool;
use crate::memory::MemoryStore;
use crate::session::SessionManager;
use crate::shell::{ShellTool, SystemLocator};
use crate::web::{WebResult, WebTool};

use super::tools::system::ToolFamily;
use super::tools::{
    CodeTools, FileTools, MemoryTools, ProjectTools, SessionTools, ShellTools, SystemTools,
    WebTools,
};

/// Long-lived state shared by every server instance.
pub struct Toolbox<D: Database> {
    pub config: Arc<Config>,
    pub db: Arc<D>,
    pub sessions: Arc<SessionManager>,
    pub files: Arc<FileTool>,
    pub shell: Arc<ShellTool>,
    pub web: Arc<WebTool>,
    pub analyzer: Arc<CodeAnalyzer>,
}

impl<D: Database> Clone for Toolbox<D> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            db: Arc::clone(&self.db),
            sessions: Arc::clone(&self.sessions),
            files: Arc::clone(&self.files),
            shell: Arc::clone(&self.shell),
            web: Arc::clone(&self.web),
            analyzer: Arc::clone(&self.analyzer),
        }
    }
}

impl<D: Database> Toolbox<D> {
    /// Wire every service to its directory under the data dir. Shell
    /// discovery runs here, once.
    pub fn new(config: Config, db: D) -> WebResult<Self> {
        let web = WebTool::new(config.web_cache_dir(), config.downloads_dir())?;
        Ok(Self {
            db: Arc::new(db),
            sessions: Arc::new(SessionManager::new(config.sessions_dir())),
            files: Arc::new(FileTool::new(config.backups_dir())),
            shell: Arc::new(ShellTool::new(config.scripts_dir(), &SystemLocator)),
            web: Arc::new(web),
            analyzer: Arc::new(CodeAnalyzer::new()),
            config: Arc::new(config),
        })
    }
}

/// Main MCP server
///
/// Holds one tool struct per family and routes each call to the family
/// whose router owns the tool name.
pub struct McpServer<D: Database> {
    memory: MemoryTools<D>,
    session: SessionTools,
    files: FileTools,
    shell: ShellTools,
    web: WebTools,
    code: CodeTools,
    project: ProjectTools,
    system: SystemTools<D>,
}

impl<D: Database> Clone for McpServer<D> {
    fn clone(&self) -> Self {
        Self {
            memory: self.memory.clone(),
            session: self.session.clone(),
            files: self.files.clone(),
            shell: self.shell.clone(),
            web: self.web.clone(),
            code: self.code.clone(),
            project: self.project.clone(),
            system: self.system.clone(),
        }
    }
}

impl<D: Database + 'static> McpServer<D> {
    pub fn new(toolbox: &Toolbox<D>) -> Self {
        let memory = MemoryTools::new(MemoryStore::new(Arc::clone(&toolbox.db)));
        let session = SessionTools::new(Arc::clone(&toolbox.sessions));
        let files = FileTools::new(Arc::clone(&toolbox.files), Arc::clone(&toolbox.sessions));
        let shell = ShellTools::new(Arc::clone(&toolbox.shell), Arc::clone(&toolbox.sessions));
        let web = WebTools::new(Arc::clone(&toolbox.web));
        let code = CodeTools::new(Arc::clone(&toolbox.analyzer));
        let project = ProjectTools::new();

        let families = vec![
            ToolFamily {
                name: "Memory",
                tools: memory.router().list_all().len(),
            },
            ToolFamily {
                name: "Session",
                tools: session.router().list_all().len(),
            },
            ToolFamily {
                name: "Files",
                tools: files.router().list_all().len(),
            },
            ToolFamily {
                name: "Shell",
                tools: shell.router().list_all().len(),
            },
            ToolFamily {
                name: "Web",
                tools: web.router().list_all().len(),
            },
            ToolFamily {
                name: "Code Analysis",
                tools: code.router().list_all().len(),
            },
            ToolFamily {
                name: "Project",
                tools: project.router().list_all().len(),
            },
        ];
        let system = SystemTools::new(
            Arc::clone(&toolbox.config),
            Arc::clone(&toolbox.db),
            families,
        );

        Self {
            memory,
            session,
            files,
            shell,
            web,
            code,
            project,
            system,
        }
    }

    /// Every tool across all families.
    pub fn tools(&self) -> Vec<Tool> {
        let mut tools = self.memory.router().list_all();
        tools.extend(self.session.router().list_all());
        tools.extend(self.files.router().list_all());
        tools.extend(self.shell.router().list_all());
        tools.extend(self.web.router().list_all());
        tools.extend(self.code.router().list_all());
        tools.extend(self.project.router().list_all());
        tools.extend(self.system.router().list_all());
        tools
    }

    pub fn families(&self) -> &[ToolFamily] {
        self.system.families()
    }
}

impl<D: Database + 'static> ServerHandler for McpServer<D> {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::default();
        info.capabilities = ServerCapabilities::builder().enable_tools().build();
        info.instructions = Some(
            "bb7 MCP Server - persistent memory, session journaling, files, shells, web, \
             code analysis and project context. Call bb7_welcome to get started."
                .to_string(),
        );
        info
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: self.tools(),
        }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.clone();
        tracing::debug!(tool = %name, "Tool call");

        if self.memory.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.memory, request, context);
            return self.memory.router().call(ctx).await;
        }
        if self.session.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.session, request, context);
            return self.session.router().call(ctx).await;
        }
        if self.files.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.files, request, context);
            return self.files.router().call(ctx).await;
        }
        if self.shell.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.shell, request, context);
            return self.shell.router().call(ctx).await;
        }
        if self.web.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.web, request, context);
            return self.web.router().call(ctx).await;
        }
        if self.code.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.code, request, context);
            return self.code.router().call(ctx).await;
        }
        if self.project.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.project, request, context);
            return self.project.router().call(ctx).await;
        }
        if self.system.router().has_route(&name) {
            let ctx = ToolCallContext::new(&self.system, request, context);
            return self.system.router().call(ctx).await;
        }

        tracing::warn!(tool = %name, "Unknown tool");
        Err(McpError::invalid_params(
            format!("Unknown tool: {}", name),
            None,
        ))
    }
}
