//! MCP tools for file operations.

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

use crate::files::{
    FileError, FileTool, ListOptions, ReadOptions, SearchOptions, SortBy, WriteOptions, render,
};
use crate::session::SessionManager;

use super::{blocking, internal, invalid, markdown, not_found};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadFileParams {
    #[schemars(description = "Path of the file to read")]
    pub path: String,
    #[schemars(description = "Maximum file size in bytes (default: 10 MiB)")]
    pub max_size: Option<u64>,
    #[schemars(description = "Read as text even when the file looks binary (default: false)")]
    pub force_text: Option<bool>,
    #[schemars(description = "Include content analysis (default: true)")]
    pub show_analysis: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    #[schemars(description = "Path of the file to write")]
    pub path: String,
    #[schemars(description = "Content to write")]
    pub content: String,
    #[schemars(description = "Back up an existing file first (default: true)")]
    pub create_backup: Option<bool>,
    #[schemars(description = "Set the executable bits (default: false)")]
    pub make_executable: Option<bool>,
    #[schemars(description = "Append instead of overwriting (default: false)")]
    pub append: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CopyFileParams {
    #[schemars(description = "Source file or directory")]
    pub source: String,
    #[schemars(description = "Destination path")]
    pub destination: String,
    #[schemars(description = "Replace an existing destination (default: false)")]
    pub overwrite: Option<bool>,
    #[schemars(description = "Keep permissions and timestamps (default: true)")]
    pub preserve_metadata: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveFileParams {
    #[schemars(description = "Source file or directory")]
    pub source: String,
    #[schemars(description = "Destination path")]
    pub destination: String,
    #[schemars(description = "Replace an existing destination (default: false)")]
    pub overwrite: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DeleteFileParams {
    #[schemars(description = "File or directory to delete")]
    pub path: String,
    #[schemars(description = "Required to delete a non-empty directory (default: false)")]
    pub force: Option<bool>,
    #[schemars(description = "Keep a copy in the backups directory (default: true)")]
    pub create_backup: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ListDirectoryParams {
    #[schemars(description = "Directory to list (default: .)")]
    pub path: Option<String>,
    #[schemars(description = "Include dotfiles (default: true)")]
    pub show_hidden: Option<bool>,
    #[schemars(description = "Sort by name, size, modified or type (default: name)")]
    pub sort_by: Option<String>,
    #[schemars(description = "Maximum entries shown (default: 200)")]
    pub max_items: Option<usize>,
    #[schemars(description = "Show size, modification time and permissions (default: true)")]
    pub show_details: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchFilesParams {
    #[schemars(description = "Directory to search (default: .)")]
    pub directory: Option<String>,
    #[schemars(description = "Glob matched against file names (default: *)")]
    pub name_pattern: Option<String>,
    #[schemars(description = "Case-insensitive text the file content must contain")]
    pub content_pattern: Option<String>,
    #[schemars(description = "Maximum results (default: 100)")]
    pub max_results: Option<usize>,
    #[schemars(description = "Search hidden files and directories (default: false)")]
    pub include_hidden: Option<bool>,
    #[schemars(description = "Maximum directory depth (default: 10)")]
    pub max_depth: Option<usize>,
    #[schemars(description = "Minimum file size in bytes")]
    #[serde(alias = "file_size_min")]
    pub min_size: Option<u64>,
    #[schemars(description = "Maximum file size in bytes")]
    #[serde(alias = "file_size_max")]
    pub max_size: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct FileInfoParams {
    #[schemars(description = "File or directory path")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OperationHistoryParams {
    #[schemars(description = "Number of operations to show (default: 20)")]
    pub limit: Option<usize>,
    #[schemars(description = "Only show one operation type (read, write, copy, move, delete, list, search, info)")]
    pub operation_type: Option<String>,
}

fn file_error(e: FileError) -> McpError {
    match e {
        FileError::NotFound { .. } => not_found("file_not_found", e),
        FileError::Io { .. } => internal("file_error", e),
        _ => invalid(e),
    }
}

#[derive(Clone)]
pub struct FileTools {
    files: Arc<FileTool>,
    sessions: Arc<SessionManager>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl FileTools {
    pub fn new(files: Arc<FileTool>, sessions: Arc<SessionManager>) -> Self {
        Self {
            files,
            sessions,
            tool_router: Self::tool_router(),
        }
    }

    pub fn router(&self) -> &ToolRouter<Self> {
        &self.tool_router
    }

    #[tool(
        name = "bb7_read_file",
        description = "Read a file. Text files are returned in a fenced block with analysis; binary files get a signature and hex dump."
    )]
    pub async fn read_file(
        &self,
        params: Parameters<ReadFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let mut options = ReadOptions::default();
        if let Some(max_size) = p.max_size {
            options.max_size = max_size;
        }
        options.force_text = p.force_text.unwrap_or(false);

        let files = Arc::clone(&self.files);
        let result = blocking(move || files.read_file(&p.path, &options))
            .await?
            .map_err(file_error)?;
        markdown(render::read(&result, p.show_analysis.unwrap_or(true)))
    }

    #[tool(
        name = "bb7_write_file",
        description = "Write or append to a file, creating parent directories and backing up the previous version."
    )]
    pub async fn write_file(
        &self,
        params: Parameters<WriteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let options = WriteOptions {
            create_backup: p.create_backup.unwrap_or(true),
            make_executable: p.make_executable.unwrap_or(false),
            append: p.append.unwrap_or(false),
        };
        let files = Arc::clone(&self.files);
        let result = blocking(move || files.write_file(&p.path, &p.content, &options))
            .await?
            .map_err(file_error)?;

        if let Err(e) = self
            .sessions
            .track_file(&result.path.display().to_string())
            .await
        {
            tracing::warn!(error = %e, "Failed to track file in session");
        }
        markdown(render::written(&result))
    }

    #[tool(
        name = "bb7_copy_file",
        description = "Copy a file or directory tree."
    )]
    pub async fn copy_file(
        &self,
        params: Parameters<CopyFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let files = Arc::clone(&self.files);
        let result = blocking(move || {
            files.copy(
                &p.source,
                &p.destination,
                p.overwrite.unwrap_or(false),
                p.preserve_metadata.unwrap_or(true),
            )
        })
        .await?
        .map_err(file_error)?;
        markdown(render::copied(&result))
    }

    #[tool(
        name = "bb7_move_file",
        description = "Move or rename a file or directory."
    )]
    pub async fn move_file(
        &self,
        params: Parameters<MoveFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let files = Arc::clone(&self.files);
        let result = blocking(move || {
            files.rename(&p.source, &p.destination, p.overwrite.unwrap_or(false))
        })
        .await?
        .map_err(file_error)?;
        markdown(render::moved(&result))
    }

    #[tool(
        name = "bb7_delete_file",
        description = "Delete a file or directory, keeping a backup unless disabled."
    )]
    pub async fn delete_file(
        &self,
        params: Parameters<DeleteFileParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let files = Arc::clone(&self.files);
        let result = blocking(move || {
            files.delete(
                &p.path,
                p.force.unwrap_or(false),
                p.create_backup.unwrap_or(true),
            )
        })
        .await?
        .map_err(file_error)?;
        markdown(render::deleted(&result))
    }

    #[tool(
        name = "bb7_list_directory",
        description = "List a directory as a table with sizes, times and permissions, plus the most common extensions."
    )]
    pub async fn list_directory(
        &self,
        params: Parameters<ListDirectoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let sort_by: SortBy = p.sort_by.as_deref().unwrap_or_default().parse().map_err(invalid)?;
        let defaults = ListOptions::default();
        let options = ListOptions {
            show_hidden: p.show_hidden.unwrap_or(defaults.show_hidden),
            sort_by,
            max_items: p.max_items.unwrap_or(defaults.max_items).max(1),
        };
        let path = p.path.unwrap_or_else(|| ".".to_string());
        let files = Arc::clone(&self.files);
        let listing = blocking(move || files.list_directory(&path, &options))
            .await?
            .map_err(file_error)?;
        markdown(render::listing(&listing, p.show_details.unwrap_or(true)))
    }

    #[tool(
        name = "bb7_search_files",
        description = "Find files by name glob and optional content, filtered by size and depth."
    )]
    pub async fn search_files(
        &self,
        params: Parameters<SearchFilesParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let defaults = SearchOptions::default();
        let options = SearchOptions {
            name_pattern: p
                .name_pattern
                .filter(|n| !n.trim().is_empty())
                .unwrap_or(defaults.name_pattern),
            content_pattern: p.content_pattern.filter(|c| !c.is_empty()),
            max_results: p.max_results.unwrap_or(defaults.max_results).max(1),
            include_hidden: p.include_hidden.unwrap_or(defaults.include_hidden),
            max_depth: p.max_depth.unwrap_or(defaults.max_depth),
            min_size: p.min_size,
            max_size: p.max_size,
        };
        let directory = p.directory.unwrap_or_else(|| ".".to_string());
        let files = Arc::clone(&self.files);
        let (results, options) = blocking(move || {
            let results = files.search_files(&directory, &options);
            (results, options)
        })
        .await?;
        let results = results.map_err(file_error)?;
        markdown(render::search(
            &results,
            &options.name_pattern,
            options.content_pattern.as_deref(),
        ))
    }

    #[tool(
        name = "bb7_file_info",
        description = "Detailed information about a file or directory: type, size, times, permissions, MIME type and signature."
    )]
    pub async fn file_info(
        &self,
        params: Parameters<FileInfoParams>,
    ) -> Result<CallToolResult, McpError> {
        let files = Arc::clone(&self.files);
        let path = params.0.path;
        let info = blocking(move || files.file_info(&path))
            .await?
            .map_err(file_error)?;
        markdown(render::info(&info))
    }

    #[tool(
        name = "bb7_operation_history",
        description = "Recent file operations, newest first, with a success rate."
    )]
    pub async fn operation_history(
        &self,
        params: Parameters<OperationHistoryParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let operation = p.operation_type.as_deref().map(str::trim).filter(|o| !o.is_empty());
        let view = self
            .files
            .history()
            .recent(p.limit.unwrap_or(20).max(1), operation);
        markdown(render::history(&view))
    }
}
