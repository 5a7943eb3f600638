//! Tests for shell MCP tools

use std::sync::Arc;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, ErrorCode, RawContent};
use tempfile::TempDir;

use crate::mcp::tools::shell::{
    CommandHistoryParams, ExecuteCommandParams, ManageEnvironmentParams, ShellScriptingParams,
    ShellTools,
};
use crate::session::SessionManager;
use crate::shell::{ShellTool, SystemLocator};

fn setup() -> (TempDir, Arc<SessionManager>, ShellTools) {
    let dir = TempDir::new().unwrap();
    let sessions = Arc::new(SessionManager::new(dir.path().join("sessions")));
    let shell = Arc::new(ShellTool::new(dir.path().join("scripts"), &SystemLocator));
    let tools = ShellTools::new(shell, Arc::clone(&sessions));
    (dir, sessions, tools)
}

fn text(result: &CallToolResult) -> &str {
    match &result.content[0].raw {
        RawContent::Text(text) => text.text.as_str(),
        _ => panic!("Expected text content"),
    }
}

fn command(cmd: &str) -> Parameters<ExecuteCommandParams> {
    Parameters(ExecuteCommandParams {
        command: cmd.to_string(),
        shell: Some("sh".to_string()),
        working_dir: None,
        timeout: Some(10),
        environment: None,
        show_analysis: None,
    })
}

fn env(action: &str, variable: Option<&str>, value: Option<&str>) -> Parameters<ManageEnvironmentParams> {
    Parameters(ManageEnvironmentParams {
        action: Some(action.to_string()),
        variable: variable.map(str::to_string),
        value: value.map(str::to_string),
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn test_execute_command_and_history() {
    let (_dir, _sessions, tools) = setup();

    let result = tools.execute_command(command("echo hi")).await.unwrap();
    let out = text(&result);
    assert!(out.contains("## Command Executed: `echo hi`"));
    assert!(out.contains("- **Exit Code:** 0"));
    assert!(out.contains("hi"));

    let history = tools
        .command_history(Parameters(CommandHistoryParams {
            limit: None,
            shell_filter: Some("sh".to_string()),
            show_analysis: None,
        }))
        .await
        .unwrap();
    assert!(text(&history).contains("echo hi"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_execute_is_tracked_in_active_session() {
    let (_dir, sessions, tools) = setup();
    sessions
        .start(Some("run things".to_string()), Vec::new(), None)
        .await
        .unwrap();

    tools.execute_command(command("true")).await.unwrap();

    let session = sessions.summary(None).await.unwrap().unwrap();
    assert_eq!(session.commands_run, vec!["true".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_working_dir_is_not_found() {
    let (dir, _sessions, tools) = setup();

    let mut params = command("pwd");
    params.0.working_dir = Some(dir.path().join("gone").display().to_string());
    let err = tools
        .execute_command(params)
        .await
        .expect_err("missing directory should fail");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_environment_overlay_reaches_commands() {
    let (_dir, _sessions, tools) = setup();

    let set = tools
        .manage_environment(env("set", Some("BB7_GREETING"), Some("howdy")))
        .await
        .unwrap();
    assert!(text(&set).starts_with("Environment variable set: BB7_GREETING"));

    let listed = tools.manage_environment(env("list", None, None)).await.unwrap();
    assert!(text(&listed).contains("**Overlay Variables**"));

    let run = tools
        .execute_command(command("echo $BB7_GREETING"))
        .await
        .unwrap();
    assert!(text(&run).contains("howdy"));

    let unset = tools
        .manage_environment(env("unset", Some("BB7_GREETING"), None))
        .await
        .unwrap();
    assert_eq!(text(&unset), "Environment variable removed: BB7_GREETING");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_environment_rejects_unknown_action() {
    let (_dir, _sessions, tools) = setup();

    let err = tools
        .manage_environment(env("rotate", None, None))
        .await
        .expect_err("unknown action should fail");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_system_info() {
    let (_dir, _sessions, tools) = setup();

    let info = tools.get_system_info().await.unwrap();
    let info = text(&info);
    assert!(info.starts_with("## System Information"));
    assert!(info.contains("- **CPU Cores:**"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_saved_script_runs() {
    let (dir, _sessions, tools) = setup();

    let result = tools
        .shell_scripting(Parameters(ShellScriptingParams {
            script: "echo from-script".to_string(),
            shell: Some("sh".to_string()),
            save_script: Some(true),
            script_name: Some("hello".to_string()),
            working_dir: None,
            timeout: Some(10),
            show_analysis: Some(false),
        }))
        .await
        .unwrap();
    let out = text(&result);
    assert!(out.contains("## Script Executed:"));
    assert!(out.contains("- **Saved:** yes"));
    assert!(out.contains("from-script"));
    assert!(dir.path().join("scripts").read_dir().unwrap().next().is_some());
}
