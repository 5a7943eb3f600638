//! Tests for ShellTool against the host's `sh`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::shell::discovery::MockShellLocator;
use crate::shell::render;
use crate::shell::{
    CommandType, EnvAction, EnvOutcome, ExecRequest, ScriptRequest, ShellError, ShellTool,
    SystemLocator, script_path,
};

fn setup() -> (TempDir, ShellTool) {
    let temp = TempDir::new().unwrap();
    let tool = ShellTool::new(temp.path().join("scripts"), &SystemLocator);
    (temp, tool)
}

fn sh(command: &str) -> ExecRequest {
    ExecRequest {
        command: command.to_string(),
        shell: Some("sh".to_string()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_captures_output_and_records_history() {
    let (_temp, tool) = setup();

    let exec = tool.execute(sh("echo hello")).await.expect("sh runs");
    assert_eq!(exec.output.stdout.trim(), "hello");
    assert_eq!(exec.output.exit_code, 0);
    assert_eq!(exec.analysis.command_type, CommandType::OutputText);
    assert!(exec.analysis.likely_successful);
    assert_eq!(exec.timeout_secs, 300);

    let view = tool.history(10, None);
    assert_eq!(view.stats.total, 1);
    assert_eq!(view.records[0].command, "echo hello");
    assert_eq!(view.records[0].shell, "sh");

    let text = render::execution(&exec, true);
    assert!(text.contains("**Exit Code:** 0"));
    assert!(text.contains("**Type:** output_text"));
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_reports_non_zero_exit_and_stderr() {
    let (_temp, tool) = setup();

    let exec = tool
        .execute(sh("echo 'error: broken' >&2; exit 3"))
        .await
        .unwrap();
    assert_eq!(exec.output.exit_code, 3);
    assert!(exec.analysis.contains_errors);
    assert!(!exec.analysis.success);
    assert_eq!(tool.history(5, None).stats.succeeded, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_times_out_with_negative_exit() {
    let (_temp, tool) = setup();

    let exec = tool
        .execute(ExecRequest {
            timeout_secs: Some(1),
            ..sh("sleep 5")
        })
        .await
        .unwrap();
    assert!(exec.output.timed_out);
    assert_eq!(exec.output.exit_code, -1);
    assert!(render::execution(&exec, false).contains("exceeded 1s limit"));
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_strips_ansi_sequences() {
    let (_temp, tool) = setup();

    let exec = tool
        .execute(sh(r"printf '\033[31mred\033[0m'"))
        .await
        .unwrap();
    assert_eq!(exec.output.stdout, "red");
}

#[tokio::test(flavor = "multi_thread")]
async fn overlay_and_call_environment_reach_the_child() {
    let (_temp, tool) = setup();
    tool.manage_environment(EnvAction::Set, Some("BB7_GREETING"), Some("overlay"))
        .unwrap();

    let exec = tool.execute(sh("echo $BB7_GREETING")).await.unwrap();
    assert_eq!(exec.output.stdout.trim(), "overlay");

    let exec = tool
        .execute(ExecRequest {
            environment: HashMap::from([("BB7_GREETING".to_string(), "call".to_string())]),
            ..sh("echo $BB7_GREETING")
        })
        .await
        .unwrap();
    assert_eq!(exec.output.stdout.trim(), "call");

    // The server's own environment stays untouched.
    assert!(std::env::var("BB7_GREETING").is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_in_working_directory() {
    let (temp, tool) = setup();
    let dir = temp.path().join("work");
    std::fs::create_dir(&dir).unwrap();

    let exec = tool
        .execute(ExecRequest {
            working_dir: Some(dir.to_string_lossy().into_owned()),
            ..sh("pwd")
        })
        .await
        .unwrap();
    assert_eq!(
        Path::new(exec.output.stdout.trim()).canonicalize().unwrap(),
        dir.canonicalize().unwrap()
    );

    let missing = tool
        .execute(ExecRequest {
            working_dir: Some(temp.path().join("nope").to_string_lossy().into_owned()),
            ..sh("pwd")
        })
        .await;
    assert!(matches!(missing, Err(ShellError::WorkingDirNotFound { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn execute_rejects_empty_command_and_unknown_shell() {
    let (_temp, tool) = setup();

    assert!(matches!(
        tool.execute(sh("   ")).await,
        Err(ShellError::InvalidInput { .. })
    ));
    assert!(matches!(
        tool.execute(ExecRequest {
            shell: Some("cmd.exe".to_string()),
            ..sh("dir")
        })
        .await,
        Err(ShellError::UnknownShell { .. })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn script_is_removed_unless_saved() {
    let (temp, tool) = setup();

    let run = tool
        .run_script(ScriptRequest {
            script: "echo one\necho two\n".to_string(),
            shell: Some("sh".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(run.execution.output.stdout, "one\ntwo\n");
    assert!(!run.path.exists());
    assert!(run.path.starts_with(temp.path().join("scripts")));

    let saved = tool
        .run_script(ScriptRequest {
            script: "echo kept".to_string(),
            shell: Some("sh".to_string()),
            save: true,
            name: Some("deploy".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(saved.path, temp.path().join("scripts/deploy.sh"));
    assert!(saved.path.exists());
    assert!(render::script(&saved, true).contains("**Saved:** yes"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&saved.path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }
}

#[test]
fn script_names_are_sanitized() {
    let dir = PathBuf::from("/data/scripts");
    assert_eq!(
        script_path(&dir, Some("../evil/name"), ".sh"),
        dir.join("..evilname.sh")
    );
    assert_eq!(script_path(&dir, Some("build.sh"), ".sh"), dir.join("build.sh"));
    let generated = script_path(&dir, None, ".py");
    let name = generated.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("script_"));
    assert!(name.ends_with(".py"));
}

#[test]
fn environment_actions_render() {
    let (_temp, tool) = setup();

    let set = tool
        .manage_environment(EnvAction::Set, Some("API_TOKEN"), Some("abc"))
        .unwrap();
    assert!(render::environment(&set).contains("********"));

    let export = tool
        .manage_environment(EnvAction::Export, Some("REGION"), Some("eu"))
        .unwrap();
    match &export {
        EnvOutcome::Export { name, lines } => {
            assert_eq!(name.as_deref(), Some("REGION"));
            assert!(lines.contains(&"export REGION='eu'".to_string()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    let unset = tool
        .manage_environment(EnvAction::Unset, Some("MISSING"), None)
        .unwrap();
    assert_eq!(
        unset,
        EnvOutcome::Unset {
            name: "MISSING".to_string(),
            removed: false
        }
    );

    assert!(matches!(
        tool.manage_environment(EnvAction::Set, None, Some("x")),
        Err(ShellError::InvalidInput { .. })
    ));

    let listing = tool.manage_environment(EnvAction::List, None, None).unwrap();
    assert!(render::environment(&listing).contains("**Overlay Variables**"));
}

#[test]
fn list_shells_reports_versions_on_request() {
    let temp = TempDir::new().unwrap();
    let mut locator = MockShellLocator::new();
    locator
        .expect_locate()
        .returning(|program| (program == "sh").then(|| PathBuf::from("/bin/sh")));
    locator.expect_version().times(1).returning(|_| None);

    let tool = ShellTool::new(temp.path(), &locator);

    let quiet = tool.list_shells(&locator, false);
    assert_eq!(quiet.len(), 1);
    assert!(quiet[0].is_default);
    assert!(quiet[0].version.is_none());

    let checked = tool.list_shells(&locator, true);
    assert_eq!(checked[0].version, Some(None));
    assert!(render::shells(&checked, true).contains("not reported"));
}

#[test]
fn system_info_lists_shells() {
    let (_temp, tool) = setup();
    let info = tool.system_info();
    assert!(info.shells.contains(&"sh".to_string()));
    assert!(info.cpu_count >= 1);
    assert!(!info.hostname.is_empty());
    if let Some(host) = sysinfo::System::host_name().filter(|h| !h.is_empty()) {
        assert_eq!(info.hostname, host);
    }
    let text = render::system_info(&info);
    assert!(text.contains("## System Information"));
    assert!(text.contains(&format!("- **Hostname:** {}", info.hostname)));
}
