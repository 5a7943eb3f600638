use std::time::Duration;

use super::sandbox::{
    ExecutionHistory, HISTORY_LIMIT, blocked_reason, clamp_timeout, error_hint, rate,
};
use super::*;

fn python_available() -> bool {
    which::which("python3").is_ok()
}

#[test]
fn block_list_catches_dangerous_code() {
    assert_eq!(blocked_reason("import os\nos.listdir('.')"), Some("OS module import"));
    assert_eq!(
        blocked_reason("from subprocess import run"),
        Some("System module import")
    );
    assert_eq!(
        blocked_reason("open('x.txt', 'w').write('hi')"),
        Some("File write operation")
    );
    assert_eq!(blocked_reason("globals()['x'] = 1"), Some("Global namespace access"));
    assert_eq!(blocked_reason("print(sum(range(10)))"), None);
    assert_eq!(blocked_reason("with open('x.txt') as f: pass"), None);
}

#[test]
fn timeouts_are_clamped() {
    assert_eq!(clamp_timeout(None), 10);
    assert_eq!(clamp_timeout(Some(0)), 1);
    assert_eq!(clamp_timeout(Some(120)), 30);
}

#[test]
fn error_hints_match_exception_names() {
    assert!(error_hint("ZeroDivisionError: division by zero").starts_with("Zero Division"));
    assert!(error_hint("IndentationError: unexpected indent").starts_with("Indentation"));
    assert!(error_hint("NameError: name 'x' is not defined").starts_with("Name Error"));
    assert!(error_hint("boom").starts_with("Check the error message"));
}

#[test]
fn performance_ratings() {
    let fast = rate(Duration::from_micros(500));
    assert_eq!((fast.speed, fast.efficiency, fast.resources), ("Very Fast", "Good", "Low"));
    let moderate = rate(Duration::from_millis(60));
    assert_eq!(
        (moderate.speed, moderate.efficiency, moderate.resources),
        ("Moderate", "Fair", "Medium")
    );
    let slow = rate(Duration::from_millis(250));
    assert_eq!((slow.speed, slow.efficiency, slow.resources), ("Slow", "Poor", "High"));
}

#[test]
fn history_is_capped_and_summarized() {
    let ok = sandbox::Execution {
        success: true,
        timed_out: false,
        exit_code: 0,
        output: "1\n".to_string(),
        stderr: String::new(),
        elapsed: Duration::from_millis(20),
        timeout_secs: 10,
    };
    let failed = sandbox::Execution {
        success: false,
        exit_code: 1,
        elapsed: Duration::from_millis(40),
        ..ok.clone()
    };

    let mut history = ExecutionHistory::default();
    history.push("print(1)", &ok);
    history.push("1/0", &failed);
    let stats = history.stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.success_rate, 0.5);
    assert_eq!(stats.avg_elapsed, Duration::from_millis(30));

    for _ in 0..HISTORY_LIMIT {
        history.push("print(1)", &ok);
    }
    assert_eq!(history.len(), HISTORY_LIMIT);
    assert_eq!(history.stats().success_rate, 1.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn blocked_code_never_runs() {
    let sandbox = Sandbox::new("definitely-not-an-interpreter-bb7");
    let outcome = sandbox
        .execute("import subprocess", None, true, true)
        .await
        .unwrap();
    assert!(matches!(outcome, SandboxOutcome::Blocked { reason: "Subprocess module import" }));

    let markdown = render::execution("import subprocess", &outcome);
    assert!(markdown.contains("**Execution blocked:**"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_interpreter_is_reported() {
    let sandbox = Sandbox::new("definitely-not-an-interpreter-bb7");
    let err = sandbox.execute("print(1)", None, true, true).await.unwrap_err();
    assert!(matches!(err, AnalysisError::InterpreterNotFound { .. }));
    assert!(matches!(
        sandbox.execute("   ", None, true, true).await,
        Err(AnalysisError::EmptyCode)
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn runs_python_and_records_history() {
    if !python_available() {
        return;
    }
    let sandbox = Sandbox::default();
    let code = "def square(n):\n    return n * n\n\nprint(square(7))\n";

    let SandboxOutcome::Ran(run) = sandbox.execute(code, Some(5), true, true).await.unwrap() else {
        panic!("code should not be blocked");
    };
    assert!(run.execution.success);
    assert_eq!(run.execution.output.trim(), "49");
    assert_eq!(run.analysis.as_ref().unwrap().functions_defined, vec!["square"]);
    assert!(run.performance.is_some());
    assert!(run.stats.is_none());

    let SandboxOutcome::Ran(failed) = sandbox.execute("print(1/0)", None, true, true).await.unwrap()
    else {
        panic!("code should not be blocked");
    };
    assert!(!failed.execution.success);
    assert_eq!(
        failed.execution.error(),
        Some("ZeroDivisionError: division by zero")
    );
    let stats = failed.stats.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.success_rate, 0.5);

    let markdown = render::execution("print(1/0)", &SandboxOutcome::Ran(failed));
    assert!(markdown.contains("- **Status:** Failed"));
    assert!(markdown.contains("**Error Analysis:** Zero Division Error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn output_capture_can_be_disabled() {
    if !python_available() {
        return;
    }
    let sandbox = Sandbox::default();
    let SandboxOutcome::Ran(run) = sandbox
        .execute("print('hidden')", None, false, false)
        .await
        .unwrap()
    else {
        panic!("code should not be blocked");
    };
    assert!(run.execution.success);
    assert!(run.execution.output.is_empty());
    assert!(run.analysis.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn runaway_code_is_killed() {
    if !python_available() {
        return;
    }
    let sandbox = Sandbox::default();
    let SandboxOutcome::Ran(run) = sandbox
        .execute("while True:\n    pass\n", Some(1), true, true)
        .await
        .unwrap()
    else {
        panic!("code should not be blocked");
    };
    assert!(run.execution.timed_out);
    assert!(!run.execution.success);
}
