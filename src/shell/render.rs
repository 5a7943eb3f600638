//! Markdown rendering of shell tool results.

use crate::render::{percent, truncate_with_ellipsis};

use super::history::CommandHistoryView;
use super::tool::{EnvOutcome, Execution, ScriptRun, ShellEntry, SystemInfo};
use super::discovery::ShellInfo;

pub fn execution(exec: &Execution, show_analysis: bool) -> String {
    let mut lines = vec![
        format!("## Command Executed: `{}`", exec.command),
        String::new(),
        format!("- **Shell:** {} ({})", exec.shell.name, exec.shell.key),
        format!("- **Directory:** `{}`", exec.working_dir.display()),
        format!("- **Exit Code:** {}", exec.output.exit_code),
        format!(
            "- **Execution Time:** {:.2}s",
            exec.output.duration.as_secs_f64()
        ),
    ];
    if exec.output.timed_out {
        lines.push(format!(
            "- **Timed Out:** command exceeded {}s limit",
            exec.timeout_secs
        ));
    }

    if show_analysis {
        let analysis = &exec.analysis;
        lines.push(format!("- **Type:** {}", analysis.command_type.as_str()));
        let status = if analysis.likely_successful {
            Some("Likely successful")
        } else if analysis.contains_errors {
            Some("Contains errors")
        } else if analysis.contains_warnings {
            Some("Contains warnings")
        } else {
            None
        };
        if let Some(status) = status {
            lines.push(format!("- **Status:** {}", status));
        }
    }
    lines.push(String::new());

    if !exec.output.stdout.is_empty() {
        lines.push("**Output:**".to_string());
        lines.push(format!("```\n{}\n```", exec.output.stdout.trim_end()));
    }
    if !exec.output.stderr.is_empty() {
        lines.push("**Error Output:**".to_string());
        lines.push(format!("```\n{}\n```", exec.output.stderr.trim_end()));
    }
    if exec.output.stdout.is_empty() && exec.output.stderr.is_empty() {
        lines.push("_No output produced._".to_string());
    }
    lines.join("\n")
}

pub fn shells(entries: &[ShellEntry], show_details: bool) -> String {
    if entries.is_empty() {
        return "No shell environments detected.".to_string();
    }

    let mut lines = vec![format!(
        "## Available Shell Environments ({} total)",
        entries.len()
    )];
    if let Some(default) = entries.iter().find(|e| e.is_default) {
        lines.push(format!(
            "**Default Shell:** {} ({})",
            default.info.key, default.info.name
        ));
    }
    lines.push(String::new());

    for entry in entries {
        let marker = if entry.is_default { " (default)" } else { "" };
        lines.push(format!(
            "### {} - {}{}",
            entry.info.key, entry.info.name, marker
        ));
        lines.push(format!("- Path: `{}`", entry.info.executable.display()));
        lines.push(format!("- Type: {}", entry.info.kind.as_str()));
        if show_details && !entry.info.capabilities.is_empty() {
            lines.push(format!(
                "- Capabilities: {}",
                entry.info.capabilities.join(", ")
            ));
        }
        match &entry.version {
            Some(Some(version)) => lines.push(format!("- Version: {}", version)),
            Some(None) => lines.push("- Version: not reported".to_string()),
            None => {}
        }
        lines.push(String::new());
    }

    lines.push("**Usage:** `bb7_execute_command` with `{\"command\": \"ls -la\", \"shell\": \"bash\"}`".to_string());
    lines.join("\n")
}

pub fn default_set(shell: &ShellInfo) -> String {
    format!("Default shell set: {} ({})", shell.name, shell.key)
}

pub fn history(view: &CommandHistoryView, show_analysis: bool) -> String {
    if view.stats.total == 0 {
        return "No command history available yet.".to_string();
    }

    let mut lines = vec![
        format!(
            "## Command History (last {} commands)",
            view.records.len()
        ),
        String::new(),
    ];

    if show_analysis {
        let stats = &view.stats;
        lines.push("**Statistics:**".to_string());
        lines.push(format!("- Total Commands: {}", stats.total));
        lines.push(format!(
            "- Success Rate: {:.1}%",
            percent(stats.succeeded, stats.total)
        ));
        lines.push(format!(
            "- Average Execution Time: {:.2}s",
            stats.average_duration.as_secs_f64()
        ));
        match &stats.most_used_shell {
            Some((shell, count)) => lines.push(format!(
                "- Most Used Shell: {} ({} commands)",
                shell, count
            )),
            None => lines.push("- Most Used Shell: None".to_string()),
        }
        lines.push(String::new());
    }

    lines.push("**Recent Commands:**".to_string());
    if view.records.is_empty() {
        lines.push("_No commands match the filter._".to_string());
    }
    for record in &view.records {
        lines.push(format!(
            "- {} [{}] [{}] `{}` ({:.2}s)",
            record.timestamp.format("%H:%M:%S"),
            if record.success { "ok" } else { "failed" },
            record.shell,
            truncate_with_ellipsis(&record.command, 60),
            record.duration.as_secs_f64()
        ));
    }
    lines.join("\n")
}

pub fn system_info(info: &SystemInfo) -> String {
    [
        "## System Information".to_string(),
        String::new(),
        format!("- **Operating System:** {}", info.os),
        format!("- **Architecture:** {}", info.arch),
        format!("- **Family:** {}", info.family),
        format!("- **Hostname:** {}", info.hostname),
        format!("- **User:** {}", info.user),
        format!("- **Current Directory:** `{}`", info.cwd.display()),
        format!("- **CPU Cores:** {}", info.cpu_count),
        format!(
            "- **Available Shells:** {}",
            if info.shells.is_empty() {
                "none".to_string()
            } else {
                info.shells.join(", ")
            }
        ),
        format!("- **Default Shell:** {}", info.default_shell),
        format!("- **Overlay Variables:** {}", info.overlay_size),
    ]
    .join("\n")
}

pub fn environment(outcome: &EnvOutcome) -> String {
    match outcome {
        EnvOutcome::Listing(listing) => {
            let mut lines = vec![
                "## Environment Variables".to_string(),
                String::new(),
                "**Important Variables:**".to_string(),
            ];
            for (name, value) in &listing.important {
                lines.push(format!("- **{}:** `{}`", name, value));
            }
            if !listing.overlay.is_empty() {
                lines.push(String::new());
                lines.push("**Overlay Variables** (applied to spawned commands):".to_string());
                for (name, value) in &listing.overlay {
                    lines.push(format!("- **{}:** `{}`", name, value));
                }
            }
            lines.push(String::new());
            lines.push(format!("**Total Variables:** {}", listing.total));
            lines.join("\n")
        }
        EnvOutcome::Set { name, value } => format!(
            "Environment variable set: {} = `{}` (applies to spawned commands)",
            name,
            super::environment::display_value(name, value)
        ),
        EnvOutcome::Unset { name, removed } => {
            if *removed {
                format!("Environment variable removed: {}", name)
            } else {
                format!("Variable '{}' not found in overlay", name)
            }
        }
        EnvOutcome::Export { name, lines } => {
            let mut out = match name {
                Some(name) => format!("## Variable exported: {}\n\n", name),
                None => "## Overlay export\n\n".to_string(),
            };
            if lines.is_empty() {
                out.push_str("_Overlay is empty._");
            } else {
                out.push_str(&format!("```bash\n{}\n```", lines.join("\n")));
            }
            out
        }
    }
}

pub fn script(run: &ScriptRun, show_analysis: bool) -> String {
    let mut lines = vec![
        format!("## Script Executed: {}", run.execution.shell.name),
        String::new(),
        format!("- **Script Length:** {} characters", run.length),
        format!("- **Script File:** `{}`", run.path.display()),
    ];
    if run.saved {
        lines.push("- **Saved:** yes".to_string());
    }
    lines.push(String::new());
    lines.push(execution(&run.execution, show_analysis));
    lines.join("\n")
}
