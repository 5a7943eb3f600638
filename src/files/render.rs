//! Markdown rendering of file tool results.

use crate::render::{format_bytes, markdown_table, percent};

use super::history::HistoryView;
use super::inspect::ContentAnalysis;
use super::listing::{DirectoryListing, SearchResults};
use super::ops::{DeleteResult, FileContent, FileInfo, ReadResult, TransferResult, WriteResult};

fn analysis_line(analysis: &ContentAnalysis) -> String {
    let mut parts = vec![
        analysis.language.to_string(),
        format!("{} lines", analysis.lines),
        format!("{} chars", analysis.characters),
        format!("{} words", analysis.words),
    ];
    if analysis.functions > 0 {
        parts.push(format!("{} functions", analysis.functions));
    }
    if analysis.classes > 0 {
        parts.push(format!("{} classes", analysis.classes));
    }
    if analysis.imports > 0 {
        parts.push(format!("{} imports", analysis.imports));
    }
    if analysis.potential_secrets > 0 {
        parts.push(format!(
            "WARNING: {} potential secret markers",
            analysis.potential_secrets
        ));
    }
    parts.join(" | ")
}

pub fn read(result: &ReadResult, show_analysis: bool) -> String {
    match &result.content {
        FileContent::Binary {
            signature,
            mime,
            hex,
        } => format!(
            "## Binary File: `{}`\n\n- **Size:** {} ({} bytes)\n- **Type:** {}\n- **MIME:** {}\n\n\
             **Hex preview (first 512 bytes):**\n```\n{}\n```",
            result.path.display(),
            format_bytes(result.size),
            result.size,
            signature.unwrap_or("Unknown"),
            mime,
            hex
        ),
        FileContent::Text {
            content,
            fence,
            analysis,
        } => {
            let mut out = format!("## File: `{}`\n\n", result.path.display());
            if show_analysis {
                out.push_str(&format!("**Analysis:** {}\n\n", analysis_line(analysis)));
            }
            out.push_str(&format!("```{}\n{}\n```", fence, content));
            out
        }
    }
}

pub fn written(result: &WriteResult) -> String {
    let verb = if result.appended { "Appended" } else { "Written" };
    let mut lines = vec![
        format!("## File {}: `{}`", verb, result.path.display()),
        String::new(),
        format!("- **Bytes:** {}", result.bytes_written),
        format!("- **Language:** {}", result.analysis.language),
        format!("- **Lines:** {}", result.analysis.lines),
    ];
    if let Some(backup) = &result.backup {
        lines.push(format!("- **Backup:** {}", backup.display()));
    }
    if result.executable {
        lines.push("- **Permissions:** executable".to_string());
    }
    if result.analysis.potential_secrets > 0 {
        lines.push(format!(
            "- **Warning:** {} potential secret markers in content",
            result.analysis.potential_secrets
        ));
    }
    lines.join("\n")
}

pub fn copied(result: &TransferResult) -> String {
    format!(
        "Copied {} `{}` -> `{}` ({}, {} items)",
        if result.is_dir { "directory" } else { "file" },
        result.source.display(),
        result.destination.display(),
        format_bytes(result.bytes),
        result.items
    )
}

pub fn moved(result: &TransferResult) -> String {
    format!(
        "Moved {} `{}` -> `{}`",
        if result.is_dir { "directory" } else { "file" },
        result.source.display(),
        result.destination.display()
    )
}

pub fn deleted(result: &DeleteResult) -> String {
    let mut out = format!(
        "Deleted {} `{}`",
        if result.is_dir { "directory" } else { "file" },
        result.path.display()
    );
    if let Some(backup) = &result.backup {
        out.push_str(&format!("\nBackup: `{}`", backup.display()));
    }
    out
}

pub fn listing(listing: &DirectoryListing, show_details: bool) -> String {
    let mut out = format!(
        "## Directory: `{}`\n\n**Summary:** {} directories, {} files, {}",
        listing.path.display(),
        listing.dir_count,
        listing.file_count,
        format_bytes(listing.total_size)
    );
    if listing.total_items > listing.entries.len() {
        out.push_str(&format!(
            " (showing {} of {} items)",
            listing.entries.len(),
            listing.total_items
        ));
    }
    out.push_str("\n\n");

    if listing.entries.is_empty() {
        out.push_str("_Empty directory._");
        return out;
    }

    if show_details {
        let rows = listing.entries.iter().map(|e| {
            vec![
                if e.is_dir {
                    format!("{}/", e.name)
                } else {
                    e.name.clone()
                },
                if e.is_dir {
                    "-".to_string()
                } else {
                    format_bytes(e.size)
                },
                e.modified
                    .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                e.permissions.clone(),
                e.kind.clone(),
            ]
        });
        out.push_str(&markdown_table(
            &["Name", "Size", "Modified", "Mode", "Type"],
            rows,
        ));
    } else {
        let names: Vec<String> = listing
            .entries
            .iter()
            .map(|e| {
                if e.is_dir {
                    format!("- {}/", e.name)
                } else {
                    format!("- {}", e.name)
                }
            })
            .collect();
        out.push_str(&names.join("\n"));
    }

    if !listing.extensions.is_empty() {
        out.push_str("\n\n**File Types:**\n");
        let types: Vec<String> = listing
            .extensions
            .iter()
            .map(|(ext, count)| format!("- {}: {} files", ext, count))
            .collect();
        out.push_str(&types.join("\n"));
    }
    out
}

pub fn search(results: &SearchResults, name_pattern: &str, content_pattern: Option<&str>) -> String {
    if results.hits.is_empty() {
        return format!(
            "No files found matching `{}` in `{}`",
            name_pattern,
            results.directory.display()
        );
    }

    let mut lines = vec![
        format!(
            "## Search Results: {} files in {:.2}s",
            results.hits.len(),
            results.elapsed.as_secs_f64()
        ),
        String::new(),
        format!("- **Directory:** `{}`", results.directory.display()),
        format!("- **Pattern:** `{}`", name_pattern),
    ];
    if let Some(content) = content_pattern {
        lines.push(format!("- **Content:** `{}`", content));
    }
    lines.push(String::new());

    for hit in &results.hits {
        let size = if hit.size == 0 {
            "empty".to_string()
        } else {
            format_bytes(hit.size)
        };
        let modified = hit
            .modified
            .map(|m| m.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        lines.push(format!("- `{}` ({}) {}", hit.name, size, modified));
        lines.push(format!("  `{}`", hit.path.display()));
    }
    lines.join("\n")
}

pub fn info(info: &FileInfo) -> String {
    let time = |t: Option<chrono::DateTime<chrono::Local>>| {
        t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    };

    let mut lines = vec![
        format!("## File Information: `{}`", info.path.display()),
        String::new(),
        format!(
            "- **Type:** {}",
            if info.is_dir { "Directory" } else { "File" }
        ),
        format!("- **Size:** {} ({} bytes)", format_bytes(info.size), info.size),
        format!("- **Permissions:** {}", info.permissions),
        format!("- **Created:** {}", time(info.created)),
        format!("- **Modified:** {}", time(info.modified)),
        format!("- **Accessed:** {}", time(info.accessed)),
    ];

    if let Some(mime) = &info.mime {
        lines.push(format!("- **MIME Type:** {}", mime));
    }
    if let Some(signature) = info.signature {
        lines.push(format!("- **Signature:** {}", signature));
    }
    if info.is_executable {
        lines.push("- **Executable:** yes".to_string());
    }
    if let Some(text) = &info.text {
        lines.push(format!("- **Language:** {}", text.language));
        lines.push(format!("- **Lines:** {}", text.lines));
        lines.push(format!("- **Words:** {}", text.words));
        lines.push(format!("- **Characters:** {}", text.characters));
        if text.potential_secrets > 0 {
            lines.push(format!(
                "- **Potential Secrets:** {}",
                text.potential_secrets
            ));
        }
    }
    if let Some((files, dirs, bytes)) = info.contents {
        lines.push(format!(
            "- **Contents:** {} files, {} directories",
            files, dirs
        ));
        lines.push(format!("- **Total Size:** {}", format_bytes(bytes)));
    }
    lines.join("\n")
}

pub fn history(view: &HistoryView) -> String {
    if view.counts.is_empty() {
        return "No file operations recorded yet.".to_string();
    }

    let mut lines = vec![
        format!(
            "## File Operation History (last {} operations)",
            view.operations.len()
        ),
        String::new(),
        format!(
            "**Success rate:** {:.1}% of {} matching operations",
            percent(view.succeeded, view.total),
            view.total
        ),
        String::new(),
        "**Operation Summary:**".to_string(),
    ];
    for (operation, count) in &view.counts {
        lines.push(format!("- {}: {} times", operation, count));
    }

    lines.push(String::new());
    lines.push("**Recent Operations:**".to_string());
    for op in &view.operations {
        lines.push(format!(
            "- {} **{}** `{}` [{}]{}",
            op.timestamp.format("%H:%M:%S"),
            op.operation,
            op.path,
            if op.success { "ok" } else { "failed" },
            op.detail
                .as_ref()
                .map(|d| format!(" {}", d))
                .unwrap_or_default()
        ));
    }
    lines.join("\n")
}
