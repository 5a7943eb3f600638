//! Markdown rendering of project reports.

use crate::render::{format_bytes, markdown_table, percent, title_case};

use super::deps::{Dependency, DependencyReport};
use super::health::HealthReport;
use super::structure::StructureReport;

const MAX_LISTED: usize = 10;
const TOP_EXTENSIONS: usize = 10;

fn bullet_list(out: &mut String, items: &[String]) {
    for item in items {
        out.push_str(&format!("- {}\n", item));
    }
}

pub fn structure(r: &StructureReport) -> String {
    let inv = &r.inventory;
    let mut out = format!(
        "## Project Structure Analysis\n\n- **Root:** `{}`\n- **Size:** {} ({} files, {} directories, {})\n- **Analysis Time:** {:.2}s\n",
        inv.root.display(),
        r.size_category,
        inv.total_files,
        inv.directories,
        format_bytes(inv.total_bytes),
        r.elapsed.as_secs_f64()
    );

    if !inv.by_language.is_empty() {
        out.push_str("\n**Languages:**\n\n");
        let rows = inv.by_language.iter().map(|(language, files)| {
            vec![
                title_case(language),
                files.len().to_string(),
                format!("{:.0}%", percent(files.len(), inv.code_files())),
            ]
        });
        out.push_str(&markdown_table(&["Language", "Files", "Share"], rows));
        out.push('\n');
    }

    let exts = inv.top_extensions(TOP_EXTENSIONS);
    if !exts.is_empty() {
        out.push_str("\n**File Types:** ");
        out.push_str(
            &exts
                .iter()
                .map(|(ext, n)| format!(".{} ({})", ext, n))
                .collect::<Vec<_>>()
                .join(", "),
        );
        out.push('\n');
    }

    if !r.frameworks.is_empty() {
        out.push_str("\n**Frameworks Detected:**\n");
        for (language, found) in &r.frameworks {
            out.push_str(&format!("- {}: {}\n", title_case(language), found.join(", ")));
        }
    }

    let q = &r.quality;
    out.push_str(&format!(
        "\n**Code Quality:**\n- Lines: {} total, {} code, {} comments, {} blank\n\
         - Average File Size: {} characters\n- Test Coverage Estimate: {:.1}%\n\
         - Documentation Files: {}\n",
        q.total_lines,
        q.code_lines,
        q.comment_lines,
        q.blank_lines,
        q.average_file_size,
        q.test_coverage_estimate,
        q.documentation_files
    ));

    out.push_str(&format!(
        "\n**Project Files:**\n- Dependency Files: {}\n- Config Files: {}\n- Test Files: {}\n",
        inv.dependency_files.len(),
        inv.config_files.len(),
        inv.test_files.len()
    ));
    for path in inv.dependency_files.iter().take(MAX_LISTED) {
        out.push_str(&format!("  - `{}`\n", path.display()));
    }

    if !inv.large_files.is_empty() {
        out.push_str("\n**Large Files:**\n");
        for f in inv.large_files.iter().take(MAX_LISTED) {
            out.push_str(&format!("- `{}` ({})\n", f.path.display(), format_bytes(f.size)));
        }
    }

    if let Some(sec) = &r.security {
        out.push_str(&format!(
            "\n**Security Scan:**\n- Score: {}/100\n- Issues: {}\n",
            sec.score,
            sec.issues.len()
        ));
        for issue in sec.issues.iter().take(MAX_LISTED) {
            out.push_str(&format!(
                "  - `{}`: {} (x{})\n",
                issue.file.display(),
                issue.issue,
                issue.count
            ));
        }
    }

    if !r.recommendations.is_empty() {
        out.push_str("\n**Recommendations:**\n");
        bullet_list(&mut out, &r.recommendations);
    }
    out
}

fn dependency_section(out: &mut String, title: &str, deps: &[Dependency]) {
    if deps.is_empty() {
        return;
    }
    out.push_str(&format!("\n**{} Dependencies ({}):**\n", title, deps.len()));
    for dep in deps.iter().take(MAX_LISTED) {
        out.push_str(&format!("- **{}**: {}\n", dep.name, dep.version_or_latest()));
    }
    if deps.len() > MAX_LISTED {
        out.push_str(&format!("- ... and {} more\n", deps.len() - MAX_LISTED));
    }
}

pub fn dependencies(r: &DependencyReport, include_dev: bool, check_security: bool) -> String {
    let mut out = format!(
        "## Project Dependencies\n\n- **Total Dependencies:** {}\n- **Ecosystems:** {}\n- **Dependency Files Found:** {}\n",
        r.total(),
        if r.ecosystems.is_empty() {
            "None detected".to_string()
        } else {
            r.ecosystems.join(", ")
        },
        r.files.len()
    );

    dependency_section(&mut out, "Production", &r.production);
    if include_dev {
        dependency_section(&mut out, "Development", &r.development);
    }

    if check_security {
        let unpinned = r.unpinned();
        out.push_str("\n**Version Pinning:**\n");
        if unpinned.is_empty() {
            out.push_str("- All dependencies declare a bounded version\n");
        } else {
            out.push_str(&format!(
                "- {} unpinned dependencies may pull untested releases\n",
                unpinned.len()
            ));
            for dep in unpinned.iter().take(MAX_LISTED) {
                out.push_str(&format!("  - {} ({})\n", dep.name, dep.version_or_latest()));
            }
            out.push_str("- Pin versions and run an audit tool (cargo audit, npm audit, pip-audit)\n");
        }
    }

    if !r.files.is_empty() {
        out.push_str("\n**Dependency Files:**\n");
        for path in &r.files {
            out.push_str(&format!("- `{}`\n", path.display()));
        }
    }
    out
}

pub fn health(r: &HealthReport) -> String {
    let mut out = format!(
        "## Project Health Assessment\n\n**Overall Health Score:** {}/100\n**Health Level:** {}\n\n\
         **Project Overview:**\n- Total Files: {}\n- Code Files: {}\n- Test Files: {}\n\
         - Config Files: {}\n- Test-to-Code Ratio: {:.1}%\n",
        r.score,
        r.level.as_str(),
        r.total_files,
        r.code_files,
        r.test_files,
        r.config_files,
        r.test_ratio
    );

    if !r.issues.is_empty() {
        out.push_str(&format!("\n**Issues Identified ({}):**\n", r.issues.len()));
        bullet_list(&mut out, &r.issues);
    }
    if !r.recommendations.is_empty() {
        out.push_str(&format!("\n**Recommendations ({}):**\n", r.recommendations.len()));
        bullet_list(&mut out, &r.recommendations);
    }

    if let Some(perf) = &r.performance {
        out.push_str(&format!(
            "\n**Performance:**\n- Total Size: {}\n- Large Files: {}\n",
            format_bytes(perf.total_bytes),
            perf.large_files.len()
        ));
        for f in perf.large_files.iter().take(MAX_LISTED) {
            out.push_str(&format!("  - `{}` ({})\n", f.path.display(), format_bytes(f.size)));
        }
    }

    out.push_str("\n**Next Steps:**\n");
    if r.score < 75 {
        out.push_str(
            "- Address the issues identified above\n- Add missing essential files first\n- Improve test coverage\n",
        );
    } else {
        out.push_str("- Project is in good shape\n- Keep tests and documentation current\n");
    }
    out
}
