//! Markdown rendering of analysis results.

use crate::render::title_case;

use super::review::CodeAnalysis;
use super::sandbox::{SandboxOutcome, error_hint};
use super::security::{AuditReport, Severity};
use super::tool::{Source, SuggestionReport};

const MAX_LISTED_ISSUES: usize = 5;

fn header(title: &str, source: &Source, characters: usize) -> String {
    let mut out = format!("## {}\n\n- **Language:** {}\n", title, title_case(source.language.as_str()));
    if let Some(origin) = &source.origin {
        out.push_str(&format!("- **File:** `{}`\n", origin));
    }
    out.push_str(&format!("- **Code Size:** {} characters\n", characters));
    out
}

pub fn analysis(source: &Source, a: &CodeAnalysis) -> String {
    let mut out = header("Code Analysis", source, a.characters);

    let constructs = a.overview.constructs();
    out.push_str("\n**Overview:**\n");
    if constructs.is_empty() {
        out.push_str("- No functions, classes or imports detected\n");
    } else {
        for c in constructs {
            out.push_str(&format!("- {}\n", c));
        }
    }

    if let Some(m) = &a.metrics {
        out.push_str(&format!(
            "\n**Quality Metrics:**\n- Lines: {} total, {} code, {} comments, {} blank\n\
             - Comment Ratio: {:.1}%\n- Code Density: {:.1}%\n- Complexity: {}\n\
             - Maintainability: {} ({}/100)\n- Cyclomatic Complexity (est.): {}\n",
            m.total_lines,
            m.code_lines,
            m.comment_lines,
            m.blank_lines,
            m.comment_ratio,
            m.code_density,
            m.complexity.as_str(),
            m.maintainability.as_str(),
            m.maintainability_score,
            m.cyclomatic
        ));
    }

    if let Some(scan) = &a.security {
        out.push_str(&format!(
            "\n**Security Analysis:**\n- Risk Level: {}\n- Issues Found: {}\n",
            scan.risk.as_str(),
            scan.issues.len()
        ));
        for issue in scan.issues.iter().take(MAX_LISTED_ISSUES) {
            out.push_str(&format!(
                "  - Line {}: {} ({})\n",
                issue.line, issue.title, issue.severity
            ));
        }
        if scan.issues.len() > MAX_LISTED_ISSUES {
            out.push_str(&format!(
                "  - ... and {} more issues\n",
                scan.issues.len() - MAX_LISTED_ISSUES
            ));
        }
    }

    let p = &a.patterns;
    out.push_str("\n**Code Patterns:**\n");
    if !p.design.is_empty() {
        out.push_str(&format!("- Design Patterns: {}\n", p.design.join(", ")));
    }
    if !p.anti.is_empty() {
        out.push_str(&format!("- Anti-patterns: {}\n", p.anti.join(", ")));
    }
    out.push_str(&format!("- Naming Style: {}\n", p.naming));

    let d = &a.dependencies;
    if !d.imports.is_empty() {
        out.push_str(&format!(
            "\n**Dependencies:**\n- Imports: {}\n",
            d.imports.len()
        ));
        if !d.stdlib.is_empty() {
            out.push_str(&format!("- Standard Library: {}\n", d.stdlib.join(", ")));
        }
        if !d.external.is_empty() {
            out.push_str(&format!("- External: {}\n", d.external.join(", ")));
        }
    }

    if let Some(s) = &a.suggestions
        && !s.is_empty()
    {
        out.push_str("\n**Improvement Suggestions:**\n");
        for (category, items) in s.categories() {
            for item in items.iter().take(3) {
                out.push_str(&format!("- {}: {}\n", category, item));
            }
        }
    }

    let assessment = &a.assessment;
    out.push_str(&format!(
        "\n**Overall Assessment:**\n- Readability: {}\n- Maintainability: {}\n- Complexity: {}\n",
        assessment.readability.as_str(),
        assessment.maintainability.as_str(),
        assessment.complexity.as_str()
    ));
    if let Some(security) = assessment.security {
        out.push_str(&format!("- Security: {}\n", security.as_str()));
    }

    out.push_str(
        "\n**Next Steps:**\n- Run bb7_code_suggestions for targeted improvements\n\
         - Run bb7_security_audit for a full vulnerability review\n\
         - Run bb7_execute_code_safely to try snippets",
    );
    out
}

pub fn suggestions(report: &SuggestionReport) -> String {
    let lang = report.language.as_str();
    let mut out = format!(
        "## Code Suggestions\n\n- **Language:** {}\n- **Focus Area:** {}\n- **Skill Level:** {}\n",
        title_case(lang),
        title_case(report.focus.as_str()),
        title_case(report.skill.as_str())
    );

    if report.suggestions.is_empty() {
        out.push_str(&format!(
            "\nNo immediate suggestions for the {} focus area.\n\n**General tips:**\n\
             - Add documentation where it is missing\n- Add unit tests to verify functionality\n\
             - Review edge case handling\n",
            report.focus.as_str()
        ));
    } else {
        let mut current = None;
        let mut index = 0;
        for s in &report.suggestions {
            if current != Some(s.category) {
                out.push_str(&format!("\n### {} Suggestions\n\n", s.category.as_str()));
                current = Some(s.category);
                index = 0;
            }
            index += 1;
            out.push_str(&format!("**{}. {}**\n_{}_\n", index, s.title, s.description));
            if let Some(code) = s.current {
                out.push_str(&format!("\nCurrent:\n```{}\n{}\n```\n", lang, code));
            }
            if let Some(code) = s.improved {
                out.push_str(&format!("Improved:\n```{}\n{}\n```\n", lang, code));
            }
            out.push_str(&format!(
                "- **Why:** {}\n- **Impact:** {}\n\n",
                s.explanation,
                s.impact.as_str()
            ));
        }
    }

    out.push_str(&format!(
        "\n**{} Level Recommendations:**\n",
        title_case(report.skill.as_str())
    ));
    for r in report.skill.recommendations() {
        out.push_str(&format!("- {}\n", r));
    }
    out.trim_end().to_string()
}

pub fn audit(source: &Source, report: &AuditReport, include_compliance: bool) -> String {
    let mut out = header("Security Audit", source, source.code.chars().count());
    out.push_str(&format!(
        "- **Audit Level:** {}\n\n**Risk Score:** {}/100 ({})\n\n**Recommendation:** {}\n",
        title_case(report.level.as_str()),
        report.risk_score,
        report.risk_level.as_str(),
        report.risk_level.recommendation()
    ));

    if report.vulnerabilities.is_empty() {
        out.push_str("\nNo known vulnerable patterns found.\n");
    } else {
        out.push_str(&format!(
            "\n**Vulnerabilities:** {} (Critical: {}, High: {}, Medium: {})\n",
            report.vulnerabilities.len(),
            report.count(Severity::Critical),
            report.count(Severity::High),
            report.count(Severity::Medium)
        ));
        for (i, v) in report.vulnerabilities.iter().enumerate() {
            out.push_str(&format!(
                "\n{}. **{}** [{}] line {}\n   - Code: `{}`\n   - Fix: {}\n",
                i + 1,
                v.title,
                v.severity,
                v.line,
                v.snippet,
                v.remediation
            ));
        }
    }

    out.push_str("\n**Best Practices:**\n");
    for (name, ok) in &report.best_practices {
        out.push_str(&format!("- [{}] {}\n", if *ok { "x" } else { " " }, name));
    }

    if include_compliance {
        let c = &report.compliance;
        out.push_str(&format!(
            "\n**Compliance Findings:**\n- OWASP Top 10: {}\n- CWE: {}\n- SANS Top 25: {}\n",
            c.owasp, c.cwe, c.sans
        ));
    }

    if !report.recommendations.is_empty() {
        out.push_str("\n**Recommendations:**\n");
        for r in &report.recommendations {
            out.push_str(&format!("- {}\n", r));
        }
    }

    out.push_str(&format!(
        "\n**Audit Coverage:**\n- Patterns Checked: {}\n- Functions Analyzed: {}\n- Dependencies Scanned: {}",
        report.patterns_checked, report.functions_analyzed, report.dependencies_scanned
    ));
    out
}

pub fn execution(code: &str, outcome: &SandboxOutcome) -> String {
    let run = match outcome {
        SandboxOutcome::Blocked { reason } => {
            return format!(
                "## Safe Code Execution\n\n- **Code Size:** {} characters\n\n\
                 **Execution blocked:** potentially unsafe operation detected: {}\n\n\
                 Remove or modify the unsafe operation before execution.",
                code.chars().count(),
                reason
            );
        }
        SandboxOutcome::Ran(run) => run,
    };
    let e = &run.execution;

    let status = if e.success {
        "Success"
    } else if e.timed_out {
        "Timed out"
    } else {
        "Failed"
    };
    let mut out = format!(
        "## Safe Code Execution\n\n- **Timeout:** {} seconds\n- **Code Size:** {} characters\n\
         - **Status:** {}\n- **Exit Code:** {}\n- **Execution Time:** {:.3}s\n",
        e.timeout_secs,
        code.chars().count(),
        status,
        e.exit_code,
        e.elapsed.as_secs_f64()
    );

    if !e.output.is_empty() {
        out.push_str(&format!("\n**Output:**\n```\n{}\n```\n", e.output.trim_end()));
    }
    if !e.success && !e.stderr.trim().is_empty() {
        out.push_str(&format!("\n**Error:**\n```\n{}\n```\n", e.stderr.trim_end()));
        if let Some(line) = e.error() {
            out.push_str(&format!("\n**Error Analysis:** {}\n", error_hint(line)));
        }
    }

    if let Some(a) = &run.analysis {
        if !a.functions_defined.is_empty() {
            out.push_str(&format!(
                "\n**Functions Defined:** {}\n",
                a.functions_defined.join(", ")
            ));
        }
        if !a.imports_used.is_empty() {
            out.push_str(&format!("\n**Imports Used:** {}\n", a.imports_used.join(", ")));
        }
    }

    if let Some(p) = &run.performance {
        out.push_str(&format!(
            "\n**Performance:**\n- Speed: {}\n- Efficiency: {}\n- Resource Usage: {}\n",
            p.speed, p.efficiency, p.resources
        ));
    }

    if !run.suggestions.is_empty() {
        out.push_str("\n**Code Quality Suggestions:**\n");
        for s in run.suggestions.iter().take(3) {
            out.push_str(&format!("- {}\n", s));
        }
    }

    if let Some(stats) = &run.stats {
        out.push_str(&format!(
            "\n**Session Statistics:**\n- Success Rate: {:.1}%\n- Average Execution Time: {:.3}s\n\
             - Total Executions: {}\n",
            stats.success_rate * 100.0,
            stats.avg_elapsed.as_secs_f64(),
            stats.total
        ));
    }
    out.trim_end().to_string()
}
