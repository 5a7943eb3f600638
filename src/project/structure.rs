//! Structure analysis over a scanned inventory: frameworks, line metrics,
//! a light security scan and recommendations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use super::error::ProjectResult;
use super::languages::{PROFILES, profile};
use super::scan::{Inventory, ScanOptions, project_root, scan, size_category};
use crate::analysis::Language;
use crate::analysis::security;

/// Files per language read by the security scan.
pub const SECURITY_FILES_PER_LANGUAGE: usize = 20;
pub const MAX_RECOMMENDATIONS: usize = 10;

/// Detected frameworks keyed by language.
pub fn frameworks(root: &Path, inv: &Inventory) -> BTreeMap<&'static str, Vec<&'static str>> {
    let mut found: BTreeMap<&'static str, Vec<&'static str>> = BTreeMap::new();
    let mut add = |language: &'static str, framework: &'static str| {
        let list = found.entry(language).or_default();
        if !list.contains(&framework) {
            list.push(framework);
        }
    };

    for dep_file in &inv.dependency_files {
        let Some(name) = dep_file.file_name().map(|n| n.to_string_lossy()) else {
            continue;
        };
        let Ok(content) = fs::read_to_string(root.join(dep_file)) else {
            continue;
        };
        for p in PROFILES {
            if !p.dependency_files.contains(&&*name) {
                continue;
            }
            for &(framework, indicators) in p.frameworks {
                if indicators.iter().any(|i| content.contains(i)) {
                    add(p.name, framework);
                }
            }
        }
    }

    let paths: Vec<String> = inv
        .by_language
        .values()
        .flatten()
        .chain(&inv.config_files)
        .chain(&inv.dependency_files)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .collect();
    for p in PROFILES {
        for &(framework, indicators) in p.frameworks {
            // path indicators look like file names
            let hit = indicators
                .iter()
                .filter(|i| i.contains('.') || i.contains('/'))
                .filter(|i| !i.starts_with('"') && !i.starts_with('<'))
                .any(|i| paths.iter().any(|path| path.ends_with(*i)));
            if hit {
                add(p.name, framework);
            }
        }
    }
    found
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Quality {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    /// Characters per readable code file.
    pub average_file_size: usize,
    /// Test files per code file, capped at 100.
    pub test_coverage_estimate: f64,
    pub documentation_files: usize,
}

pub fn quality(root: &Path, inv: &Inventory) -> Quality {
    let mut q = Quality {
        documentation_files: inv.documentation_files.len(),
        ..Quality::default()
    };
    let mut total_chars = 0usize;
    let mut files = 0usize;

    for path in inv.by_language.values().flatten() {
        let Ok(bytes) = fs::read(root.join(path)) else {
            continue;
        };
        let content = String::from_utf8_lossy(&bytes);
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                q.blank_lines += 1;
            } else if line.starts_with('#') || line.starts_with("//") || line.starts_with("/*") {
                q.comment_lines += 1;
            } else {
                q.code_lines += 1;
            }
            q.total_lines += 1;
        }
        total_chars += content.chars().count();
        files += 1;
    }

    if files > 0 {
        q.average_file_size = total_chars / files;
        q.test_coverage_estimate =
            (inv.test_files.len() as f64 / files as f64 * 100.0).min(100.0);
    }
    q
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectIssue {
    pub file: PathBuf,
    pub issue: String,
    pub language: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SecurityScan {
    pub issues: Vec<ProjectIssue>,
    /// 100 minus 10 per distinct issue.
    pub score: u32,
}

/// One issue per distinct finding per file, over the first
/// [`SECURITY_FILES_PER_LANGUAGE`] files of each language.
pub fn security_scan(root: &Path, inv: &Inventory) -> SecurityScan {
    let mut issues = Vec::new();
    for (&language, files) in &inv.by_language {
        let lang = Language::from_name(language);
        if lang == Language::Other {
            continue;
        }
        for path in files.iter().take(SECURITY_FILES_PER_LANGUAGE) {
            let Ok(content) = fs::read_to_string(root.join(path)) else {
                continue;
            };
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for finding in security::scan(&content, lang) {
                *counts.entry(finding.title).or_default() += 1;
            }
            issues.extend(counts.into_iter().map(|(issue, count)| ProjectIssue {
                file: path.clone(),
                issue,
                language,
                count,
            }));
        }
    }
    let penalty = (issues.len() as u32).saturating_mul(10);
    SecurityScan {
        score: 100u32.saturating_sub(penalty),
        issues,
    }
}

pub fn recommendations(
    inv: &Inventory,
    frameworks: &BTreeMap<&'static str, Vec<&'static str>>,
    quality: &Quality,
) -> Vec<String> {
    let mut out = Vec::new();
    if quality.test_coverage_estimate < 50.0 {
        out.push("Consider adding more test files to improve code coverage".to_string());
    }
    if quality.documentation_files == 0 {
        out.push("Add a README.md file to document your project".to_string());
    }
    if !inv.root.join(".gitignore").exists() {
        out.push("Add a .gitignore to keep build output and secrets out of version control".to_string());
    }
    for (language, files) in &inv.by_language {
        if files.len() <= 5 {
            continue;
        }
        let Some(p) = profile(language) else {
            continue;
        };
        if !p.dependency_files.iter().any(|d| inv.has_dependency_file(d))
            && let Some(first) = p.dependency_files.first()
        {
            out.push(format!(
                "Add dependency management for {} (e.g., {})",
                language, first
            ));
        }
    }
    if frameworks.get("python").is_some_and(|f| f.contains(&"django"))
        && !inv.has_dependency_file("requirements.txt")
        && !inv.has_dependency_file("pyproject.toml")
    {
        out.push("Add requirements.txt for Django dependency management".to_string());
    }
    if !inv.large_files.is_empty() {
        out.push("Consider Git LFS or splitting for files over 1 MB".to_string());
    }
    out.truncate(MAX_RECOMMENDATIONS);
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureReport {
    pub inventory: Inventory,
    pub size_category: &'static str,
    pub frameworks: BTreeMap<&'static str, Vec<&'static str>>,
    pub quality: Quality,
    pub security: Option<SecurityScan>,
    pub recommendations: Vec<String>,
    pub elapsed: Duration,
}

pub fn analyze_structure(
    path: &str,
    options: ScanOptions,
    include_security: bool,
) -> ProjectResult<StructureReport> {
    let started = Instant::now();
    let root = project_root(path)?;
    let inventory = scan(&root, options);
    let frameworks = frameworks(&root, &inventory);
    let quality = quality(&root, &inventory);
    let security = include_security.then(|| security_scan(&root, &inventory));
    let recommendations = recommendations(&inventory, &frameworks, &quality);

    tracing::info!(
        root = %root.display(),
        files = inventory.total_files,
        "Analyzed project structure"
    );
    Ok(StructureReport {
        size_category: size_category(inventory.total_files),
        inventory,
        frameworks,
        quality,
        security,
        recommendations,
        elapsed: started.elapsed(),
    })
}
