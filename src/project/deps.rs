//! Manifest parsing for the common package managers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::error::ProjectResult;
use super::languages::is_dependency_file;
use super::scan::{project_root, walker};

/// How deep below the project root manifests are searched for.
pub const MANIFEST_SEARCH_DEPTH: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub name: String,
    /// Requirement as written; `None` when the manifest gives none.
    pub version: Option<String>,
    pub dev: bool,
    pub ecosystem: &'static str,
}

impl Dependency {
    fn new(name: &str, version: Option<&str>, dev: bool, ecosystem: &'static str) -> Self {
        Self {
            name: name.trim().to_string(),
            version: version
                .map(|v| v.trim().trim_matches('"').trim().to_string())
                .filter(|v| !v.is_empty()),
            dev,
            ecosystem,
        }
    }

    /// No upper bound on what gets installed: missing, wildcard or open
    /// ranges. Path, git and workspace references count as pinned.
    pub fn is_unpinned(&self) -> bool {
        match self.version.as_deref() {
            None => true,
            Some(v) => {
                let v = v.trim();
                v == "*" || v.eq_ignore_ascii_case("latest") || v.starts_with('>')
            }
        }
    }

    pub fn version_or_latest(&self) -> &str {
        self.version.as_deref().unwrap_or("latest")
    }
}

pub fn parse_package_json(content: &str) -> Option<Vec<Dependency>> {
    let json: serde_json::Value = serde_json::from_str(content).ok()?;
    let mut out = Vec::new();
    for (key, dev) in [("dependencies", false), ("devDependencies", true)] {
        if let Some(map) = json.get(key).and_then(|v| v.as_object()) {
            for (name, version) in map {
                out.push(Dependency::new(name, version.as_str(), dev, "npm"));
            }
        }
    }
    Some(out)
}

/// One requirement specifier, e.g. `requests[socks]>=2.31 ; python_version > "3.8"`.
fn parse_requirement(line: &str, dev: bool, ecosystem: &'static str) -> Option<Dependency> {
    let line = line.split('#').next().unwrap_or_default();
    let line = line.split(';').next().unwrap_or_default().trim();
    if line.is_empty() || line.starts_with('-') {
        return None;
    }
    let split = line
        .find(|c: char| matches!(c, '=' | '>' | '<' | '~' | '!' | ' '))
        .unwrap_or(line.len());
    let (name, spec) = line.split_at(split);
    let name = name.split('[').next().unwrap_or(name);
    let spec = spec.trim();
    let version = spec
        .strip_prefix("==")
        .or_else(|| (ecosystem == "conda").then(|| spec.strip_prefix('=')).flatten())
        .unwrap_or(spec);
    Some(Dependency::new(name, Some(version), dev, ecosystem))
}

pub fn parse_requirements(content: &str) -> Vec<Dependency> {
    content
        .lines()
        .filter_map(|line| parse_requirement(line, false, "pip"))
        .collect()
}

fn parse_toml(content: &str) -> Option<toml::Table> {
    toml::from_str(content)
        .map_err(|e| tracing::debug!(error = %e, "Invalid TOML manifest"))
        .ok()
}

/// Version requirement of a TOML dependency value: a bare string, or a
/// table's `version`, falling back to `path`/`git`/`workspace` markers.
fn toml_version(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(v) => Some(v.clone()),
        toml::Value::Table(t) => t
            .get("version")
            .and_then(toml::Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                ["path", "git", "workspace"]
                    .into_iter()
                    .find(|marker| t.contains_key(*marker))
                    .map(str::to_string)
            }),
        _ => None,
    }
}

/// Entries of a `name = requirement` table such as `[dependencies]`.
fn table_dependencies(
    table: Option<&toml::Value>,
    dev: bool,
    ecosystem: &'static str,
    skip: &[&str],
) -> Vec<Dependency> {
    table
        .and_then(toml::Value::as_table)
        .into_iter()
        .flatten()
        .filter(|(name, _)| !skip.contains(&name.as_str()))
        .map(|(name, value)| Dependency::new(name, toml_version(value).as_deref(), dev, ecosystem))
        .collect()
}

/// PEP 508 requirement strings from an array such as `project.dependencies`.
fn requirement_array(value: Option<&toml::Value>, dev: bool) -> Vec<Dependency> {
    value
        .and_then(toml::Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(toml::Value::as_str)
        .filter_map(|r| parse_requirement(r, dev, "pip"))
        .collect()
}

const CARGO_TABLES: [(&str, bool); 3] = [
    ("dependencies", false),
    ("build-dependencies", false),
    ("dev-dependencies", true),
];

fn cargo_tables(table: &toml::Table, out: &mut Vec<Dependency>) {
    for (key, dev) in CARGO_TABLES {
        out.extend(table_dependencies(table.get(key), dev, "cargo", &[]));
    }
}

pub fn parse_cargo_toml(content: &str) -> Option<Vec<Dependency>> {
    let doc = parse_toml(content)?;
    let mut out = Vec::new();
    cargo_tables(&doc, &mut out);
    if let Some(workspace) = doc.get("workspace").and_then(toml::Value::as_table) {
        out.extend(table_dependencies(workspace.get("dependencies"), false, "cargo", &[]));
    }
    // [target.'cfg(unix)'.dependencies]
    for platform in doc
        .get("target")
        .and_then(toml::Value::as_table)
        .into_iter()
        .flat_map(|targets| targets.values())
        .filter_map(toml::Value::as_table)
    {
        cargo_tables(platform, &mut out);
    }
    Some(out)
}

pub fn parse_pyproject(content: &str) -> Option<Vec<Dependency>> {
    let doc = parse_toml(content)?;
    let mut out = Vec::new();

    if let Some(project) = doc.get("project") {
        out.extend(requirement_array(project.get("dependencies"), false));
        for extra in project
            .get("optional-dependencies")
            .and_then(toml::Value::as_table)
            .into_iter()
            .flat_map(|extras| extras.values())
        {
            out.extend(requirement_array(Some(extra), true));
        }
    }

    if let Some(poetry) = doc.get("tool").and_then(|t| t.get("poetry")) {
        out.extend(table_dependencies(poetry.get("dependencies"), false, "pip", &["python"]));
        out.extend(table_dependencies(poetry.get("dev-dependencies"), true, "pip", &[]));
        for group in poetry
            .get("group")
            .and_then(toml::Value::as_table)
            .into_iter()
            .flat_map(|groups| groups.values())
        {
            out.extend(table_dependencies(group.get("dependencies"), true, "pip", &[]));
        }
    }
    Some(out)
}

pub fn parse_pipfile(content: &str) -> Option<Vec<Dependency>> {
    let doc = parse_toml(content)?;
    let mut out = table_dependencies(doc.get("packages"), false, "pip", &[]);
    out.extend(table_dependencies(doc.get("dev-packages"), true, "pip", &[]));
    Some(out)
}

static POM_DEPENDENCY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)<dependency>(.*?)</dependency>").ok());
static POM_FIELD: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<(artifactId|version|scope)>\s*([^<]+?)\s*</").ok());

pub fn parse_pom(content: &str) -> Vec<Dependency> {
    let (Some(block_re), Some(field_re)) = (POM_DEPENDENCY.as_ref(), POM_FIELD.as_ref()) else {
        return Vec::new();
    };
    block_re
        .captures_iter(content)
        .filter_map(|block| {
            let (mut artifact, mut version, mut scope) = (None, None, None);
            for field in field_re.captures_iter(&block[1]) {
                let value = field.get(2).map(|m| m.as_str());
                match &field[1] {
                    "artifactId" => artifact = value,
                    "version" => version = value,
                    _ => scope = value,
                }
            }
            Some(Dependency::new(
                artifact?,
                version,
                scope == Some("test"),
                "maven",
            ))
        })
        .collect()
}

pub fn parse_go_mod(content: &str) -> Vec<Dependency> {
    let mut out = Vec::new();
    let mut in_block = false;
    for raw in content.lines() {
        let line = raw.split("//").next().unwrap_or_default().trim();
        if line.starts_with("require (") || line == "require(" {
            in_block = true;
            continue;
        }
        if in_block && line == ")" {
            in_block = false;
            continue;
        }
        let spec = if in_block {
            line
        } else if let Some(rest) = line.strip_prefix("require ") {
            rest.trim()
        } else {
            continue;
        };
        let mut parts = spec.split_whitespace();
        if let (Some(name), Some(version)) = (parts.next(), parts.next()) {
            out.push(Dependency::new(name, Some(version), false, "go"));
        }
    }
    out
}

pub fn parse_environment_yml(content: &str) -> Option<Vec<Dependency>> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(content).ok()?;
    let mut out = Vec::new();
    for item in yaml.get("dependencies")?.as_sequence()? {
        if let Some(spec) = item.as_str() {
            out.extend(parse_requirement(spec, false, "conda"));
        } else if let Some(pip) = item.get("pip").and_then(|p| p.as_sequence()) {
            out.extend(
                pip.iter()
                    .filter_map(|p| p.as_str())
                    .filter_map(|p| parse_requirement(p, false, "pip")),
            );
        }
    }
    Some(out)
}

/// Parsed dependencies of one manifest, or `None` for files that are
/// recognized but not parsed (lock files) or could not be parsed.
pub fn parse_manifest(name: &str, content: &str) -> Option<(&'static str, Vec<Dependency>)> {
    match name {
        "package.json" => parse_package_json(content).map(|d| ("JavaScript/Node.js", d)),
        "requirements.txt" => Some(("Python", parse_requirements(content))),
        "Pipfile" => parse_pipfile(content).map(|d| ("Python", d)),
        "pyproject.toml" => parse_pyproject(content).map(|d| ("Python", d)),
        "environment.yml" => parse_environment_yml(content).map(|d| ("Python/Conda", d)),
        "pom.xml" => Some(("Java/Maven", parse_pom(content))),
        "go.mod" => Some(("Go", parse_go_mod(content))),
        "Cargo.toml" => parse_cargo_toml(content).map(|d| ("Rust/Cargo", d)),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DependencyReport {
    pub root: PathBuf,
    /// Manifests found, relative to the root.
    pub files: Vec<PathBuf>,
    pub ecosystems: Vec<&'static str>,
    pub production: Vec<Dependency>,
    pub development: Vec<Dependency>,
}

impl DependencyReport {
    pub fn total(&self) -> usize {
        self.production.len() + self.development.len()
    }

    pub fn unpinned(&self) -> Vec<&Dependency> {
        self.production
            .iter()
            .chain(&self.development)
            .filter(|d| d.is_unpinned())
            .collect()
    }
}

pub fn collect(root: &Path, include_dev: bool) -> DependencyReport {
    let mut report = DependencyReport {
        root: root.to_path_buf(),
        ..DependencyReport::default()
    };
    for entry in walker(root, MANIFEST_SEARCH_DEPTH, false).flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_dependency_file(&name) {
            continue;
        }
        report.files.push(
            entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_path_buf(),
        );
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let Some((ecosystem, deps)) = parse_manifest(&name, &content) else {
            tracing::debug!(path = %entry.path().display(), "Manifest not parsed");
            continue;
        };
        if !report.ecosystems.contains(&ecosystem) {
            report.ecosystems.push(ecosystem);
        }
        for dep in deps {
            if !dep.dev {
                report.production.push(dep);
            } else if include_dev {
                report.development.push(dep);
            }
        }
    }
    report
}

pub fn project_dependencies(path: &str, include_dev: bool) -> ProjectResult<DependencyReport> {
    let root = project_root(path)?;
    let report = collect(&root, include_dev);
    tracing::info!(
        root = %root.display(),
        manifests = report.files.len(),
        dependencies = report.total(),
        "Collected project dependencies"
    );
    Ok(report)
}
