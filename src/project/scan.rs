//! Directory walk collecting a file inventory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use serde::Serialize;

use super::error::{ProjectError, ProjectResult};
use super::languages::{
    is_config_file, is_dependency_file, is_documentation, is_test_file, language_for_extension,
};

pub const DEFAULT_MAX_DEPTH: usize = 4;
pub const LARGE_FILE_BYTES: u64 = 1024 * 1024;

/// Directories skipped unless hidden entries are requested.
pub const SKIPPED_DIRS: &[&str] = &["node_modules", "__pycache__", "venv", "target", ".git"];
/// Dotfiles kept even when hidden entries are skipped.
const KEPT_DOTFILES: &[&str] = &[".gitignore", ".env", ".env.example"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    pub max_depth: usize,
    pub include_hidden: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Paths are relative to `root`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    pub root: PathBuf,
    pub total_files: usize,
    pub directories: usize,
    pub total_bytes: u64,
    pub by_extension: BTreeMap<String, usize>,
    pub by_language: BTreeMap<&'static str, Vec<PathBuf>>,
    pub config_files: Vec<PathBuf>,
    pub dependency_files: Vec<PathBuf>,
    pub test_files: Vec<PathBuf>,
    pub documentation_files: Vec<PathBuf>,
    pub large_files: Vec<LargeFile>,
}

impl Inventory {
    pub fn code_files(&self) -> usize {
        self.by_language.values().map(Vec::len).sum()
    }

    /// Extensions by descending count, ties by name.
    pub fn top_extensions(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut exts: Vec<(&str, usize)> = self
            .by_extension
            .iter()
            .map(|(ext, n)| (ext.as_str(), *n))
            .collect();
        exts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        exts.truncate(limit);
        exts
    }

    pub fn has_dependency_file(&self, name: &str) -> bool {
        self.dependency_files
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == name))
    }

    /// Test files as a percentage of code files.
    pub fn test_ratio(&self) -> f64 {
        self.test_files.len() as f64 / self.code_files().max(1) as f64 * 100.0
    }
}

/// Resolve a user supplied project path, which must be an existing
/// directory.
pub fn project_root(path: &str) -> ProjectResult<PathBuf> {
    let path = if path.trim().is_empty() { "." } else { path };
    let resolved = crate::files::resolve_path(path).map_err(|e| ProjectError::InvalidInput {
        message: e.to_string(),
    })?;
    if !resolved.exists() {
        return Err(ProjectError::NotFound { path: resolved });
    }
    if !resolved.is_dir() {
        return Err(ProjectError::NotADirectory { path: resolved });
    }
    Ok(resolved)
}

fn keep(name: &str, is_dir: bool, include_hidden: bool) -> bool {
    if include_hidden {
        return true;
    }
    if is_dir {
        !name.starts_with('.') && !SKIPPED_DIRS.contains(&name)
    } else {
        !name.starts_with('.') || KEPT_DOTFILES.contains(&name)
    }
}

/// Walk builder shared by every project scan.
pub fn walker(root: &Path, max_depth: usize, include_hidden: bool) -> ignore::Walk {
    WalkBuilder::new(root)
        .standard_filters(false)
        .max_depth(Some(max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            entry.depth() == 0
                || keep(
                    &entry.file_name().to_string_lossy(),
                    entry.file_type().is_some_and(|t| t.is_dir()),
                    include_hidden,
                )
        })
        .build()
}

pub fn scan(root: &Path, options: ScanOptions) -> Inventory {
    let mut inv = Inventory {
        root: root.to_path_buf(),
        ..Inventory::default()
    };

    for entry in walker(root, options.max_depth, options.include_hidden).flatten() {
        if entry.depth() == 0 {
            continue;
        }
        let Some(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            inv.directories += 1;
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let name = entry.file_name().to_string_lossy().into_owned();
        let rel_text = relative.to_string_lossy().replace('\\', "/");
        inv.total_files += 1;

        let ext = relative
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if !ext.is_empty() {
            *inv.by_extension.entry(ext.clone()).or_default() += 1;
            if let Some(language) = language_for_extension(&ext) {
                inv.by_language
                    .entry(language)
                    .or_default()
                    .push(relative.clone());
            }
            if is_documentation(&ext) {
                inv.documentation_files.push(relative.clone());
            }
        }
        if is_dependency_file(&name) {
            inv.dependency_files.push(relative.clone());
        }
        if is_config_file(&name) {
            inv.config_files.push(relative.clone());
        }
        if is_test_file(&name, &rel_text) {
            inv.test_files.push(relative.clone());
        }

        if let Ok(metadata) = entry.metadata() {
            inv.total_bytes += metadata.len();
            if metadata.len() > LARGE_FILE_BYTES {
                inv.large_files.push(LargeFile {
                    path: relative,
                    size: metadata.len(),
                });
            }
        }
    }

    tracing::debug!(
        root = %root.display(),
        files = inv.total_files,
        directories = inv.directories,
        "Scanned project"
    );
    inv
}

/// Size bucket by file count.
pub fn size_category(total_files: usize) -> &'static str {
    match total_files {
        0..10 => "Small",
        10..50 => "Medium",
        50..200 => "Large",
        _ => "Enterprise",
    }
}
