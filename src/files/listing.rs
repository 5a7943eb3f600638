//! Directory listings and recursive file search.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use ignore::WalkBuilder;

use super::error::{FileError, FileResult};
use super::inspect::{detect_signature, is_binary};
use super::ops::{FileTool, resolve_path};

/// Content search skips files above this size.
const MAX_CONTENT_SEARCH_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Name,
    Size,
    Modified,
    Type,
}

impl FromStr for SortBy {
    type Err = FileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "name" => Ok(SortBy::Name),
            "size" => Ok(SortBy::Size),
            "modified" => Ok(SortBy::Modified),
            "type" => Ok(SortBy::Type),
            other => Err(FileError::InvalidInput {
                message: format!(
                    "unknown sort_by '{}', expected name, size, modified or type",
                    other
                ),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListOptions {
    pub show_hidden: bool,
    pub sort_by: SortBy,
    pub max_items: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            sort_by: SortBy::Name,
            max_items: 200,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
    pub permissions: String,
    pub kind: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryListing {
    pub path: PathBuf,
    pub entries: Vec<DirEntryInfo>,
    pub total_items: usize,
    pub dir_count: usize,
    pub file_count: usize,
    pub total_size: u64,
    /// Top 10 extensions among listed files, most common first.
    pub extensions: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub name_pattern: String,
    pub content_pattern: Option<String>,
    pub max_results: usize,
    pub include_hidden: bool,
    pub max_depth: usize,
    pub min_size: Option<u64>,
    pub max_size: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            name_pattern: "*".to_string(),
            content_pattern: None,
            max_results: 100,
            include_hidden: false,
            max_depth: 10,
            min_size: None,
            max_size: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

#[derive(Debug, Clone)]
pub struct SearchResults {
    pub directory: PathBuf,
    pub hits: Vec<SearchHit>,
    pub elapsed: Duration,
}

fn entry_kind(path: &std::path::Path, is_dir: bool) -> String {
    if is_dir {
        return "Directory".to_string();
    }
    let mut header = [0u8; 16];
    let read = fs::File::open(path)
        .and_then(|mut f| std::io::Read::read(&mut f, &mut header))
        .unwrap_or(0);
    detect_signature(&header[..read])
        .unwrap_or("File")
        .to_string()
}

#[cfg(unix)]
fn permissions_of(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    super::inspect::permissions_string(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn permissions_of(metadata: &fs::Metadata) -> String {
    let mode = if metadata.permissions().readonly() { "444" } else { "644" };
    mode.to_string()
}

pub fn list_directory(path: &str, options: &ListOptions) -> FileResult<DirectoryListing> {
    let path = resolve_path(path)?;
    if !path.exists() {
        return Err(FileError::NotFound { path });
    }
    if !path.is_dir() {
        return Err(FileError::NotADirectory { path });
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&path).map_err(FileError::io(&path))?.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !options.show_hidden && name.starts_with('.') {
            continue;
        }
        // Entries that vanish or deny stat are skipped.
        let Ok(metadata) = fs::metadata(entry.path()) else {
            continue;
        };
        let is_dir = metadata.is_dir();
        entries.push(DirEntryInfo {
            kind: entry_kind(&entry.path(), is_dir),
            size: if is_dir { 0 } else { metadata.len() },
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
            permissions: permissions_of(&metadata),
            is_dir,
            name,
        });
    }

    let dir_count = entries.iter().filter(|e| e.is_dir).count();
    let file_count = entries.len() - dir_count;
    let total_size = entries.iter().map(|e| e.size).sum();

    match options.sort_by {
        SortBy::Name => entries.sort_by_key(|e| e.name.to_lowercase()),
        SortBy::Size => entries.sort_by_key(|e| e.size),
        SortBy::Modified => entries.sort_by_key(|e| e.modified),
        SortBy::Type => {
            entries.sort_by_key(|e| (!e.is_dir, e.kind.clone(), e.name.to_lowercase()))
        }
    }

    let total_items = entries.len();
    entries.truncate(options.max_items);

    let mut extensions: HashMap<String, usize> = HashMap::new();
    for entry in entries.iter().filter(|e| !e.is_dir) {
        let ext = std::path::Path::new(&entry.name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_else(|| "no extension".to_string());
        *extensions.entry(ext).or_default() += 1;
    }
    let mut extensions: Vec<(String, usize)> = extensions.into_iter().collect();
    extensions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    extensions.truncate(10);

    Ok(DirectoryListing {
        path,
        entries,
        total_items,
        dir_count,
        file_count,
        total_size,
        extensions,
    })
}

pub fn search_files(directory: &str, options: &SearchOptions) -> FileResult<SearchResults> {
    let started = Instant::now();
    let directory = resolve_path(directory)?;
    if !directory.is_dir() {
        return Err(FileError::NotFound { path: directory });
    }

    let pattern_text = if options.name_pattern.trim().is_empty() {
        "*"
    } else {
        options.name_pattern.trim()
    };
    let pattern = glob::Pattern::new(pattern_text).map_err(|e| FileError::InvalidInput {
        message: format!("invalid name pattern '{}': {}", pattern_text, e),
    })?;
    let needle = options
        .content_pattern
        .as_ref()
        .map(|c| c.to_lowercase())
        .filter(|c| !c.is_empty());

    let walker = WalkBuilder::new(&directory)
        .standard_filters(false)
        .hidden(!options.include_hidden)
        .max_depth(Some(options.max_depth.saturating_add(1)))
        .build();

    let mut hits = Vec::new();
    for entry in walker.flatten() {
        if hits.len() >= options.max_results {
            break;
        }
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !pattern.matches(&name) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let size = metadata.len();
        if options.min_size.is_some_and(|min| size < min)
            || options.max_size.is_some_and(|max| size > max)
        {
            continue;
        }
        if let Some(needle) = &needle {
            if size > MAX_CONTENT_SEARCH_BYTES {
                continue;
            }
            let Ok(bytes) = fs::read(entry.path()) else {
                continue;
            };
            if is_binary(&bytes) || !String::from_utf8_lossy(&bytes).to_lowercase().contains(needle)
            {
                continue;
            }
        }
        hits.push(SearchHit {
            path: entry.path().to_path_buf(),
            name,
            size,
            modified: metadata.modified().ok().map(DateTime::<Local>::from),
        });
    }

    hits.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

    Ok(SearchResults {
        directory,
        hits,
        elapsed: started.elapsed(),
    })
}

impl FileTool {
    pub fn list_directory(&self, path: &str, options: &ListOptions) -> FileResult<DirectoryListing> {
        let result = list_directory(path, options);
        self.log("list", path, &result, |l| {
            format!("{} dirs, {} files", l.dir_count, l.file_count)
        });
        result
    }

    pub fn search_files(&self, directory: &str, options: &SearchOptions) -> FileResult<SearchResults> {
        let result = search_files(directory, options);
        self.log("search", directory, &result, |r| {
            format!("{} matches for {}", r.hits.len(), options.name_pattern)
        });
        result
    }
}
