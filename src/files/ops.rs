//! Read, write, copy, move, delete and describe files.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};

use super::error::{FileError, FileResult};
use super::history::OperationHistory;
use super::inspect::{
    ContentAnalysis, HEX_PREVIEW_BYTES, analyze_content, detect_signature, fence_for, hex_dump,
    is_binary, mime_for, permissions_string,
};

pub const DEFAULT_MAX_READ: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub max_size: u64,
    pub force_text: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_READ,
            force_text: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FileContent {
    Text {
        content: String,
        fence: &'static str,
        analysis: ContentAnalysis,
    },
    Binary {
        signature: Option<&'static str>,
        mime: String,
        hex: String,
    },
}

#[derive(Debug, Clone)]
pub struct ReadResult {
    pub path: PathBuf,
    pub size: u64,
    pub content: FileContent,
}

#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub create_backup: bool,
    pub make_executable: bool,
    pub append: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            create_backup: true,
            make_executable: false,
            append: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteResult {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub backup: Option<PathBuf>,
    pub executable: bool,
    pub appended: bool,
    pub analysis: ContentAnalysis,
}

#[derive(Debug, Clone)]
pub struct TransferResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub is_dir: bool,
    pub bytes: u64,
    pub items: usize,
}

#[derive(Debug, Clone)]
pub struct DeleteResult {
    pub path: PathBuf,
    pub is_dir: bool,
    pub backup: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct FileInfo {
    pub path: PathBuf,
    pub is_dir: bool,
    pub size: u64,
    pub permissions: String,
    pub is_executable: bool,
    pub created: Option<DateTime<Local>>,
    pub modified: Option<DateTime<Local>>,
    pub accessed: Option<DateTime<Local>>,
    pub mime: Option<String>,
    pub signature: Option<&'static str>,
    pub text: Option<ContentAnalysis>,
    /// (files, directories, bytes of direct children) for directories.
    pub contents: Option<(usize, usize, u64)>,
}

/// File operations with backups and an operation log.
#[derive(Debug)]
pub struct FileTool {
    backups_dir: PathBuf,
    history: OperationHistory,
}

impl FileTool {
    pub fn new(backups_dir: impl Into<PathBuf>) -> Self {
        Self {
            backups_dir: backups_dir.into(),
            history: OperationHistory::default(),
        }
    }

    pub fn history(&self) -> &OperationHistory {
        &self.history
    }

    pub fn read_file(&self, path: &str, options: &ReadOptions) -> FileResult<ReadResult> {
        let result = read_file(path, options);
        self.log("read", path, &result, |r| format!("{} bytes", r.size));
        result
    }

    pub fn write_file(
        &self,
        path: &str,
        content: &str,
        options: &WriteOptions,
    ) -> FileResult<WriteResult> {
        let result = write_file(path, content, options);
        self.log("write", path, &result, |r| {
            format!("{} bytes", r.bytes_written)
        });
        result
    }

    pub fn copy(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
        preserve_metadata: bool,
    ) -> FileResult<TransferResult> {
        let result = copy(source, destination, overwrite, preserve_metadata);
        let label = format!("{} -> {}", source, destination);
        self.log("copy", &label, &result, |r| {
            format!("{} bytes, {} items", r.bytes, r.items)
        });
        result
    }

    pub fn rename(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> FileResult<TransferResult> {
        let result = rename(source, destination, overwrite);
        let label = format!("{} -> {}", source, destination);
        self.log("move", &label, &result, |r| {
            let kind = if r.is_dir { "directory" } else { "file" };
            kind.to_string()
        });
        result
    }

    pub fn delete(&self, path: &str, force: bool, create_backup: bool) -> FileResult<DeleteResult> {
        let backups = create_backup.then_some(self.backups_dir.as_path());
        let result = delete(path, force, backups);
        self.log("delete", path, &result, |r| match &r.backup {
            Some(backup) => format!("backup {}", backup.display()),
            None => "no backup".to_string(),
        });
        result
    }

    pub fn file_info(&self, path: &str) -> FileResult<FileInfo> {
        let result = file_info(path);
        self.log("info", path, &result, |r| format!("{} bytes", r.size));
        result
    }

    pub(crate) fn log<T>(
        &self,
        operation: &str,
        path: &str,
        result: &FileResult<T>,
        detail: impl FnOnce(&T) -> String,
    ) {
        match result {
            Ok(value) => self.history.record(operation, path, true, Some(detail(value))),
            Err(e) => {
                tracing::debug!(operation, path, error = %e, "File operation failed");
                self.history.record(operation, path, false, Some(e.to_string()))
            }
        }
    }
}

/// Expand a leading `~` and make the path absolute.
pub fn resolve_path(path: &str) -> FileResult<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(FileError::InvalidInput {
            message: "path cannot be empty".to_string(),
        });
    }

    let expanded = match trimmed.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = std::env::var("HOME").unwrap_or_default();
            PathBuf::from(format!("{}{}", home, rest))
        }
        _ => PathBuf::from(trimmed),
    };

    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => Ok(cwd.join(expanded)),
            Err(source) => Err(FileError::Io {
                path: expanded,
                source,
            }),
        }
    }
}

fn existing(path: &str) -> FileResult<PathBuf> {
    let resolved = resolve_path(path)?;
    if resolved.symlink_metadata().is_err() {
        return Err(FileError::NotFound { path: resolved });
    }
    Ok(resolved)
}

pub fn read_file(path: &str, options: &ReadOptions) -> FileResult<ReadResult> {
    let path = existing(path)?;
    let metadata = fs::metadata(&path).map_err(FileError::io(&path))?;
    if metadata.is_dir() {
        return Err(FileError::NotAFile { path });
    }

    let size = metadata.len();
    if size > options.max_size && !options.force_text {
        return Err(FileError::TooLarge {
            path,
            size,
            max: options.max_size,
        });
    }

    let bytes = fs::read(&path).map_err(FileError::io(&path))?;

    let content = if is_binary(&bytes) && !options.force_text {
        FileContent::Binary {
            signature: detect_signature(&bytes),
            mime: mime_for(&path),
            hex: hex_dump(&bytes[..bytes.len().min(HEX_PREVIEW_BYTES)]),
        }
    } else {
        let content = String::from_utf8_lossy(&bytes).into_owned();
        FileContent::Text {
            analysis: analyze_content(&content, &path),
            fence: fence_for(&path),
            content,
        }
    };

    Ok(ReadResult {
        path,
        size,
        content,
    })
}

/// `<stem>.backup_<ts><.ext>` next to the original.
pub fn backup_path_for(path: &Path, timestamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    path.with_file_name(format!("{}.backup_{}{}", stem, timestamp, ext))
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

pub fn write_file(path: &str, content: &str, options: &WriteOptions) -> FileResult<WriteResult> {
    let path = resolve_path(path)?;
    if path.is_dir() {
        return Err(FileError::NotAFile { path });
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(FileError::io(parent))?;
    }

    let backup = if options.create_backup && path.exists() {
        let backup = backup_path_for(&path, &timestamp());
        fs::copy(&path, &backup).map_err(FileError::io(&backup))?;
        Some(backup)
    } else {
        None
    };

    if options.append {
        use std::io::Write;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(FileError::io(&path))?;
        file.write_all(content.as_bytes())
            .map_err(FileError::io(&path))?;
    } else {
        fs::write(&path, content).map_err(FileError::io(&path))?;
    }

    if options.make_executable {
        set_executable(&path)?;
    }

    Ok(WriteResult {
        analysis: analyze_content(content, &path),
        bytes_written: content.len(),
        backup,
        executable: options.make_executable,
        appended: options.append,
        path,
    })
}

#[cfg(unix)]
fn set_executable(path: &Path) -> FileResult<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut permissions = fs::metadata(path).map_err(FileError::io(path))?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions).map_err(FileError::io(path))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> FileResult<()> {
    Ok(())
}

pub fn copy(
    source: &str,
    destination: &str,
    overwrite: bool,
    preserve_metadata: bool,
) -> FileResult<TransferResult> {
    let source = existing(source)?;
    let destination = resolve_path(destination)?;
    if destination.exists() && !overwrite {
        return Err(FileError::AlreadyExists { path: destination });
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(FileError::io(parent))?;
    }

    let is_dir = source.is_dir();
    let (bytes, items) = if is_dir {
        copy_dir(&source, &destination, preserve_metadata)?
    } else {
        let bytes = copy_one(&source, &destination, preserve_metadata)?;
        (bytes, 1)
    };

    Ok(TransferResult {
        source,
        destination,
        is_dir,
        bytes,
        items,
    })
}

fn copy_one(source: &Path, destination: &Path, preserve_metadata: bool) -> FileResult<u64> {
    let bytes = fs::copy(source, destination).map_err(FileError::io(destination))?;
    if preserve_metadata {
        let modified = fs::metadata(source)
            .and_then(|m| m.modified())
            .map_err(FileError::io(source))?;
        fs::File::options()
            .write(true)
            .open(destination)
            .and_then(|f| f.set_modified(modified))
            .map_err(FileError::io(destination))?;
    }
    Ok(bytes)
}

/// Recursive copy; returns (bytes, entries created).
fn copy_dir(source: &Path, destination: &Path, preserve_metadata: bool) -> FileResult<(u64, usize)> {
    fs::create_dir_all(destination).map_err(FileError::io(destination))?;
    let mut bytes = 0;
    let mut items = 0;
    for entry in fs::read_dir(source).map_err(FileError::io(source))? {
        let entry = entry.map_err(FileError::io(source))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        if from.is_dir() {
            let (b, n) = copy_dir(&from, &to, preserve_metadata)?;
            bytes += b;
            items += n + 1;
        } else {
            bytes += copy_one(&from, &to, preserve_metadata)?;
            items += 1;
        }
    }
    Ok((bytes, items))
}

pub fn rename(source: &str, destination: &str, overwrite: bool) -> FileResult<TransferResult> {
    let source = existing(source)?;
    let destination = resolve_path(destination)?;
    if destination.exists() && !overwrite {
        return Err(FileError::AlreadyExists { path: destination });
    }
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(FileError::io(parent))?;
    }

    let is_dir = source.is_dir();
    if fs::rename(&source, &destination).is_err() {
        // Cross-device moves fall back to copy + remove.
        let (bytes, _) = if is_dir {
            copy_dir(&source, &destination, true)?
        } else {
            (copy_one(&source, &destination, true)?, 1)
        };
        remove(&source, is_dir)?;
        tracing::debug!(bytes, "Moved across devices");
    }

    let bytes = if is_dir {
        0
    } else {
        fs::metadata(&destination).map(|m| m.len()).unwrap_or(0)
    };

    Ok(TransferResult {
        source,
        destination,
        is_dir,
        bytes,
        items: 1,
    })
}

fn remove(path: &Path, is_dir: bool) -> FileResult<()> {
    if is_dir {
        fs::remove_dir_all(path).map_err(FileError::io(path))
    } else {
        fs::remove_file(path).map_err(FileError::io(path))
    }
}

pub fn delete(path: &str, force: bool, backups_dir: Option<&Path>) -> FileResult<DeleteResult> {
    let path = existing(path)?;
    let is_dir = path.is_dir();

    if is_dir && !force {
        let mut entries = fs::read_dir(&path).map_err(FileError::io(&path))?;
        if entries.next().is_some() {
            return Err(FileError::DirectoryNotEmpty { path });
        }
    }

    let backup = match backups_dir {
        Some(dir) => {
            fs::create_dir_all(dir).map_err(FileError::io(dir))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "root".to_string());
            let backup = dir.join(format!("{}_deleted_{}", name, timestamp()));
            if is_dir {
                copy_dir(&path, &backup, true)?;
            } else {
                copy_one(&path, &backup, true)?;
            }
            Some(backup)
        }
        None => None,
    };

    remove(&path, is_dir)?;
    tracing::info!(path = %path.display(), "Deleted");

    Ok(DeleteResult {
        path,
        is_dir,
        backup,
    })
}

fn local_time(time: std::io::Result<SystemTime>) -> Option<DateTime<Local>> {
    time.ok().map(DateTime::<Local>::from)
}

#[cfg(unix)]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() { 0o444 } else { 0o644 }
}

pub fn file_info(path: &str) -> FileResult<FileInfo> {
    let path = existing(path)?;
    let metadata = fs::metadata(&path).map_err(FileError::io(&path))?;
    let mode = mode_of(&metadata);
    let is_dir = metadata.is_dir();

    let mut info = FileInfo {
        is_dir,
        size: metadata.len(),
        permissions: permissions_string(mode),
        is_executable: !is_dir && mode & 0o111 != 0,
        created: local_time(metadata.created()),
        modified: local_time(metadata.modified()),
        accessed: local_time(metadata.accessed()),
        mime: None,
        signature: None,
        text: None,
        contents: None,
        path,
    };

    if is_dir {
        let mut files = 0;
        let mut dirs = 0;
        let mut bytes = 0;
        for entry in fs::read_dir(&info.path)
            .map_err(FileError::io(&info.path))?
            .flatten()
        {
            match entry.metadata() {
                Ok(m) if m.is_dir() => dirs += 1,
                Ok(m) => {
                    files += 1;
                    bytes += m.len();
                }
                Err(_) => {}
            }
        }
        info.contents = Some((files, dirs, bytes));
        return Ok(info);
    }

    info.mime = Some(mime_for(&info.path));

    let mut header = Vec::with_capacity(super::inspect::BINARY_SNIFF_BYTES);
    fs::File::open(&info.path)
        .and_then(|f| {
            f.take(super::inspect::BINARY_SNIFF_BYTES as u64)
                .read_to_end(&mut header)
        })
        .map_err(FileError::io(&info.path))?;
    info.signature = detect_signature(&header);

    if !is_binary(&header) && info.size <= DEFAULT_MAX_READ {
        let content = fs::read(&info.path).map_err(FileError::io(&info.path))?;
        let content = String::from_utf8_lossy(&content);
        info.text = Some(analyze_content(&content, &info.path));
    }

    Ok(info)
}
