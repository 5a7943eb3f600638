//! Streaming file downloads with a size cap.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use reqwest::Url;
use tokio::io::AsyncWriteExt;

use super::client::WebClient;
use super::error::{WebError, WebResult};

pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 100 * 1024 * 1024;

const EXECUTABLE_EXTENSIONS: &[&str] = &[
    "exe", "msi", "dmg", "pkg", "deb", "rpm", "sh", "bat", "cmd",
];
const SCRIPT_EXTENSIONS: &[&str] = &["js", "py", "php", "pl", "rb", "ps1"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz"];

/// File name from the last URL path segment, else `{domain}_download`.
pub fn filename_from_url(url: &Url) -> String {
    let from_path = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| name.contains('.'))
        .map(str::to_string);

    let name = from_path.unwrap_or_else(|| {
        let host = url.host_str().unwrap_or("file");
        format!("{}_download", host.trim_start_matches("www."))
    });
    let name = sanitize_filename::sanitize(name);
    if name.is_empty() {
        "download".to_string()
    } else {
        name
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn file_type(path: &Path) -> String {
    let ext = extension(path);
    let known = match ext.as_str() {
        "pdf" => "PDF document",
        "doc" | "docx" => "Word document",
        "txt" => "Text file",
        "json" => "JSON data file",
        "xml" => "XML data file",
        "csv" => "CSV data file",
        "zip" => "ZIP archive",
        "tar" => "TAR archive",
        "gz" => "GZIP archive",
        "" => "Unknown type",
        _ => return format!("{} file", ext.to_uppercase()),
    };
    known.to_string()
}

pub fn security_notes(path: &Path) -> Vec<String> {
    let ext = extension(path);
    let mut notes = Vec::new();
    if EXECUTABLE_EXTENSIONS.contains(&ext.as_str()) {
        notes.push("Executable file: scan with antivirus before running".to_string());
    }
    if SCRIPT_EXTENSIONS.contains(&ext.as_str()) {
        notes.push("Script file: review the content before executing".to_string());
    }
    if ARCHIVE_EXTENSIONS.contains(&ext.as_str()) {
        notes.push("Archive file: scan contents before extracting".to_string());
    }
    notes
}

pub fn usage_suggestions(path: &Path) -> Vec<String> {
    let hint = match extension(path).as_str() {
        "pdf" => Some("Open with a PDF reader"),
        "json" => Some("Use bb7_read_file to inspect the JSON data"),
        "csv" => Some("Import into a spreadsheet or use for data analysis"),
        "txt" => Some("Use bb7_read_file to view the text"),
        "md" => Some("View as Markdown documentation"),
        "zip" => Some("Extract the archive to access individual files"),
        "tar" => Some("Extract with tar or an archive utility"),
        _ => None,
    };
    let mut out: Vec<String> = hint.map(str::to_string).into_iter().collect();
    out.push("Use bb7_get_file_info to check file metadata".to_string());
    out
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: Url,
    pub filename: Option<String>,
    pub destination: PathBuf,
    pub max_size: u64,
    pub overwrite: bool,
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub path: PathBuf,
    pub size: u64,
    pub content_type: Option<String>,
    pub elapsed: Duration,
    pub file_type: String,
    pub notes: Vec<String>,
    pub security: Vec<String>,
    pub suggestions: Vec<String>,
}

impl DownloadResult {
    pub fn bytes_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.size as f64 / secs
        } else {
            self.size as f64
        }
    }
}

impl WebClient {
    /// Stream a URL to disk through a `.part` file, renamed on completion.
    pub async fn download(&self, request: &DownloadRequest) -> WebResult<DownloadResult> {
        let started = Instant::now();
        let dir = &request.destination;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| WebError::Io {
                path: dir.clone(),
                source,
            })?;

        let filename = match request.filename.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                let clean = sanitize_filename::sanitize(name);
                if clean.is_empty() {
                    return Err(WebError::InvalidInput {
                        message: format!("invalid filename '{}'", name),
                    });
                }
                clean
            }
            _ => filename_from_url(&request.url),
        };
        let path = dir.join(&filename);
        if path.exists() && !request.overwrite {
            return Err(WebError::AlreadyExists { path });
        }

        let response = self.send(&request.url, true).await?;
        if let Some(length) = response.content_length() {
            if length > request.max_size {
                return Err(WebError::TooLarge {
                    size: length,
                    max: request.max_size,
                });
            }
        }
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let partial = dir.join(format!("{}.part", filename));
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source: std::io::Error| WebError::Io { path, source }
        };
        let mut file = tokio::fs::File::create(&partial)
            .await
            .map_err(io_err(&partial))?;

        let mut size = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(source) => {
                    let _ = tokio::fs::remove_file(&partial).await;
                    return Err(WebError::Network {
                        url: request.url.to_string(),
                        source,
                    });
                }
            };
            size += chunk.len() as u64;
            if size > request.max_size {
                drop(file);
                let _ = tokio::fs::remove_file(&partial).await;
                return Err(WebError::TooLarge {
                    size,
                    max: request.max_size,
                });
            }
            file.write_all(&chunk).await.map_err(io_err(&partial))?;
        }
        file.flush().await.map_err(io_err(&partial))?;
        drop(file);
        tokio::fs::rename(&partial, &path)
            .await
            .map_err(io_err(&path))?;

        let mut notes = Vec::new();
        if size > 10 * 1024 * 1024 {
            notes.push("Large file: consider storage space".to_string());
        } else if size < 1024 {
            notes.push("Very small file: verify the content is complete".to_string());
        }

        tracing::info!(url = %request.url, path = %path.display(), size, "Downloaded file");
        Ok(DownloadResult {
            url: request.url.to_string(),
            file_type: file_type(&path),
            security: security_notes(&path),
            suggestions: usage_suggestions(&path),
            path,
            size,
            content_type,
            elapsed: started.elapsed(),
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn filename_comes_from_path_or_domain() {
        assert_eq!(
            filename_from_url(&url("https://example.com/files/report.pdf?x=1")),
            "report.pdf"
        );
        assert_eq!(
            filename_from_url(&url("https://www.example.com/")),
            "example.com_download"
        );
        assert_eq!(
            filename_from_url(&url("https://example.com/api/latest")),
            "example.com_download"
        );
    }

    #[test]
    fn file_types_and_notes() {
        assert_eq!(file_type(Path::new("a.json")), "JSON data file");
        assert_eq!(file_type(Path::new("a.iso")), "ISO file");
        assert_eq!(file_type(Path::new("README")), "Unknown type");

        assert_eq!(security_notes(Path::new("install.sh")).len(), 1);
        assert!(security_notes(Path::new("notes.txt")).is_empty());
        assert!(security_notes(Path::new("bundle.zip"))[0].starts_with("Archive"));

        let hints = usage_suggestions(Path::new("data.csv"));
        assert_eq!(hints.len(), 2);
        assert!(hints[0].contains("spreadsheet"));
    }
}
