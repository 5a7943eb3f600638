//! Content inspection: binary signatures, hex dumps, language detection and
//! lightweight text analysis.

use std::path::Path;

/// Bytes scanned for a NUL when deciding whether a file is binary.
pub const BINARY_SNIFF_BYTES: usize = 8192;

/// Bytes shown in a binary hex preview.
pub const HEX_PREVIEW_BYTES: usize = 512;

/// Magic number prefixes, longest match first where prefixes overlap.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"PK\x03\x04", "ZIP Archive"),
    (b"PK\x05\x06", "ZIP Archive (empty)"),
    (b"PK\x07\x08", "ZIP Archive (spanned)"),
    (b"\x1f\x8b", "GZIP Archive"),
    (b"BZh", "BZIP2 Archive"),
    (b"\x7fELF", "ELF Executable"),
    (b"MZ", "Windows Executable"),
    (b"\x89PNG", "PNG Image"),
    (b"\xff\xd8\xff", "JPEG Image"),
    (b"GIF8", "GIF Image"),
    (b"%PDF", "PDF Document"),
    (b"\xd0\xcf\x11\xe0", "Microsoft Office Document"),
];

/// (extension, display name, code fence language)
const LANGUAGES: &[(&str, &str, &str)] = &[
    ("py", "Python", "python"),
    ("js", "JavaScript", "javascript"),
    ("ts", "TypeScript", "typescript"),
    ("rs", "Rust", "rust"),
    ("go", "Go", "go"),
    ("java", "Java", "java"),
    ("html", "HTML", "html"),
    ("css", "CSS", "css"),
    ("json", "JSON", "json"),
    ("xml", "XML", "xml"),
    ("yaml", "YAML", "yaml"),
    ("yml", "YAML", "yaml"),
    ("toml", "TOML", "toml"),
    ("md", "Markdown", "markdown"),
    ("txt", "Plain Text", ""),
    ("log", "Log File", ""),
    ("sql", "SQL", "sql"),
    ("sh", "Shell Script", "bash"),
    ("ps1", "PowerShell", "powershell"),
    ("bat", "Batch File", "batch"),
    ("cmd", "Command File", "batch"),
];

const SECRET_MARKERS: &[&str] = &[
    "password",
    "secret",
    "key",
    "token",
    "api_key",
    "private_key",
    "secret_key",
    "auth",
    "credential",
];

/// Describe a file header by its magic number.
pub fn detect_signature(header: &[u8]) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| header.starts_with(magic))
        .map(|(_, description)| *description)
}

/// A file is treated as binary when its first bytes contain a NUL.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes[..bytes.len().min(BINARY_SNIFF_BYTES)].contains(&0)
}

/// `{offset:08x}  {hex bytes}  |{ascii}|` lines, 16 bytes each.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .enumerate()
        .map(|(i, chunk)| {
            let hex = chunk
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ");
            let ascii: String = chunk
                .iter()
                .map(|&b| {
                    if (32..=126).contains(&b) {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            format!("{:08x}  {:<47} |{}|", i * 16, hex, ascii)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Display name of the language implied by the file extension.
pub fn language_for(path: &Path) -> &'static str {
    let ext = extension(path);
    LANGUAGES
        .iter()
        .find(|(e, _, _)| *e == ext)
        .map(|(_, name, _)| *name)
        .unwrap_or("Unknown")
}

/// Code fence tag for the file extension, empty when unknown.
pub fn fence_for(path: &Path) -> &'static str {
    let ext = extension(path);
    LANGUAGES
        .iter()
        .find(|(e, _, _)| *e == ext)
        .map(|(_, _, fence)| *fence)
        .unwrap_or("")
}

pub fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Last three octal digits of a unix mode, e.g. `644`.
pub fn permissions_string(mode: u32) -> String {
    format!("{:03o}", mode & 0o777)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentAnalysis {
    pub language: &'static str,
    pub lines: usize,
    pub characters: usize,
    pub words: usize,
    pub blank_lines: usize,
    pub functions: usize,
    pub classes: usize,
    pub imports: usize,
    pub potential_secrets: usize,
}

pub fn analyze_content(content: &str, path: &Path) -> ContentAnalysis {
    let ext = extension(path);
    let lines: Vec<&str> = content.lines().collect();

    let mut analysis = ContentAnalysis {
        language: language_for(path),
        lines: lines.len(),
        characters: content.chars().count(),
        words: content.split_whitespace().count(),
        blank_lines: lines.iter().filter(|l| l.trim().is_empty()).count(),
        ..Default::default()
    };

    let (function_markers, class_markers, import_markers): (&[&str], &[&str], &[&str]) =
        match ext.as_str() {
            "py" => (&["def "], &["class "], &["import ", "from "]),
            "js" | "ts" => (
                &["function ", "=> "],
                &["class "],
                &["import ", "require("],
            ),
            "rs" => (&["fn "], &["struct ", "enum ", "trait "], &["use "]),
            "go" => (&["func "], &["type "], &["import "]),
            "java" => (&["void ", "public ", "private "], &["class ", "interface "], &["import "]),
            _ => (&[], &[], &[]),
        };

    for line in &lines {
        let trimmed = line.trim_start();
        if function_markers.iter().any(|m| line.contains(m)) {
            analysis.functions += 1;
        }
        if class_markers.iter().any(|m| line.contains(m)) {
            analysis.classes += 1;
        }
        if import_markers.iter().any(|m| trimmed.starts_with(m)) {
            analysis.imports += 1;
        }
    }

    let lower = content.to_lowercase();
    analysis.potential_secrets = SECRET_MARKERS
        .iter()
        .filter(|marker| lower.contains(*marker))
        .count();

    analysis
}
