//! Tests for directory listings and file search.

use std::fs;

use tempfile::TempDir;

use crate::files::render;
use crate::files::{FileError, FileTool, ListOptions, SearchOptions, SortBy, list_directory, search_files};

fn fixture() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("b.rs"), "fn main() { println!(\"hello\"); }\n").unwrap();
    fs::write(root.join("a.txt"), "Needle in a haystack\n").unwrap();
    fs::write(root.join(".hidden"), "secret").unwrap();
    fs::create_dir_all(root.join("src/deep/deeper")).unwrap();
    fs::write(root.join("src/lib.rs"), "pub fn needle() {}\n").unwrap();
    fs::write(root.join("src/deep/deeper/mod.rs"), "// bottom\n").unwrap();
    fs::write(root.join("src/blob.bin"), b"needle\0\0\0").unwrap();
    temp
}

fn root(temp: &TempDir) -> String {
    temp.path().to_string_lossy().into_owned()
}

#[test]
fn sort_by_parses_known_values() {
    assert_eq!("Size".parse::<SortBy>().unwrap(), SortBy::Size);
    assert_eq!("".parse::<SortBy>().unwrap(), SortBy::Name);
    assert!(matches!(
        "colour".parse::<SortBy>(),
        Err(FileError::InvalidInput { .. })
    ));
}

#[test]
fn list_directory_counts_and_sorts_by_name() {
    let temp = fixture();
    let listing = list_directory(&root(&temp), &ListOptions::default()).unwrap();

    let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec![".hidden", "a.txt", "b.rs", "src"]);
    assert_eq!(listing.dir_count, 1);
    assert_eq!(listing.file_count, 3);
    assert!(listing.extensions.contains(&(".rs".to_string(), 1)));
    assert!(listing.extensions.contains(&("no extension".to_string(), 1)));
}

#[test]
fn list_directory_hides_dotfiles_and_truncates() {
    let temp = fixture();
    let listing = list_directory(
        &root(&temp),
        &ListOptions {
            show_hidden: false,
            sort_by: SortBy::Size,
            max_items: 2,
        },
    )
    .unwrap();

    assert_eq!(listing.total_items, 3);
    assert_eq!(listing.entries.len(), 2);
    assert!(listing.entries.iter().all(|e| !e.name.starts_with('.')));
    // Ascending size puts the directory (size 0) first.
    assert_eq!(listing.entries[0].name, "src");

    let text = render::listing(&listing, true);
    assert!(text.contains("showing 2 of 3 items"));
    assert!(text.contains("| Name"));
}

#[test]
fn list_directory_errors() {
    let temp = fixture();
    let missing = list_directory(&format!("{}/nope", root(&temp)), &ListOptions::default());
    assert!(matches!(missing, Err(FileError::NotFound { .. })));

    let file = list_directory(&format!("{}/a.txt", root(&temp)), &ListOptions::default());
    assert!(matches!(file, Err(FileError::NotADirectory { .. })));
}

#[test]
fn search_by_glob_skips_hidden() {
    let temp = fixture();
    let results = search_files(
        &root(&temp),
        &SearchOptions {
            name_pattern: "*.rs".to_string(),
            ..Default::default()
        },
    )
    .unwrap();

    let mut names: Vec<&str> = results.hits.iter().map(|h| h.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["b.rs", "lib.rs", "mod.rs"]);

    let all = search_files(&root(&temp), &SearchOptions::default()).unwrap();
    assert!(all.hits.iter().all(|h| h.name != ".hidden"));

    let with_hidden = search_files(
        &root(&temp),
        &SearchOptions {
            include_hidden: true,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(with_hidden.hits.iter().any(|h| h.name == ".hidden"));
}

#[test]
fn search_by_content_is_case_insensitive_and_skips_binary() {
    let temp = fixture();
    let results = search_files(
        &root(&temp),
        &SearchOptions {
            content_pattern: Some("NEEDLE".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let mut names: Vec<&str> = results.hits.iter().map(|h| h.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["a.txt", "lib.rs"]);

    let text = render::search(&results, "*", Some("NEEDLE"));
    assert!(text.contains("Search Results: 2 files"));
    assert!(text.contains("**Content:** `NEEDLE`"));
}

#[test]
fn search_respects_depth_and_size() {
    let temp = fixture();
    let shallow = search_files(
        &root(&temp),
        &SearchOptions {
            name_pattern: "*.rs".to_string(),
            max_depth: 1,
            ..Default::default()
        },
    )
    .unwrap();
    let mut names: Vec<&str> = shallow.hits.iter().map(|h| h.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["b.rs", "lib.rs"]);

    let small = search_files(
        &root(&temp),
        &SearchOptions {
            max_size: Some(12),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(small.hits.iter().all(|h| h.size <= 12));
    assert!(small.hits.iter().any(|h| h.name == "mod.rs"));
}

#[test]
fn search_results_are_sorted_by_size_and_capped() {
    let temp = fixture();
    let results = search_files(
        &root(&temp),
        &SearchOptions {
            max_results: 2,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(results.hits.len(), 2);
    assert!(results.hits[0].size >= results.hits[1].size);
}

#[test]
fn search_rejects_bad_glob_and_reports_empty() {
    let temp = fixture();
    let bad = search_files(
        &root(&temp),
        &SearchOptions {
            name_pattern: "[".to_string(),
            ..Default::default()
        },
    );
    assert!(matches!(bad, Err(FileError::InvalidInput { .. })));

    let none = search_files(
        &root(&temp),
        &SearchOptions {
            name_pattern: "*.zig".to_string(),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(render::search(&none, "*.zig", None).starts_with("No files found"));
}

#[test]
fn tool_wrappers_log_operations() {
    let temp = fixture();
    let tool = FileTool::new(temp.path().join("backups"));
    tool.list_directory(&root(&temp), &ListOptions::default())
        .unwrap();
    tool.search_files(&root(&temp), &SearchOptions::default())
        .unwrap();

    let view = tool.history().recent(10, None);
    assert_eq!(view.operations[0].operation, "search");
    assert_eq!(view.operations[1].operation, "list");
}
