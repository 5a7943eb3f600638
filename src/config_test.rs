use super::config::{Config, Flags, get_data_dir};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_data_dir_respects_env_var() {
    unsafe {
        env::set_var("BB7_DATA_DIR", "/tmp/bb7-data-test1");
    }

    assert_eq!(get_data_dir(), PathBuf::from("/tmp/bb7-data-test1"));

    unsafe {
        env::remove_var("BB7_DATA_DIR");
    }
}

#[test]
#[serial]
fn test_data_dir_falls_back_to_xdg() {
    unsafe {
        env::remove_var("BB7_DATA_DIR");
        env::set_var("XDG_DATA_HOME", "/tmp/xdg-test2");
    }

    assert_eq!(get_data_dir(), PathBuf::from("/tmp/xdg-test2/bb7"));

    unsafe {
        env::remove_var("XDG_DATA_HOME");
    }
}

#[test]
#[serial]
fn test_builder_overrides_env_var() {
    unsafe {
        env::set_var("BB7_DATA_DIR", "/tmp/env-data-test3");
    }

    let config = Config::new().with_data_dir("/tmp/cli-data-test3");
    assert_eq!(config.data_dir, PathBuf::from("/tmp/cli-data-test3"));

    unsafe {
        env::remove_var("BB7_DATA_DIR");
    }
}

#[test]
#[serial]
fn test_flags_from_env() {
    unsafe {
        env::set_var("CLAUDE_MODE", "true");
        env::set_var("ENHANCED_REASONING", "1");
        env::set_var("LONG_CONTEXT_MODE", "no");
        env::remove_var("CROSS_PROJECT_SYNTHESIS");
    }

    let flags = Flags::from_env();
    assert!(flags.claude_mode);
    assert!(flags.enhanced_reasoning);
    assert!(!flags.long_context);
    assert!(!flags.cross_project_synthesis);

    unsafe {
        env::remove_var("CLAUDE_MODE");
        env::remove_var("ENHANCED_REASONING");
        env::remove_var("LONG_CONTEXT_MODE");
    }
}

#[test]
fn test_derived_paths_live_under_data_dir() {
    let config = Config::new().with_data_dir("/srv/bb7");

    assert_eq!(
        config.memory_db_path(),
        PathBuf::from("/srv/bb7/memory/memories.db")
    );
    assert_eq!(config.sessions_dir(), PathBuf::from("/srv/bb7/sessions"));
    assert!(config.data_dirs().iter().all(|d| d.starts_with("/srv/bb7")));
}

#[test]
fn test_ensure_dirs_creates_everything() {
    let temp = TempDir::new().unwrap();
    let config = Config::new().with_data_dir(temp.path().join("data"));

    config.ensure_dirs().expect("directories should be created");

    for dir in config.data_dirs() {
        assert!(dir.is_dir(), "missing {}", dir.display());
    }
}
