use chrono::Utc;
use clap::Parser;
use serde_json::json;
use workbridge_cli::{format_file_row, format_trigger, parse_arg_value, Cli, Command};
use workbridge_core::mention::TriggerState;
use workbridge_core::project::{CachedFileItem, FileStatus};

// ========================================================================
// Argument parsing
// ========================================================================

#[test]
fn test_files_defaults() {
    let cli = Cli::try_parse_from(["workbridge", "files", "sess-1"]).unwrap();
    assert_eq!(cli.base_url, None);
    assert_eq!(
        cli.command,
        Command::Files {
            session: "sess-1".into(),
            query: String::new(),
            limit: None,
            watch: false,
        }
    );
}

#[test]
fn test_files_with_query_limit_and_watch() {
    let cli = Cli::try_parse_from([
        "workbridge", "files", "sess-1", "-q", "main", "--limit", "5", "--watch",
    ])
    .unwrap();
    assert_eq!(
        cli.command,
        Command::Files {
            session: "sess-1".into(),
            query: "main".into(),
            limit: Some(5),
            watch: true,
        }
    );
}

#[test]
fn test_base_url_is_global() {
    let cli = Cli::try_parse_from([
        "workbridge",
        "explorer",
        "sess-1",
        "--base-url",
        "http://agent:3000",
    ])
    .unwrap();
    assert_eq!(cli.base_url.as_deref(), Some("http://agent:3000"));
    assert_eq!(
        cli.command,
        Command::Explorer {
            session: "sess-1".into()
        }
    );
}

#[test]
fn test_open_with_position() {
    let cli = Cli::try_parse_from([
        "workbridge", "open", "s", "src/main.rs", "--line", "12", "--column", "4",
    ])
    .unwrap();
    assert_eq!(
        cli.command,
        Command::Open {
            session: "s".into(),
            path: "src/main.rs".into(),
            line: Some(12),
            column: Some(4),
        }
    );
}

#[test]
fn test_open_column_requires_line() {
    let result = Cli::try_parse_from(["workbridge", "open", "s", "a.rs", "--column", "4"]);
    assert!(result.is_err());
}

#[test]
fn test_open_dir_subcommand_name() {
    let cli = Cli::try_parse_from(["workbridge", "open-dir", "s", "src"]).unwrap();
    assert_eq!(
        cli.command,
        Command::OpenDir {
            session: "s".into(),
            path: "src".into(),
        }
    );
}

#[test]
fn test_exec_collects_trailing_args() {
    let cli = Cli::try_parse_from([
        "workbridge",
        "exec",
        "s",
        "workbench.action.files.save",
        "1",
        "two",
    ])
    .unwrap();
    match cli.command {
        Command::Exec { command, args, .. } => {
            assert_eq!(command, "workbench.action.files.save");
            assert_eq!(args, vec!["1".to_string(), "two".to_string()]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn test_mention_caret_optional() {
    let cli = Cli::try_parse_from(["workbridge", "mention", "hi @ma"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Mention {
            text: "hi @ma".into(),
            caret: None,
        }
    );
}

#[test]
fn test_missing_session_is_rejected() {
    assert!(Cli::try_parse_from(["workbridge", "files"]).is_err());
}

// ========================================================================
// Helpers
// ========================================================================

#[test]
fn test_parse_arg_value_keeps_json() {
    assert_eq!(parse_arg_value("42"), json!(42));
    assert_eq!(parse_arg_value("true"), json!(true));
    assert_eq!(parse_arg_value("{\"a\":1}"), json!({"a": 1}));
    assert_eq!(parse_arg_value("\"quoted\""), json!("quoted"));
}

#[test]
fn test_parse_arg_value_falls_back_to_string() {
    assert_eq!(parse_arg_value("file:///workspace/a.rs"), json!("file:///workspace/a.rs"));
    assert_eq!(parse_arg_value(""), json!(""));
}

fn item(path: &str, status: FileStatus) -> CachedFileItem {
    CachedFileItem {
        path: path.to_string(),
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        is_directory: path.ends_with('/'),
        status,
        last_seen: Utc::now(),
    }
}

#[test]
fn test_format_file_row_pads_status() {
    assert_eq!(
        format_file_row(&item("src/main.rs", FileStatus::Exists)),
        "exists   src/main.rs"
    );
    assert_eq!(
        format_file_row(&item("old.txt", FileStatus::Removed)),
        "removed  old.txt"
    );
    assert_eq!(
        format_file_row(&item("src/", FileStatus::Loading)),
        "loading  src/"
    );
}

#[test]
fn test_format_trigger_visible() {
    let state = TriggerState::evaluate("see @src/ma", 11, None);
    assert_eq!(format_trigger(&state), "visible query=\"src/ma\" trigger_index=4");
}

#[test]
fn test_format_trigger_hidden() {
    let state = TriggerState::evaluate("mail@example.com", 16, None);
    assert_eq!(format_trigger(&state), "hidden");
}
