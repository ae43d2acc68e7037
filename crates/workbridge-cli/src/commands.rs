use clap::{Parser, Subcommand};
use serde_json::Value;
use workbridge_core::mention::TriggerState;
use workbridge_core::project::{CachedFileItem, FileStatus};

#[derive(Parser, Debug)]
#[command(name = "workbridge")]
#[command(about = "Browse an agent workspace and drive its companion editor")]
#[command(version)]
pub struct Cli {
    /// Agent backend URL (overrides the config file)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Discover workspace files and print the ones matching a query
    Files {
        session: String,
        /// Substring to match against file names and paths
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long)]
        limit: Option<usize>,
        /// Keep refreshing and reprint whenever the index changes
        #[arg(long)]
        watch: bool,
    },
    /// Open a file in the editor
    Open {
        session: String,
        path: String,
        #[arg(long)]
        line: Option<u32>,
        #[arg(long, requires = "line")]
        column: Option<u32>,
    },
    /// Focus the explorer and reveal a directory
    OpenDir { session: String, path: String },
    /// Reveal a path in the editor's explorer
    Reveal { session: String, path: String },
    /// Focus the editor's explorer view
    Explorer { session: String },
    /// Run an arbitrary editor command
    Exec {
        session: String,
        command: String,
        /// Arguments, parsed as JSON where possible
        args: Vec<String>,
    },
    /// Show how the @mention trigger reads a piece of input
    Mention {
        text: String,
        /// Caret byte offset (defaults to end of text)
        #[arg(long)]
        caret: Option<usize>,
    },
}

/// Command-line argument to JSON: valid JSON is kept, anything else is a string.
pub fn parse_arg_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn format_file_row(item: &CachedFileItem) -> String {
    let status = match item.status {
        FileStatus::Exists => "exists",
        FileStatus::Loading => "loading",
        FileStatus::Removed => "removed",
    };
    format!("{status:<8} {}", item.path)
}

pub fn format_trigger(state: &TriggerState) -> String {
    if state.is_visible {
        format!(
            "visible query={:?} trigger_index={}",
            state.query, state.trigger_index
        )
    } else {
        "hidden".to_string()
    }
}
