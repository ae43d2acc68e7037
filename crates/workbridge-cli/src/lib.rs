// Library interface for workbridge-cli so integration tests can reach the
// argument parser and formatting helpers.

pub mod app;
pub mod commands;

pub use commands::{format_file_row, format_trigger, parse_arg_value, Cli, Command};
