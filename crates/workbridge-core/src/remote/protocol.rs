use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Open a file (or a `file://...#line:col` URI) in the editor.
pub const OPEN: &str = "vscode.open";
/// Bring the explorer view into focus.
pub const FOCUS_EXPLORER: &str = "workbench.view.explorer";
/// Select a path in the explorer tree.
pub const REVEAL_IN_EXPLORER: &str = "revealInExplorer";

/// One remote-control message: `{"command": ..., "args": [...]}`.
///
/// The command id is forwarded verbatim; the editor never answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteCommand {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl RemoteCommand {
    pub fn new(command: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn open_file(path: &str) -> Self {
        Self::new(OPEN, vec![Value::String(path.to_string())])
    }

    pub fn open_file_at(path: &str, line: u32, column: Option<u32>) -> Self {
        Self::new(OPEN, vec![Value::String(position_uri(path, line, column))])
    }

    pub fn focus_explorer() -> Self {
        Self::new(FOCUS_EXPLORER, Vec::new())
    }

    pub fn reveal_in_explorer(path: &str) -> Self {
        Self::new(REVEAL_IN_EXPLORER, vec![Value::String(path.to_string())])
    }

    /// Serialize as the single text frame sent on the wire.
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// `file://<path>#<line>[:<column>]`
pub fn position_uri(path: &str, line: u32, column: Option<u32>) -> String {
    match column {
        Some(column) => format!("file://{path}#{line}:{column}"),
        None => format!("file://{path}#{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_file_frame() {
        let frame = RemoteCommand::open_file("/workspace/x.ts").to_frame().unwrap();
        let value: Value = serde_json::from_str(&frame).unwrap();
        assert_eq!(value, json!({"command": "vscode.open", "args": ["/workspace/x.ts"]}));
    }

    #[test]
    fn test_empty_args_are_omitted() {
        let frame = RemoteCommand::focus_explorer().to_frame().unwrap();
        assert_eq!(frame, r#"{"command":"workbench.view.explorer"}"#);
    }

    #[test]
    fn test_position_uri() {
        assert_eq!(position_uri("/workspace/a.rs", 12, None), "file:///workspace/a.rs#12");
        assert_eq!(
            position_uri("/workspace/a.rs", 12, Some(4)),
            "file:///workspace/a.rs#12:4"
        );
    }

    #[test]
    fn test_missing_args_deserialize_empty() {
        let command: RemoteCommand = serde_json::from_str(r#"{"command":"x.y"}"#).unwrap();
        assert_eq!(command, RemoteCommand::new("x.y", Vec::new()));
    }
}
