use std::collections::HashSet;

use super::controller::EditorController;
use crate::error::Result;

/// Opens each path shown in a chat view at most once for the view's lifetime.
#[derive(Debug, Default)]
pub struct AutoOpenTracker {
    opened: HashSet<String>,
}

impl AutoOpenTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_opened(&self, path: &str) -> bool {
        self.opened.contains(path)
    }

    /// Open `path` unless this tracker already tried it. Returns whether a
    /// command was sent. A failed attempt still counts; retrying is up to the user.
    pub async fn open_once(&mut self, controller: &EditorController, path: &str) -> Result<bool> {
        if !self.opened.insert(path.to_string()) {
            return Ok(false);
        }
        controller.open_file(path).await?;
        Ok(true)
    }

    /// Forget every path, e.g. when the view is torn down or the session changes.
    pub fn clear(&mut self) {
        self.opened.clear();
    }
}
