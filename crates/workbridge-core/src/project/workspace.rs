//! Path handling for workspace-relative listings and editor-facing absolute paths.
//!
//! Listing entries only carry a type signal through a trailing `/`; nothing
//! here guesses from extensions or well-known directory names.

/// Whether a listing entry names a file or a sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn of(entry: &str) -> Self {
        if entry.ends_with('/') {
            EntryKind::Directory
        } else {
            EntryKind::File
        }
    }
}

/// Join a parent directory (`""` is the root) and a listing entry name.
/// Trailing separators on directory entries are dropped.
pub fn join_path(parent: &str, entry: &str) -> String {
    let name = entry.trim_end_matches('/');
    let parent = parent.trim_end_matches('/');
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Final path component.
pub fn basename(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Resolve a path mentioned in chat against the workspace root the editor sees.
/// Absolute paths pass through; relative ones (including `./x`) are joined.
pub fn resolve_in_workspace(root: &str, path: &str) -> String {
    if path.starts_with('/') {
        return path.to_string();
    }
    let relative = path.trim_start_matches("./");
    let root = root.trim_end_matches('/');
    if relative.is_empty() {
        return if root.is_empty() { "/".to_string() } else { root.to_string() };
    }
    format!("{root}/{relative}")
}
