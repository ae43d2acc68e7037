use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::VecDeque;
use tracing::{debug, warn};

use super::api::DirectoryLister;
use super::workspace::{join_path, EntryKind};
use crate::config::CacheSettings;

/// Bounds on a single discovery pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryLimits {
    /// Listings allowed in flight at once.
    pub max_concurrency: usize,
    /// Deepest directory level to list; the root is depth 0.
    pub max_depth: Option<usize>,
    /// Stop publishing files after this many.
    pub max_entries: Option<usize>,
}

impl Default for DiscoveryLimits {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            max_depth: None,
            max_entries: None,
        }
    }
}

impl From<&CacheSettings> for DiscoveryLimits {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            max_concurrency: settings.max_concurrency,
            max_depth: settings.max_depth,
            max_entries: settings.max_entries,
        }
    }
}

/// What one discovery pass saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub files: usize,
    pub directories: usize,
    /// Directories whose listing failed (`""` is the root).
    pub failed: Vec<String>,
    /// A depth or entry limit cut the pass short.
    pub truncated: bool,
}

impl DiscoveryReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && !self.truncated
    }
}

/// Walk the workspace tree one listing at a time, streaming each directory's
/// files to `on_files` as soon as its listing resolves.
///
/// Sub-directories are listed concurrently up to `limits.max_concurrency`.
/// A failed listing is logged and skipped; siblings and ancestors carry on.
pub async fn discover<L, F>(
    lister: &L,
    session_id: &str,
    limits: &DiscoveryLimits,
    mut on_files: F,
) -> DiscoveryReport
where
    L: DirectoryLister + ?Sized,
    F: FnMut(&[String]),
{
    let mut report = DiscoveryReport::default();
    let mut queue: VecDeque<(String, usize)> = VecDeque::from([(String::new(), 0)]);
    let mut in_flight = FuturesUnordered::new();
    let concurrency = limits.max_concurrency.max(1);

    loop {
        while in_flight.len() < concurrency {
            let Some((dir, depth)) = queue.pop_front() else {
                break;
            };
            in_flight.push(async move {
                let result = lister.list(session_id, &dir).await;
                (dir, depth, result)
            });
        }

        let Some((dir, depth, result)) = in_flight.next().await else {
            break;
        };

        let entries = match result {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to list {}: {e}", display_dir(&dir));
                report.failed.push(dir);
                continue;
            }
        };
        report.directories += 1;
        debug!("Listed {} ({} entries)", display_dir(&dir), entries.len());

        let mut files = Vec::new();
        for entry in &entries {
            if entry.trim_end_matches('/').is_empty() {
                continue;
            }
            match EntryKind::of(entry) {
                EntryKind::Directory => {
                    if limits.max_depth.is_some_and(|max| depth + 1 > max) {
                        report.truncated = true;
                        continue;
                    }
                    queue.push_back((join_path(&dir, entry), depth + 1));
                }
                EntryKind::File => {
                    if limits
                        .max_entries
                        .is_some_and(|max| report.files + files.len() >= max)
                    {
                        report.truncated = true;
                        continue;
                    }
                    files.push(join_path(&dir, entry));
                }
            }
        }

        report.files += files.len();
        if !files.is_empty() {
            on_files(&files);
        }

        if limits.max_entries.is_some_and(|max| report.files >= max) && !queue.is_empty() {
            report.truncated = true;
            queue.clear();
        }
    }

    report
}

fn display_dir(dir: &str) -> &str {
    if dir.is_empty() {
        "<root>"
    } else {
        dir
    }
}
