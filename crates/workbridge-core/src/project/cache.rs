use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::api::DirectoryLister;
use super::discovery::{discover, DiscoveryLimits, DiscoveryReport};
use super::workspace::basename;
use crate::config::CacheSettings;
use crate::sync::lock;

/// Source of "now" for freshness timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Lifecycle tag of a cache entry. `Removed` is a tombstone, not a deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Exists,
    Loading,
    Removed,
}

impl FileStatus {
    fn rank(self) -> u8 {
        match self {
            FileStatus::Exists => 0,
            FileStatus::Loading => 1,
            FileStatus::Removed => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedFileItem {
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    pub status: FileStatus,
    pub last_seen: DateTime<Utc>,
}

impl CachedFileItem {
    fn seen(path: &str, at: DateTime<Utc>) -> Self {
        Self {
            path: path.to_string(),
            name: basename(path).to_string(),
            is_directory: false,
            status: FileStatus::Exists,
            last_seen: at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheOptions {
    pub refresh_interval: Duration,
    /// How long a tombstone survives before it is purged.
    pub max_age: Duration,
    pub limits: DiscoveryLimits,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::from(&CacheSettings::default())
    }
}

impl From<&CacheSettings> for CacheOptions {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            refresh_interval: settings.refresh_interval(),
            max_age: settings.max_age(),
            limits: DiscoveryLimits::from(settings),
        }
    }
}

/// Outcome of one discovery pass, shared by every caller that joined it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub report: DiscoveryReport,
    /// Entries tombstoned because this pass did not see them.
    pub removed: usize,
    /// Tombstones older than `max_age` dropped from the index.
    pub purged: usize,
    pub version: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CachedFileItem>,
    last_refresh: Option<DateTime<Utc>>,
    version: u64,
}

struct InFlight {
    id: u64,
    pass: Shared<BoxFuture<'static, LoadSummary>>,
    foreground: bool,
}

struct CacheInner {
    session_id: String,
    lister: Arc<dyn DirectoryLister>,
    clock: Arc<dyn Clock>,
    options: CacheOptions,
    state: Mutex<CacheState>,
    version_tx: watch::Sender<u64>,
    in_flight: Mutex<Option<InFlight>>,
    next_pass_id: AtomicU64,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

/// In-memory index of a session's workspace files, fed by streaming discovery.
///
/// Cloning is cheap and every clone observes the same index. At most one
/// discovery pass runs at a time; a `load` issued while one is running joins it.
#[derive(Clone)]
pub struct FileCache {
    inner: Arc<CacheInner>,
}

impl FileCache {
    pub fn new(
        session_id: impl Into<String>,
        lister: Arc<dyn DirectoryLister>,
        options: CacheOptions,
    ) -> Self {
        Self::with_clock(session_id, lister, options, Arc::new(SystemClock))
    }

    pub fn with_clock(
        session_id: impl Into<String>,
        lister: Arc<dyn DirectoryLister>,
        options: CacheOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (version_tx, _) = watch::channel(0);
        Self {
            inner: Arc::new(CacheInner {
                session_id: session_id.into(),
                lister,
                clock,
                options,
                state: Mutex::new(CacheState::default()),
                version_tx,
                in_flight: Mutex::new(None),
                next_pass_id: AtomicU64::new(1),
                refresh_task: Mutex::new(None),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    /// Run a discovery pass, or join the one already in flight.
    ///
    /// The first completed load starts the periodic background refresh.
    pub async fn load(&self, is_background_refresh: bool) -> LoadSummary {
        let pass = {
            let mut slot = lock(&self.inner.in_flight);
            match slot.as_mut() {
                Some(existing) => {
                    debug!("Joining discovery pass {} for {}", existing.id, self.inner.session_id);
                    existing.foreground |= !is_background_refresh;
                    existing.pass.clone()
                }
                None => {
                    let id = self.inner.next_pass_id.fetch_add(1, Ordering::SeqCst);
                    let handle = tokio::spawn(CacheInner::run_pass(self.inner.clone(), id));
                    let pass = async move {
                        handle.await.unwrap_or_else(|e| {
                            warn!("Discovery pass {id} aborted: {e}");
                            LoadSummary::default()
                        })
                    }
                    .boxed()
                    .shared();
                    *slot = Some(InFlight {
                        id,
                        pass: pass.clone(),
                        foreground: !is_background_refresh,
                    });
                    pass
                }
            }
        };

        let summary = pass.await;
        self.schedule_refresh();
        summary
    }

    /// True while a foreground pass runs, or while any pass runs on an empty index.
    pub fn is_loading(&self) -> bool {
        let foreground = match lock(&self.inner.in_flight).as_ref() {
            Some(pass) => pass.foreground,
            None => return false,
        };
        foreground || lock(&self.inner.state).entries.is_empty()
    }

    /// Case-insensitive substring match on basename or path.
    ///
    /// Ordered by status (`Exists` first), then basename matches before
    /// path-only matches, then most recently seen, then path. Tombstones past
    /// `max_age` are never returned.
    pub fn get_filtered_files(&self, query: &str, limit: Option<usize>) -> Vec<CachedFileItem> {
        let needle = query.to_lowercase();
        let now = self.inner.clock.now();
        let state = lock(&self.inner.state);

        let mut matches: Vec<(bool, &CachedFileItem)> = state
            .entries
            .values()
            .filter(|item| !self.inner.is_expired(item, now))
            .filter_map(|item| {
                if needle.is_empty() {
                    return Some((false, item));
                }
                let name_match = item.name.to_lowercase().contains(&needle);
                if name_match || item.path.to_lowercase().contains(&needle) {
                    Some((name_match, item))
                } else {
                    None
                }
            })
            .collect();

        matches.sort_by(|(a_name, a), (b_name, b)| {
            a.status
                .rank()
                .cmp(&b.status.rank())
                .then_with(|| b_name.cmp(a_name))
                .then_with(|| b.last_seen.cmp(&a.last_seen))
                .then_with(|| a.path.cmp(&b.path))
        });

        matches
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|(_, item)| item.clone())
            .collect()
    }

    pub fn get(&self, path: &str) -> Option<CachedFileItem> {
        lock(&self.inner.state).entries.get(path).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        lock(&self.inner.state).last_refresh
    }

    pub fn version(&self) -> u64 {
        lock(&self.inner.state).version
    }

    /// Receiver that changes whenever the index is mutated.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.version_tx.subscribe()
    }

    /// Stop scheduling refreshes and forget the in-flight pass.
    ///
    /// Listings already issued still complete and land in the index.
    pub fn shutdown(&self) {
        self.inner.shut_down.store(true, Ordering::SeqCst);
        if let Some(task) = lock(&self.inner.refresh_task).take() {
            task.abort();
        }
        lock(&self.inner.in_flight).take();
        debug!("File cache for {} shut down", self.inner.session_id);
    }

    fn schedule_refresh(&self) {
        if self.inner.shut_down.load(Ordering::SeqCst) {
            return;
        }
        let mut task = lock(&self.inner.refresh_task);
        if task.is_some() {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let interval = self.inner.options.refresh_interval;
        *task = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                if inner.shut_down.load(Ordering::SeqCst) {
                    break;
                }
                FileCache { inner }.load(true).await;
            }
        }));
    }
}

impl CacheInner {
    async fn run_pass(inner: Arc<CacheInner>, id: u64) -> LoadSummary {
        let mut seen: HashSet<String> = HashSet::new();
        let report = discover(
            inner.lister.as_ref(),
            &inner.session_id,
            &inner.options.limits,
            |files| {
                inner.publish(files);
                seen.extend(files.iter().cloned());
            },
        )
        .await;

        // A truncated pass saw only part of the tree, so absence proves nothing.
        let (removed, purged, version) = inner.finish_pass(&seen, !report.truncated);

        {
            let mut slot = lock(&inner.in_flight);
            if slot.as_ref().is_some_and(|pass| pass.id == id) {
                *slot = None;
            }
        }

        info!(
            "Discovery pass {id} for {}: {} files, {} failed dirs, {removed} removed, {purged} purged",
            inner.session_id,
            report.files,
            report.failed.len()
        );

        LoadSummary {
            report,
            removed,
            purged,
            version,
        }
    }

    fn publish(&self, paths: &[String]) {
        let now = self.clock.now();
        let mut state = lock(&self.state);
        for path in paths {
            state
                .entries
                .entry(path.clone())
                .and_modify(|item| {
                    item.status = FileStatus::Exists;
                    item.last_seen = item.last_seen.max(now);
                })
                .or_insert_with(|| CachedFileItem::seen(path, now));
        }
        state.version += 1;
        self.version_tx.send_replace(state.version);
    }

    fn finish_pass(&self, seen: &HashSet<String>, tombstone_unseen: bool) -> (usize, usize, u64) {
        let now = self.clock.now();
        let mut state = lock(&self.state);

        let mut removed = 0;
        for item in state.entries.values_mut() {
            if tombstone_unseen
                && item.status != FileStatus::Removed
                && !seen.contains(&item.path)
            {
                item.status = FileStatus::Removed;
                removed += 1;
            }
        }

        let before = state.entries.len();
        state.entries.retain(|_, item| !self.is_expired(item, now));
        let purged = before - state.entries.len();

        state.last_refresh = Some(now);
        state.version += 1;
        self.version_tx.send_replace(state.version);
        (removed, purged, state.version)
    }

    fn is_expired(&self, item: &CachedFileItem, now: DateTime<Utc>) -> bool {
        item.status == FileStatus::Removed
            && (now - item.last_seen)
                .to_std()
                .is_ok_and(|age| age > self.options.max_age)
    }
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.refresh_task).take() {
            task.abort();
        }
    }
}
