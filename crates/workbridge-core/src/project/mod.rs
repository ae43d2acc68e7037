pub mod api;
pub mod cache;
pub mod discovery;
pub mod workspace;

pub use api::{DirectoryLister, PortResolver, WorkspaceApi};
pub use cache::{
    CacheOptions, CachedFileItem, Clock, FileCache, FileStatus, LoadSummary, SystemClock,
};
pub use discovery::{discover, DiscoveryLimits, DiscoveryReport};
pub use workspace::{basename, join_path, resolve_in_workspace, EntryKind};
