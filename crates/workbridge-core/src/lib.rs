pub mod config;
pub mod error;
pub mod mention;
pub mod project;
pub mod remote;
mod sync;

// Re-export key types
pub use config::Settings;
pub use error::{BridgeError, Result};
pub use mention::{MentionInput, TriggerState};
pub use project::{
    CachedFileItem, DirectoryLister, FileCache, FileStatus, LoadSummary, PortResolver,
    WorkspaceApi,
};
pub use remote::{AutoOpenTracker, EditorController, RemoteCommand, RemoteControlClient};
