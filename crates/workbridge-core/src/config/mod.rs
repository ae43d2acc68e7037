use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::BridgeError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub workspace: WorkspaceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub remote: RemoteSettings,
}

/// Where the agent backend (listing and port APIs) lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Absolute root that relative chat paths are resolved against.
    pub root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub refresh_interval_secs: u64,
    pub max_age_secs: u64,
    pub max_concurrency: usize,
    pub max_depth: Option<usize>,
    pub max_entries: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    pub host: String,
    pub timeout_ms: u64,
    pub grace_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for WorkspaceSettings {
    fn default() -> Self {
        Self {
            root: "/workspace".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 30,
            max_age_secs: 300,
            max_concurrency: 8,
            max_depth: None,
            max_entries: None,
        }
    }
}

impl CacheSettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            timeout_ms: 5000,
            grace_ms: 500,
        }
    }
}

impl RemoteSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("workbridge")
            .join("config.toml")
    }

    /// Load from the default location, falling back to defaults on any problem.
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BridgeError::Config(e.to_string()))
    }

    pub fn save(&self) -> Result<(), BridgeError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), BridgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| BridgeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
