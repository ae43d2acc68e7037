use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::error::{BridgeError, Result};

/// Lists one directory level of a session's workspace.
/// Sub-directories are reported with a trailing `/`.
#[async_trait::async_trait]
pub trait DirectoryLister: Send + Sync {
    async fn list(&self, session_id: &str, dir: &str) -> Result<Vec<String>>;
}

/// Resolves the port the companion editor's remote-control listener is bound to.
#[async_trait::async_trait]
pub trait PortResolver: Send + Sync {
    async fn resolve_port(&self, session_id: &str) -> Result<u16>;
}

/// HTTP client for the agent backend's workspace endpoints.
#[derive(Clone)]
pub struct WorkspaceApi {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct PortResponse {
    port: u16,
}

impl WorkspaceApi {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session_url(&self, session_id: &str, endpoint: &str) -> String {
        format!(
            "{}/api/conversations/{}/{}",
            self.base_url,
            urlencoding::encode(session_id),
            endpoint
        )
    }
}

#[async_trait::async_trait]
impl DirectoryLister for WorkspaceApi {
    async fn list(&self, session_id: &str, dir: &str) -> Result<Vec<String>> {
        let url = self.session_url(session_id, "list-files");
        let mut request = self.http.get(&url);
        if !dir.is_empty() {
            request = request.query(&[("path", dir)]);
        }
        debug!("Listing {url} path={dir:?}");

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(BridgeError::listing(
                dir,
                format!("server returned {}", response.status()),
            ));
        }
        Ok(response.json::<Vec<String>>().await?)
    }
}

#[async_trait::async_trait]
impl PortResolver for WorkspaceApi {
    async fn resolve_port(&self, session_id: &str) -> Result<u16> {
        let url = self.session_url(session_id, "vscode-remote-port");
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(BridgeError::PortUnavailable {
                session: session_id.to_string(),
            });
        }
        let body: PortResponse = response.json().await?;
        Ok(body.port)
    }
}
