use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

use super::client::RemoteControlClient;
use super::protocol::RemoteCommand;
use crate::error::{BridgeError, Result};
use crate::project::{resolve_in_workspace, PortResolver};

/// Observable state of the editor connection, for UI affordances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub is_connecting: bool,
    pub last_error: Option<String>,
    pub port: Option<u16>,
}

/// Session-scoped editor operations on top of [`RemoteControlClient`].
///
/// Calls are not serialized: `is_connecting` follows whichever call touched it
/// last, so overlapping calls can briefly report an idle connection.
pub struct EditorController {
    session_id: String,
    workspace_root: String,
    client: Arc<RemoteControlClient>,
    resolver: Arc<dyn PortResolver>,
    state: watch::Sender<ControllerState>,
}

/// Resets `is_connecting` when a call finishes or its future is dropped.
struct ConnectingGuard<'a>(&'a watch::Sender<ControllerState>);

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|state| state.is_connecting = false);
    }
}

impl EditorController {
    pub fn new(
        session_id: impl Into<String>,
        workspace_root: impl Into<String>,
        client: Arc<RemoteControlClient>,
        resolver: Arc<dyn PortResolver>,
    ) -> Self {
        let (state, _) = watch::channel(ControllerState::default());
        Self {
            session_id: session_id.into(),
            workspace_root: workspace_root.into(),
            client,
            resolver,
            state,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> ControllerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerState> {
        self.state.subscribe()
    }

    /// Whether an editor port is known; drives the "not available" affordance.
    pub fn is_available(&self) -> bool {
        self.state.borrow().port.is_some()
    }

    /// Ask the backend which port the editor listens on for this session.
    pub async fn refresh_port(&self) -> Option<u16> {
        match self.resolver.resolve_port(&self.session_id).await {
            Ok(port) => {
                self.state.send_modify(|state| state.port = Some(port));
                Some(port)
            }
            Err(e) => {
                warn!("Editor port unavailable for session {}: {e}", self.session_id);
                self.state.send_modify(|state| state.port = None);
                None
            }
        }
    }

    pub async fn open_file(&self, path: &str) -> Result<()> {
        let path = self.resolve(path);
        self.dispatch(&[RemoteCommand::open_file(&path)]).await
    }

    pub async fn open_file_at_position(
        &self,
        path: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<()> {
        let path = self.resolve(path);
        self.dispatch(&[RemoteCommand::open_file_at(&path, line, column)])
            .await
    }

    /// Forward an arbitrary editor command verbatim.
    pub async fn execute_command(&self, command: &str, args: Vec<Value>) -> Result<()> {
        self.dispatch(&[RemoteCommand::new(command, args)]).await
    }

    /// Show a directory: focus the explorer, then reveal the path in it.
    pub async fn open_directory(&self, path: &str) -> Result<()> {
        let path = self.resolve(path);
        self.dispatch(&[
            RemoteCommand::focus_explorer(),
            RemoteCommand::reveal_in_explorer(&path),
        ])
        .await
    }

    pub async fn focus_explorer(&self) -> Result<()> {
        self.dispatch(&[RemoteCommand::focus_explorer()]).await
    }

    pub async fn reveal_in_explorer(&self, path: &str) -> Result<()> {
        let path = self.resolve(path);
        self.dispatch(&[RemoteCommand::reveal_in_explorer(&path)])
            .await
    }

    fn resolve(&self, path: &str) -> String {
        resolve_in_workspace(&self.workspace_root, path)
    }

    async fn dispatch(&self, commands: &[RemoteCommand]) -> Result<()> {
        self.state.send_modify(|state| {
            state.is_connecting = true;
            state.last_error = None;
        });
        let _connecting = ConnectingGuard(&self.state);

        let result = self.deliver(commands).await;
        if let Err(e) = &result {
            let message = e.to_string();
            self.state
                .send_modify(|state| state.last_error = Some(message));
        }
        result
    }

    async fn deliver(&self, commands: &[RemoteCommand]) -> Result<()> {
        let port = { self.state.borrow().port };
        let port = port.ok_or_else(|| BridgeError::PortUnavailable {
            session: self.session_id.clone(),
        })?;

        for command in commands {
            self.client.send(port, command).await?;
        }
        Ok(())
    }
}
