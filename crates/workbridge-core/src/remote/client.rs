use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::protocol::RemoteCommand;
use super::transport::{CommandSocket, SocketConnector, TungsteniteConnector, NORMAL_CLOSURE};
use crate::config::RemoteSettings;
use crate::error::{BridgeError, Result};

/// Delivers single fire-and-forget commands to the editor's remote-control
/// listener. Every call opens its own connection: connect, send one frame,
/// wait the grace period, close.
///
/// There is no acknowledgement frame, so success only means the transport
/// raised no error before the grace period ran out.
pub struct RemoteControlClient {
    host: String,
    timeout: Duration,
    grace: Duration,
    connector: Arc<dyn SocketConnector>,
}

impl RemoteControlClient {
    pub fn new(settings: &RemoteSettings) -> Self {
        Self::with_connector(settings, Arc::new(TungsteniteConnector))
    }

    pub fn with_connector(settings: &RemoteSettings, connector: Arc<dyn SocketConnector>) -> Self {
        Self {
            host: settings.host.clone(),
            timeout: settings.timeout(),
            grace: settings.grace(),
            connector,
        }
    }

    pub fn url(&self, port: u16) -> String {
        format!("ws://{}:{}", self.host, port)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `command` to the listener on `port`.
    ///
    /// Connect, send and the grace period all run under the call timeout; on
    /// expiry the socket (or pending connect) is dropped and `Timeout` returned.
    pub async fn send(&self, port: u16, command: &RemoteCommand) -> Result<()> {
        let url = self.url(port);
        let frame = command.to_frame()?;

        let mut socket: Option<Box<dyn CommandSocket>> = None;
        let outcome =
            tokio::time::timeout(self.timeout, self.exchange(&url, frame, &mut socket)).await;

        match outcome {
            Ok(Ok(())) => {
                if let Some(mut socket) = socket.take() {
                    if let Err(e) = socket.close(NORMAL_CLOSURE).await {
                        debug!("Close handshake with {url} failed: {e}");
                    }
                }
                info!("Sent {} to editor on port {port}", command.command);
                Ok(())
            }
            Ok(Err(message)) => {
                drop(socket);
                warn!("Remote command {} to {url} failed: {message}", command.command);
                Err(BridgeError::connection(port, message))
            }
            Err(_) => {
                drop(socket);
                warn!(
                    "Remote command {} to {url} timed out after {:?}",
                    command.command, self.timeout
                );
                Err(BridgeError::Timeout {
                    port,
                    timeout_ms: self.timeout.as_millis() as u64,
                })
            }
        }
    }

    async fn exchange(
        &self,
        url: &str,
        frame: String,
        slot: &mut Option<Box<dyn CommandSocket>>,
    ) -> std::result::Result<(), String> {
        let socket = slot.insert(self.connector.connect(url).await?);
        socket.send_text(frame).await?;
        socket.linger(self.grace).await
    }
}
