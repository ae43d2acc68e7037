use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

/// Clean websocket close.
pub const NORMAL_CLOSURE: u16 = 1000;

/// Opens websocket connections to the editor. Swapped out in tests.
#[async_trait::async_trait]
pub trait SocketConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn CommandSocket>, String>;
}

/// An open connection that carries outgoing command frames.
///
/// Dropping the socket tears the connection down without a close handshake.
#[async_trait::async_trait]
pub trait CommandSocket: Send {
    async fn send_text(&mut self, text: String) -> Result<(), String>;

    /// Hold the connection open for `grace` so the peer can process the frame.
    /// Errors seen on the socket meanwhile are returned.
    async fn linger(&mut self, grace: Duration) -> Result<(), String> {
        tokio::time::sleep(grace).await;
        Ok(())
    }

    async fn close(&mut self, code: u16) -> Result<(), String>;
}

pub struct TungsteniteConnector;

#[async_trait::async_trait]
impl SocketConnector for TungsteniteConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn CommandSocket>, String> {
        let (stream, _) = connect_async(url).await.map_err(|e| e.to_string())?;
        debug!("Connected to {url}");
        Ok(Box::new(TungsteniteSocket {
            stream,
            peer_closed: false,
        }))
    }
}

struct TungsteniteSocket {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    peer_closed: bool,
}

#[async_trait::async_trait]
impl CommandSocket for TungsteniteSocket {
    async fn send_text(&mut self, text: String) -> Result<(), String> {
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| e.to_string())
    }

    async fn linger(&mut self, grace: Duration) -> Result<(), String> {
        let deadline = tokio::time::sleep(grace);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => return Ok(()),
                frame = self.stream.next() => match frame {
                    Some(Ok(Message::Close(close))) => {
                        let code = close
                            .as_ref()
                            .map(|frame| u16::from(frame.code))
                            .unwrap_or(1005);
                        if code != NORMAL_CLOSURE {
                            warn!("Editor closed the connection with code {code}");
                        }
                        self.peer_closed = true;
                        return Ok(());
                    }
                    // The editor does not answer commands; anything else is ignored.
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => return Err(e.to_string()),
                    None => {
                        self.peer_closed = true;
                        return Ok(());
                    }
                },
            }
        }
    }

    async fn close(&mut self, code: u16) -> Result<(), String> {
        if self.peer_closed {
            return Ok(());
        }
        self.stream
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: "".into(),
            }))
            .await
            .map_err(|e| e.to_string())
    }
}
