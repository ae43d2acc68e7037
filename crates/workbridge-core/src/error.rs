use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Listing error: {dir}: {message}")]
    Listing { dir: String, message: String },

    #[error("Remote control is not available for session {session}: no editor port resolved")]
    PortUnavailable { session: String },

    #[error("Failed to connect to editor on port {port}: {message}")]
    Connection { port: u16, message: String },

    #[error("Timed out after {timeout_ms}ms talking to editor on port {port}")]
    Timeout { port: u16, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    pub fn listing(dir: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Listing {
            dir: dir.into(),
            message: message.into(),
        }
    }

    pub fn connection(port: u16, message: impl Into<String>) -> Self {
        Self::Connection {
            port,
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_constructors_and_messages() {
        let err = BridgeError::listing("src", "server returned 500");
        assert_eq!(err.to_string(), "Listing error: src: server returned 500");

        let err = BridgeError::connection(8080, "refused");
        assert!(matches!(err, BridgeError::Connection { port: 8080, .. }));
        assert!(!err.is_timeout());

        let err = BridgeError::Timeout {
            port: 8080,
            timeout_ms: 100,
        };
        assert!(err.is_timeout());
    }
}
