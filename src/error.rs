use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LockboxError {
    #[error("IO error: {context}: {source}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
    #[error("Connection closed by the lockbox")]
    ConnectionClosed,
    #[error("Not connected")]
    NotConnected,
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid {kind} channel {index}, expected 1 or 2")]
    InvalidChannel { kind: &'static str, index: u8 },
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Could not parse reply to {command}: {response:?}")]
    Parse { command: String, response: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for LockboxError {
    fn from(source: std::io::Error) -> Self {
        LockboxError::Io {
            source,
            context: "I/O failure".to_string(),
        }
    }
}
