use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SocketError {
    #[error("Failed to connect socket to {url}: {source}")]
    Connect { url: String, source: BridgeError },

    #[error("Failed to send on socket: {0}")]
    Send(BridgeError),

    #[error("Failed to close socket: {0}")]
    Close(BridgeError),
}

pub type Result<T> = std::result::Result<T, SocketError>;
