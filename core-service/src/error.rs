use bridge_traits::error::BridgeError;
use core_socket::SocketError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Socket error: {0}")]
    Socket(#[from] SocketError),

    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
