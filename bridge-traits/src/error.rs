use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure payload reported by a host completion callback.
///
/// Mirrors the host's `{ errMsg, errCode }` object and is handed to callers
/// unmodified.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[error("{err_msg}")]
pub struct HostFailure {
    pub err_msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_code: Option<i64>,
}

impl HostFailure {
    pub fn new(err_msg: impl Into<String>) -> Self {
        Self {
            err_msg: err_msg.into(),
            err_code: None,
        }
    }

    pub fn with_code(mut self, code: i64) -> Self {
        self.err_code = Some(code);
        self
    }

    /// The failure a host reports after `abort()` was called on a task.
    pub fn aborted(operation: &str) -> Self {
        Self::new(format!("{operation}:fail abort"))
    }

    /// Whether this failure was produced by an abort.
    pub fn is_abort(&self) -> bool {
        self.err_msg.ends_with("fail abort")
    }
}
