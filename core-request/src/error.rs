use bridge_traits::error::HostFailure;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Failure payload from the host, passed through unmodified
    #[error("{0}")]
    Host(HostFailure),

    #[error("{operation} timed out: {message}")]
    TimedOut {
        operation: &'static str,
        message: String,
    },

    /// The host dropped the completion without ever invoking it
    #[error("{operation} was abandoned by the host")]
    Abandoned { operation: &'static str },
}

impl RequestError {
    /// The raw host failure, if this error came from the host.
    pub fn host_failure(&self) -> Option<&HostFailure> {
        match self {
            RequestError::Host(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<HostFailure> for RequestError {
    fn from(failure: HostFailure) -> Self {
        RequestError::Host(failure)
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
