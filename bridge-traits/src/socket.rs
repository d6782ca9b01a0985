//! Socket Host Abstraction
//!
//! The host opens a socket on `connect_socket` and reports lifecycle and
//! message events through listener registration. Framing is the host's
//! business; the core only sees whole messages.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::request::Headers;

/// Payload of a socket message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketData {
    Text(String),
    Binary(Bytes),
}

impl SocketData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SocketData::Text(text) => Some(text),
            SocketData::Binary(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SocketData::Text(text) => text.len(),
            SocketData::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for SocketData {
    fn from(text: String) -> Self {
        SocketData::Text(text)
    }
}

impl From<&str> for SocketData {
    fn from(text: &str) -> Self {
        SocketData::Text(text.to_string())
    }
}

impl From<Vec<u8>> for SocketData {
    fn from(bytes: Vec<u8>) -> Self {
        SocketData::Binary(Bytes::from(bytes))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenEvent {
    /// Handshake response headers, when the host exposes them
    pub header: Headers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub data: SocketData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseEvent {
    pub code: Option<u16>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorEvent {
    pub err_msg: String,
}

/// Listener registered with a host socket
pub type SocketCallback<E> = Box<dyn Fn(E) + Send + Sync + 'static>;

/// Options forwarded to `connect_socket`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectOptions {
    #[serde(default)]
    pub header: Headers,
    #[serde(default)]
    pub protocols: Vec<String>,
    /// Free-form host-specific options
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConnectOptions {
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header.insert(key.into(), value.into());
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocols.push(protocol.into());
        self
    }
}

/// An open host socket
///
/// Hosts differ in whether `on_*` replaces or appends listeners; callers
/// that need replacement semantics must register once and multiplex.
pub trait SocketHandle: Send + Sync {
    fn on_open(&self, callback: SocketCallback<OpenEvent>);

    fn on_message(&self, callback: SocketCallback<MessageEvent>);

    fn on_close(&self, callback: SocketCallback<CloseEvent>);

    fn on_error(&self, callback: SocketCallback<ErrorEvent>);

    fn send(&self, data: SocketData) -> Result<()>;

    fn close(&self, code: Option<u16>, reason: Option<String>) -> Result<()>;
}

/// Host socket factory
pub trait SocketHost: Send + Sync {
    /// Open a socket to `url`. Connection progress is reported through the
    /// returned handle's events.
    fn connect_socket(&self, url: &str, options: ConnectOptions) -> Result<Box<dyn SocketHandle>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_data_conversions() {
        let text = SocketData::from("ping");
        assert_eq!(text.as_text(), Some("ping"));
        assert_eq!(text.len(), 4);

        let binary = SocketData::from(vec![1u8, 2, 3]);
        assert_eq!(binary.as_text(), None);
        assert_eq!(binary.len(), 3);
        assert!(!binary.is_empty());
    }

    #[test]
    fn test_connect_options_from_json() {
        let options: ConnectOptions = serde_json::from_str(
            r#"{"header":{"x-token":"t"},"protocols":["v1"],"tcpNoDelay":true}"#,
        )
        .unwrap();

        assert_eq!(options.header.get("x-token"), Some(&"t".to_string()));
        assert_eq!(options.protocols, vec!["v1".to_string()]);
        assert_eq!(options.extra.get("tcpNoDelay"), Some(&Value::Bool(true)));
    }
}
