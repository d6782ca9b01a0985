//! Event kinds, handlers and subscription handles.

use std::fmt;
use std::sync::Arc;

use bridge_traits::socket::{CloseEvent, ErrorEvent, MessageEvent, OpenEvent};

/// Handler stored in a session slot
pub type Handler<E> = Arc<dyn Fn(E) + Send + Sync + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketEventKind {
    Open,
    Message,
    Close,
    Error,
}

impl SocketEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SocketEventKind::Open => "open",
            SocketEventKind::Message => "message",
            SocketEventKind::Close => "close",
            SocketEventKind::Error => "error",
        }
    }
}

impl fmt::Display for SocketEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies the handler installed by one `subscribe` call.
///
/// A handle goes stale once its slot is reassigned; unsubscribing with a
/// stale handle does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    pub(crate) kind: SocketEventKind,
    pub(crate) id: u64,
}

impl SubscriptionHandle {
    pub fn kind(&self) -> SocketEventKind {
        self.kind
    }
}

/// A handler for one event kind
#[derive(Clone)]
pub enum SocketEventHandler {
    Open(Handler<OpenEvent>),
    Message(Handler<MessageEvent>),
    Close(Handler<CloseEvent>),
    Error(Handler<ErrorEvent>),
}

impl SocketEventHandler {
    pub fn on_open(handler: impl Fn(OpenEvent) + Send + Sync + 'static) -> Self {
        SocketEventHandler::Open(Arc::new(handler))
    }

    pub fn on_message(handler: impl Fn(MessageEvent) + Send + Sync + 'static) -> Self {
        SocketEventHandler::Message(Arc::new(handler))
    }

    pub fn on_close(handler: impl Fn(CloseEvent) + Send + Sync + 'static) -> Self {
        SocketEventHandler::Close(Arc::new(handler))
    }

    pub fn on_error(handler: impl Fn(ErrorEvent) + Send + Sync + 'static) -> Self {
        SocketEventHandler::Error(Arc::new(handler))
    }

    pub fn kind(&self) -> SocketEventKind {
        match self {
            SocketEventHandler::Open(_) => SocketEventKind::Open,
            SocketEventHandler::Message(_) => SocketEventKind::Message,
            SocketEventHandler::Close(_) => SocketEventKind::Close,
            SocketEventHandler::Error(_) => SocketEventKind::Error,
        }
    }
}

impl fmt::Debug for SocketEventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SocketEventHandler").field(&self.kind()).finish()
    }
}
