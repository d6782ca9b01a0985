//! Connection state and handler slots of a socket session.

use std::fmt;

use bridge_traits::socket::{CloseEvent, ErrorEvent, MessageEvent, OpenEvent};

use crate::event::{Handler, SocketEventHandler, SocketEventKind, SubscriptionHandle};

/// WebSocket-style ready state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ReadyState {
    #[default]
    Connecting = 0,
    Open = 1,
    /// Never entered by local transitions; kept for API parity
    Closing = 2,
    Closed = 3,
}

impl ReadyState {
    /// Numeric code as exposed by browser WebSockets
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ReadyState::Connecting),
            1 => Some(ReadyState::Open),
            2 => Some(ReadyState::Closing),
            3 => Some(ReadyState::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Connecting => "CONNECTING",
            ReadyState::Open => "OPEN",
            ReadyState::Closing => "CLOSING",
            ReadyState::Closed => "CLOSED",
        };
        f.write_str(name)
    }
}

struct Slot<E> {
    id: u64,
    handler: Handler<E>,
}

/// Mutable state of one session.
///
/// Transitions return the handler to invoke; callers invoke it after
/// releasing the lock around this state.
#[derive(Default)]
pub(crate) struct SessionState {
    ready_state: ReadyState,
    next_id: u64,
    open: Option<Slot<OpenEvent>>,
    message: Option<Slot<MessageEvent>>,
    close: Option<Slot<CloseEvent>>,
    error: Option<Slot<ErrorEvent>>,
}

impl SessionState {
    pub(crate) fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Host open event: `Connecting -> Open`.
    pub(crate) fn mark_open(&mut self) -> Option<Handler<OpenEvent>> {
        self.ready_state = ReadyState::Open;
        self.open.as_ref().map(|slot| slot.handler.clone())
    }

    /// Host close event: any state `-> Closed`.
    pub(crate) fn mark_closed(&mut self) -> Option<Handler<CloseEvent>> {
        self.ready_state = ReadyState::Closed;
        self.close.as_ref().map(|slot| slot.handler.clone())
    }

    pub(crate) fn message_handler(&self) -> Option<Handler<MessageEvent>> {
        self.message.as_ref().map(|slot| slot.handler.clone())
    }

    pub(crate) fn error_handler(&self) -> Option<Handler<ErrorEvent>> {
        self.error.as_ref().map(|slot| slot.handler.clone())
    }

    /// Put `handler` in its slot, replacing whatever was there.
    pub(crate) fn install(&mut self, handler: SocketEventHandler) -> SubscriptionHandle {
        self.next_id += 1;
        let id = self.next_id;
        let kind = handler.kind();
        match handler {
            SocketEventHandler::Open(handler) => self.open = Some(Slot { id, handler }),
            SocketEventHandler::Message(handler) => self.message = Some(Slot { id, handler }),
            SocketEventHandler::Close(handler) => self.close = Some(Slot { id, handler }),
            SocketEventHandler::Error(handler) => self.error = Some(Slot { id, handler }),
        }
        SubscriptionHandle { kind, id }
    }

    /// Clear the slot `handle` refers to, if the handle is still current.
    pub(crate) fn remove(&mut self, handle: SubscriptionHandle) -> bool {
        fn clear<E>(slot: &mut Option<Slot<E>>, id: u64) -> bool {
            if slot.as_ref().is_some_and(|current| current.id == id) {
                *slot = None;
                true
            } else {
                false
            }
        }

        match handle.kind {
            SocketEventKind::Open => clear(&mut self.open, handle.id),
            SocketEventKind::Message => clear(&mut self.message, handle.id),
            SocketEventKind::Close => clear(&mut self.close, handle.id),
            SocketEventKind::Error => clear(&mut self.error, handle.id),
        }
    }

    pub(crate) fn has_handler(&self, kind: SocketEventKind) -> bool {
        match kind {
            SocketEventKind::Open => self.open.is_some(),
            SocketEventKind::Message => self.message.is_some(),
            SocketEventKind::Close => self.close.is_some(),
            SocketEventKind::Error => self.error.is_some(),
        }
    }
}
