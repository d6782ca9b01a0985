//! Socket session over a host socket handle.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bridge_traits::socket::{
    CloseEvent, ConnectOptions, ErrorEvent, MessageEvent, OpenEvent, SocketData, SocketHandle,
    SocketHost,
};
use core_runtime::logging::describe_headers;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, SocketError};
use crate::event::{SocketEventHandler, SocketEventKind, SubscriptionHandle};
use crate::state::{ReadyState, SessionState};

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One connection to a socket endpoint.
///
/// The ready state moves `Connecting -> Open` on the host open event and to
/// `Closed` on the host close event; nothing else changes it. In particular
/// [`close`](Self::close) leaves the state alone until the host reports the
/// close.
pub struct SocketSession {
    url: String,
    socket: Box<dyn SocketHandle>,
    state: Arc<Mutex<SessionState>>,
}

impl SocketSession {
    pub const CONNECTING: ReadyState = ReadyState::Connecting;
    pub const OPEN: ReadyState = ReadyState::Open;
    pub const CLOSING: ReadyState = ReadyState::Closing;
    pub const CLOSED: ReadyState = ReadyState::Closed;

    /// Open a socket to `url` and start tracking it.
    ///
    /// # Errors
    ///
    /// [`SocketError::Connect`] when the host refuses to create the socket.
    #[instrument(skip(host, options))]
    pub fn connect(host: &dyn SocketHost, url: &str, options: ConnectOptions) -> Result<Self> {
        debug!(
            headers = %describe_headers(&options.header),
            protocols = options.protocols.len(),
            "connecting socket"
        );
        let socket = host
            .connect_socket(url, options)
            .map_err(|source| SocketError::Connect {
                url: url.to_string(),
                source,
            })?;

        let state = Arc::new(Mutex::new(SessionState::default()));
        install_forwarders(socket.as_ref(), &state);
        info!("socket session created");

        Ok(Self {
            url: url.to_string(),
            socket,
            state,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn ready_state(&self) -> ReadyState {
        lock(&self.state).ready_state()
    }

    /// Install `handler` in its slot, replacing the previous one.
    pub fn subscribe(&self, handler: SocketEventHandler) -> SubscriptionHandle {
        let handle = lock(&self.state).install(handler);
        debug!(kind = %handle.kind(), "handler installed");
        handle
    }

    /// Clear the slot `handle` refers to. Returns `false` for stale handles.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) -> bool {
        lock(&self.state).remove(handle)
    }

    /// Whether a handler currently occupies the `kind` slot.
    pub fn has_handler(&self, kind: SocketEventKind) -> bool {
        lock(&self.state).has_handler(kind)
    }

    pub fn set_onopen(
        &self,
        handler: impl Fn(OpenEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(SocketEventHandler::on_open(handler))
    }

    pub fn set_onmessage(
        &self,
        handler: impl Fn(MessageEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(SocketEventHandler::on_message(handler))
    }

    pub fn set_onclose(
        &self,
        handler: impl Fn(CloseEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(SocketEventHandler::on_close(handler))
    }

    pub fn set_onerror(
        &self,
        handler: impl Fn(ErrorEvent) + Send + Sync + 'static,
    ) -> SubscriptionHandle {
        self.subscribe(SocketEventHandler::on_error(handler))
    }

    /// Send `data` through the host socket. Nothing is buffered locally.
    pub fn send(&self, data: impl Into<SocketData>) -> Result<()> {
        let data = data.into();
        debug!(url = %self.url, bytes = data.len(), "socket send");
        self.socket.send(data).map_err(SocketError::Send)
    }

    /// Ask the host to close the socket.
    pub fn close(&self, code: Option<u16>, reason: Option<&str>) -> Result<()> {
        debug!(url = %self.url, ?code, "socket close requested");
        self.socket
            .close(code, reason.map(str::to_string))
            .map_err(SocketError::Close)
    }
}

impl fmt::Debug for SocketSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketSession")
            .field("url", &self.url)
            .field("ready_state", &self.ready_state())
            .finish_non_exhaustive()
    }
}

/// Register one listener per event kind; they dispatch to the current slot.
fn install_forwarders(socket: &dyn SocketHandle, state: &Arc<Mutex<SessionState>>) {
    let open_state = Arc::clone(state);
    socket.on_open(Box::new(move |event| {
        let handler = lock(&open_state).mark_open();
        debug!("socket open");
        if let Some(handler) = handler {
            handler(event);
        }
    }));

    let message_state = Arc::clone(state);
    socket.on_message(Box::new(move |event| {
        let handler = lock(&message_state).message_handler();
        if let Some(handler) = handler {
            handler(event);
        }
    }));

    let close_state = Arc::clone(state);
    socket.on_close(Box::new(move |event| {
        let handler = lock(&close_state).mark_closed();
        debug!(code = ?event.code, reason = %event.reason, "socket closed");
        if let Some(handler) = handler {
            handler(event);
        }
    }));

    let error_state = Arc::clone(state);
    socket.on_error(Box::new(move |event| {
        warn!(error = %event.err_msg, "socket error");
        let handler = lock(&error_state).error_handler();
        if let Some(handler) = handler {
            handler(event);
        }
    }));
}
