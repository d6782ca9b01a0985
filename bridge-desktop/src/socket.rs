//! Socket host implementation using tokio-tungstenite
//!
//! Each connection runs on its own task and talks to the handle through a
//! command channel. Events that fire before a listener is registered are kept
//! and replayed once one arrives, so a caller that registers right after
//! `connect_socket` never misses the open event.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bridge_traits::{
    error::{BridgeError, Result},
    request::Headers,
    socket::{
        CloseEvent, ConnectOptions, ErrorEvent, MessageEvent, OpenEvent, SocketCallback,
        SocketData, SocketHandle, SocketHost,
    },
};
use bytes::Bytes;
use core_async::runtime::Handle;
use core_async::task;
use core_async::sync::mpsc;
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::{
    client::IntoClientRequest,
    http::{HeaderName, HeaderValue},
    protocol::{frame::coding::CloseCode, CloseFrame},
    Message,
};
use tracing::{debug, info, warn};

/// Close code reported when the connection ends without a close frame
const ABNORMAL_CLOSURE: u16 = 1006;

/// WebSocket host backed by tokio-tungstenite
#[derive(Debug, Clone, Default)]
pub struct TungsteniteSocketHost;

impl TungsteniteSocketHost {
    pub fn new() -> Self {
        Self
    }
}

enum Command {
    Send(SocketData),
    Close { code: Option<u16>, reason: Option<String> },
}

struct SlotInner<E> {
    listener: Option<Arc<dyn Fn(E) + Send + Sync>>,
    backlog: VecDeque<E>,
}

/// Listener for one event kind plus the events it has not seen yet
struct EventSlot<E> {
    inner: Mutex<SlotInner<E>>,
}

impl<E> Default for EventSlot<E> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(SlotInner {
                listener: None,
                backlog: VecDeque::new(),
            }),
        }
    }
}

impl<E> EventSlot<E> {
    fn lock(&self) -> MutexGuard<'_, SlotInner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: E) {
        let mut inner = self.lock();
        if let Some(listener) = inner.listener.clone() {
            drop(inner);
            listener(event);
        } else {
            inner.backlog.push_back(event);
        }
    }

    fn register(&self, listener: SocketCallback<E>) {
        let listener: Arc<dyn Fn(E) + Send + Sync> = Arc::from(listener);
        let backlog = {
            let mut inner = self.lock();
            inner.listener = Some(Arc::clone(&listener));
            std::mem::take(&mut inner.backlog)
        };
        for event in backlog {
            listener(event);
        }
    }
}

#[derive(Default)]
struct SocketEvents {
    open: EventSlot<OpenEvent>,
    message: EventSlot<MessageEvent>,
    close: EventSlot<CloseEvent>,
    error: EventSlot<ErrorEvent>,
}

impl SocketEvents {
    fn fail(&self, err_msg: String) {
        self.error.emit(ErrorEvent {
            err_msg: err_msg.clone(),
        });
        self.close.emit(CloseEvent {
            code: Some(ABNORMAL_CLOSURE),
            reason: err_msg,
        });
    }
}

/// Handle to one tungstenite connection
pub struct TungsteniteSocket {
    commands: mpsc::UnboundedSender<Command>,
    events: Arc<SocketEvents>,
}

impl SocketHandle for TungsteniteSocket {
    fn send(&self, data: SocketData) -> Result<()> {
        self.commands
            .send(Command::Send(data))
            .map_err(|_| BridgeError::OperationFailed("sendSocketMessage:fail socket is closed".to_string()))
    }

    fn close(&self, code: Option<u16>, reason: Option<String>) -> Result<()> {
        self.commands
            .send(Command::Close { code, reason })
            .map_err(|_| BridgeError::OperationFailed("closeSocket:fail socket is closed".to_string()))
    }

    fn on_open(&self, callback: SocketCallback<OpenEvent>) {
        self.events.open.register(callback);
    }

    fn on_message(&self, callback: SocketCallback<MessageEvent>) {
        self.events.message.register(callback);
    }

    fn on_close(&self, callback: SocketCallback<CloseEvent>) {
        self.events.close.register(callback);
    }

    fn on_error(&self, callback: SocketCallback<ErrorEvent>) {
        self.events.error.register(callback);
    }
}

impl SocketHost for TungsteniteSocketHost {
    fn connect_socket(&self, url: &str, options: ConnectOptions) -> Result<Box<dyn SocketHandle>> {
        let handle = Handle::try_current().map_err(|_| {
            BridgeError::NotAvailable("connectSocket requires a running async runtime".to_string())
        })?;

        let mut request = url
            .into_client_request()
            .map_err(|e| BridgeError::OperationFailed(format!("connectSocket:fail {e}")))?;
        for (key, value) in &options.header {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| BridgeError::OperationFailed(format!("connectSocket:fail {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| BridgeError::OperationFailed(format!("connectSocket:fail {e}")))?;
            request.headers_mut().insert(name, value);
        }
        if !options.protocols.is_empty() {
            let protocols = HeaderValue::from_str(&options.protocols.join(", "))
                .map_err(|e| BridgeError::OperationFailed(format!("connectSocket:fail {e}")))?;
            request
                .headers_mut()
                .insert("Sec-WebSocket-Protocol", protocols);
        }

        let (commands, receiver) = mpsc::unbounded_channel();
        let events = Arc::new(SocketEvents::default());
        task::spawn_on(&handle, run_connection(request, Arc::clone(&events), receiver));

        debug!(url, "socket connecting");
        Ok(Box::new(TungsteniteSocket { commands, events }))
    }
}

async fn run_connection(
    request: tokio_tungstenite::tungstenite::handshake::client::Request,
    events: Arc<SocketEvents>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let url = request.uri().to_string();
    let (stream, response) = match tokio_tungstenite::connect_async(request).await {
        Ok(connected) => connected,
        Err(e) => {
            warn!(%url, error = %e, "socket connect failed");
            events.fail(e.to_string());
            return;
        }
    };

    let header: Headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
        .collect();
    info!(%url, "socket open");
    events.open.emit(OpenEvent { header });

    let (mut sink, mut source) = stream.split();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Send(data)) => {
                    let message = match data {
                        SocketData::Text(text) => Message::Text(text),
                        SocketData::Binary(bytes) => Message::Binary(bytes.to_vec()),
                    };
                    if let Err(e) = sink.send(message).await {
                        warn!(%url, error = %e, "socket send failed");
                        events.error.emit(ErrorEvent { err_msg: e.to_string() });
                    }
                }
                Some(Command::Close { code, reason }) => {
                    let frame = code.map(|code| CloseFrame {
                        code: CloseCode::from(code),
                        reason: Cow::Owned(reason.unwrap_or_default()),
                    });
                    if let Err(e) = sink.send(Message::Close(frame)).await {
                        events.fail(e.to_string());
                        return;
                    }
                }
                None => {
                    // Handle dropped; nobody is listening any more.
                    let _ = sink.close().await;
                    return;
                }
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    events.message.emit(MessageEvent { data: SocketData::Text(text) });
                }
                Some(Ok(Message::Binary(bytes))) => {
                    events.message.emit(MessageEvent {
                        data: SocketData::Binary(Bytes::from(bytes)),
                    });
                }
                Some(Ok(Message::Close(frame))) => {
                    let (code, reason) = match frame {
                        Some(frame) => (Some(u16::from(frame.code)), frame.reason.into_owned()),
                        None => (None, String::new()),
                    };
                    info!(%url, ?code, "socket closed");
                    events.close.emit(CloseEvent { code, reason });
                    return;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(%url, error = %e, "socket read failed");
                    events.fail(e.to_string());
                    return;
                }
                None => {
                    events.close.emit(CloseEvent {
                        code: Some(ABNORMAL_CLOSURE),
                        reason: "connection closed".to_string(),
                    });
                    return;
                }
            },
        }
    }
}
