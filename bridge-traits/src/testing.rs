//! Scripted host fakes for tests.
//!
//! [`ScriptedRequestHost`] records every dispatched call and keeps its
//! completion until the test settles it, so timer/completion races can be
//! staged exactly. [`ScriptedSocketHost`] hands out sockets whose listeners
//! *append* on every `on_*` call, like hosts that never replace a listener.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{BridgeError, HostFailure, Result};
use crate::request::{
    Completion, HostDownload, HostDownloadResponse, HostRequest, HostResponse, HostTask,
    HostUpload, RequestHost,
};
use crate::socket::{
    CloseEvent, ConnectOptions, ErrorEvent, MessageEvent, OpenEvent, SocketCallback, SocketData,
    SocketHandle, SocketHost,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Request host
// ============================================================================

/// What the scripted host does when a task is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortBehavior {
    /// Invoke the failure callback with an abort failure (well-behaved host)
    FailCallback,
    /// Drop the completion without invoking it
    DropCallback,
    /// Keep the completion pending; only the test can settle it
    Ignore,
}

/// Reply delivered synchronously from inside the dispatch call
#[derive(Debug, Clone)]
pub enum ImmediateReply {
    Response(HostResponse),
    Download(HostDownloadResponse),
    Failure(HostFailure),
}

/// A call the scripted host received
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Request(HostRequest),
    Upload(HostUpload),
    Download(HostDownload),
}

impl RecordedCall {
    pub fn url(&self) -> &str {
        match self {
            RecordedCall::Request(request) => &request.url,
            RecordedCall::Upload(upload) => &upload.url,
            RecordedCall::Download(download) => &download.url,
        }
    }
}

enum PendingCompletion {
    Response(Completion<HostResponse>),
    Download(Completion<HostDownloadResponse>),
}

impl PendingCompletion {
    fn fail(self, failure: HostFailure) {
        match self {
            PendingCompletion::Response(complete) => complete(Err(failure)),
            PendingCompletion::Download(complete) => complete(Err(failure)),
        }
    }
}

struct ScriptedCall {
    record: RecordedCall,
    pending: Option<PendingCompletion>,
    aborts: usize,
}

struct RequestScript {
    calls: Vec<ScriptedCall>,
    abort_behavior: AbortBehavior,
    immediate: Option<ImmediateReply>,
}

/// Request host whose completions are settled by the test
#[derive(Clone)]
pub struct ScriptedRequestHost {
    script: Arc<Mutex<RequestScript>>,
}

impl Default for ScriptedRequestHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedRequestHost {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(RequestScript {
                calls: Vec::new(),
                abort_behavior: AbortBehavior::FailCallback,
                immediate: None,
            })),
        }
    }

    pub fn with_abort_behavior(self, behavior: AbortBehavior) -> Self {
        lock(&self.script).abort_behavior = behavior;
        self
    }

    /// Settle every subsequent call synchronously with `reply`.
    pub fn with_immediate_reply(self, reply: ImmediateReply) -> Self {
        lock(&self.script).immediate = Some(reply);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.script)
            .calls
            .iter()
            .map(|call| call.record.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.script).calls.len()
    }

    /// Number of `abort()` calls made on the task of call `index`
    pub fn abort_count(&self, index: usize) -> usize {
        lock(&self.script)
            .calls
            .get(index)
            .map(|call| call.aborts)
            .unwrap_or(0)
    }

    pub fn total_aborts(&self) -> usize {
        lock(&self.script).calls.iter().map(|call| call.aborts).sum()
    }

    /// Whether call `index` still holds an unsettled completion
    pub fn is_pending(&self, index: usize) -> bool {
        lock(&self.script)
            .calls
            .get(index)
            .map(|call| call.pending.is_some())
            .unwrap_or(false)
    }

    /// Settle a `request`/`uploadFile` call with a success response.
    pub fn respond(&self, index: usize, response: HostResponse) -> bool {
        match self.take_pending(index) {
            Some(PendingCompletion::Response(complete)) => {
                complete(Ok(response));
                true
            }
            Some(other) => {
                self.restore_pending(index, other);
                false
            }
            None => false,
        }
    }

    /// Settle a `downloadFile` call with a success response.
    pub fn respond_download(&self, index: usize, response: HostDownloadResponse) -> bool {
        match self.take_pending(index) {
            Some(PendingCompletion::Download(complete)) => {
                complete(Ok(response));
                true
            }
            Some(other) => {
                self.restore_pending(index, other);
                false
            }
            None => false,
        }
    }

    /// Settle any call with a failure.
    pub fn fail(&self, index: usize, failure: HostFailure) -> bool {
        match self.take_pending(index) {
            Some(pending) => {
                pending.fail(failure);
                true
            }
            None => false,
        }
    }

    /// Drop the completion of call `index` without invoking it.
    pub fn drop_callback(&self, index: usize) -> bool {
        self.take_pending(index).is_some()
    }

    fn take_pending(&self, index: usize) -> Option<PendingCompletion> {
        lock(&self.script)
            .calls
            .get_mut(index)
            .and_then(|call| call.pending.take())
    }

    fn restore_pending(&self, index: usize, pending: PendingCompletion) {
        if let Some(call) = lock(&self.script).calls.get_mut(index) {
            call.pending = Some(pending);
        }
    }

    fn dispatch(
        &self,
        record: RecordedCall,
        pending: PendingCompletion,
        operation: &'static str,
    ) -> Arc<dyn HostTask> {
        let (index, immediate) = {
            let mut script = lock(&self.script);
            script.calls.push(ScriptedCall {
                record,
                pending: None,
                aborts: 0,
            });
            (script.calls.len() - 1, script.immediate.clone())
        };

        match (immediate, pending) {
            (Some(ImmediateReply::Response(response)), PendingCompletion::Response(complete)) => {
                complete(Ok(response))
            }
            (Some(ImmediateReply::Download(response)), PendingCompletion::Download(complete)) => {
                complete(Ok(response))
            }
            (Some(ImmediateReply::Failure(failure)), pending) => pending.fail(failure),
            (_, pending) => self.restore_pending(index, pending),
        }

        Arc::new(ScriptedTask {
            index,
            operation,
            script: Arc::clone(&self.script),
        })
    }
}

impl RequestHost for ScriptedRequestHost {
    fn request(&self, request: HostRequest, complete: Completion<HostResponse>) -> Arc<dyn HostTask> {
        self.dispatch(
            RecordedCall::Request(request),
            PendingCompletion::Response(complete),
            "request",
        )
    }

    fn upload_file(&self, upload: HostUpload, complete: Completion<HostResponse>) -> Arc<dyn HostTask> {
        self.dispatch(
            RecordedCall::Upload(upload),
            PendingCompletion::Response(complete),
            "uploadFile",
        )
    }

    fn download_file(
        &self,
        download: HostDownload,
        complete: Completion<HostDownloadResponse>,
    ) -> Arc<dyn HostTask> {
        self.dispatch(
            RecordedCall::Download(download),
            PendingCompletion::Download(complete),
            "downloadFile",
        )
    }
}

struct ScriptedTask {
    index: usize,
    operation: &'static str,
    script: Arc<Mutex<RequestScript>>,
}

impl HostTask for ScriptedTask {
    fn abort(&self) {
        let (behavior, pending) = {
            let mut script = lock(&self.script);
            let behavior = script.abort_behavior;
            let Some(call) = script.calls.get_mut(self.index) else {
                return;
            };
            call.aborts += 1;
            let pending = match behavior {
                AbortBehavior::Ignore => None,
                AbortBehavior::FailCallback | AbortBehavior::DropCallback => call.pending.take(),
            };
            (behavior, pending)
        };

        if let (AbortBehavior::FailCallback, Some(pending)) = (behavior, pending) {
            pending.fail(HostFailure::aborted(self.operation));
        }
    }
}

// ============================================================================
// Socket host
// ============================================================================

type Listener<E> = Arc<dyn Fn(E) + Send + Sync + 'static>;

/// Listener kinds of a scripted socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    Open,
    Message,
    Close,
    Error,
}

#[derive(Default)]
struct Listeners {
    open: Vec<Listener<OpenEvent>>,
    message: Vec<Listener<MessageEvent>>,
    close: Vec<Listener<CloseEvent>>,
    error: Vec<Listener<ErrorEvent>>,
}

struct SocketScript {
    url: String,
    options: ConnectOptions,
    listeners: Mutex<Listeners>,
    sent: Mutex<Vec<SocketData>>,
    closes: Mutex<Vec<(Option<u16>, Option<String>)>>,
    send_error: Mutex<Option<BridgeError>>,
}

/// Socket handed out by [`ScriptedSocketHost`]; clones share state.
#[derive(Clone)]
pub struct ScriptedSocket {
    script: Arc<SocketScript>,
}

impl ScriptedSocket {
    fn new(url: &str, options: ConnectOptions) -> Self {
        Self {
            script: Arc::new(SocketScript {
                url: url.to_string(),
                options,
                listeners: Mutex::new(Listeners::default()),
                sent: Mutex::new(Vec::new()),
                closes: Mutex::new(Vec::new()),
                send_error: Mutex::new(None),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.script.url
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.script.options
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        let listeners = lock(&self.script.listeners);
        match kind {
            ListenerKind::Open => listeners.open.len(),
            ListenerKind::Message => listeners.message.len(),
            ListenerKind::Close => listeners.close.len(),
            ListenerKind::Error => listeners.error.len(),
        }
    }

    pub fn sent(&self) -> Vec<SocketData> {
        lock(&self.script.sent).clone()
    }

    pub fn close_calls(&self) -> Vec<(Option<u16>, Option<String>)> {
        lock(&self.script.closes).clone()
    }

    /// Make subsequent `send` calls fail with `error`.
    pub fn fail_sends_with(&self, error: BridgeError) {
        *lock(&self.script.send_error) = Some(error);
    }

    pub fn emit_open(&self) {
        let listeners = lock(&self.script.listeners).open.clone();
        for listener in listeners {
            listener(OpenEvent::default());
        }
    }

    pub fn emit_message(&self, data: impl Into<SocketData>) {
        let data = data.into();
        let listeners = lock(&self.script.listeners).message.clone();
        for listener in listeners {
            listener(MessageEvent { data: data.clone() });
        }
    }

    pub fn emit_close(&self, code: Option<u16>, reason: &str) {
        let listeners = lock(&self.script.listeners).close.clone();
        for listener in listeners {
            listener(CloseEvent {
                code,
                reason: reason.to_string(),
            });
        }
    }

    pub fn emit_error(&self, err_msg: &str) {
        let listeners = lock(&self.script.listeners).error.clone();
        for listener in listeners {
            listener(ErrorEvent {
                err_msg: err_msg.to_string(),
            });
        }
    }
}

impl SocketHandle for ScriptedSocket {
    fn on_open(&self, callback: SocketCallback<OpenEvent>) {
        lock(&self.script.listeners).open.push(Arc::from(callback));
    }

    fn on_message(&self, callback: SocketCallback<MessageEvent>) {
        lock(&self.script.listeners).message.push(Arc::from(callback));
    }

    fn on_close(&self, callback: SocketCallback<CloseEvent>) {
        lock(&self.script.listeners).close.push(Arc::from(callback));
    }

    fn on_error(&self, callback: SocketCallback<ErrorEvent>) {
        lock(&self.script.listeners).error.push(Arc::from(callback));
    }

    fn send(&self, data: SocketData) -> Result<()> {
        if let Some(error) = lock(&self.script.send_error).clone() {
            return Err(error);
        }
        lock(&self.script.sent).push(data);
        Ok(())
    }

    fn close(&self, code: Option<u16>, reason: Option<String>) -> Result<()> {
        lock(&self.script.closes).push((code, reason));
        Ok(())
    }
}

/// Socket host that records connections and exposes their sockets
#[derive(Clone, Default)]
pub struct ScriptedSocketHost {
    sockets: Arc<Mutex<Vec<ScriptedSocket>>>,
    connect_error: Arc<Mutex<Option<BridgeError>>>,
}

impl ScriptedSocketHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `connect_socket` calls fail with `error`.
    pub fn fail_connects_with(&self, error: BridgeError) {
        *lock(&self.connect_error) = Some(error);
    }

    pub fn socket(&self, index: usize) -> Option<ScriptedSocket> {
        lock(&self.sockets).get(index).cloned()
    }

    pub fn connection_count(&self) -> usize {
        lock(&self.sockets).len()
    }
}

impl SocketHost for ScriptedSocketHost {
    fn connect_socket(&self, url: &str, options: ConnectOptions) -> Result<Box<dyn SocketHandle>> {
        if let Some(error) = lock(&self.connect_error).clone() {
            return Err(error);
        }
        let socket = ScriptedSocket::new(url, options);
        lock(&self.sockets).push(socket.clone());
        Ok(Box::new(socket))
    }
}
