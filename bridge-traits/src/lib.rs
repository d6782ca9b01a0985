//! # Host Bridge Traits
//!
//! Contract between the adapter core and the mini-game host runtime.
//!
//! ## Overview
//!
//! The host exposes callback-style primitives (requests, sockets, synchronous
//! storage, system probes). Each trait here captures one of them so the core
//! can be driven by the real host, by the desktop shims in `bridge-desktop`,
//! or by the scripted fakes in [`testing`] (behind the `testing` feature).
//!
//! ## Traits
//!
//! ### Networking
//! - [`RequestHost`](request::RequestHost) - `request` / `uploadFile` / `downloadFile` with abortable tasks
//! - [`SocketHost`](socket::SocketHost) - `connectSocket` and per-socket listener registration
//!
//! ### Storage & System
//! - [`StorageHost`](storage::StorageHost) - Synchronous key-value storage
//! - [`SystemHost`](system::SystemHost) - Capability descriptor, system and env info
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to the host console
//!
//! ## Fail-Fast Strategy
//!
//! A host that lacks a capability reports it through
//! [`HostCapabilities`](system::HostCapabilities) instead of failing at call
//! time. The composition layer checks the descriptor once:
//!
//! ```ignore
//! use bridge_traits::system::SystemHost;
//!
//! fn usable(system: &dyn SystemHost) -> bool {
//!     system.capabilities().is_complete()
//! }
//! ```
//!
//! ## Error Handling
//!
//! Synchronous bridge calls return [`BridgeError`](error::BridgeError).
//! Asynchronous completions carry the host's own
//! [`HostFailure`](error::HostFailure) payload, which callers pass through
//! untouched.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync`. Host callbacks may fire on any
//! thread, including synchronously from inside the dispatching call.

pub mod error;
pub mod logging;
pub mod request;
pub mod socket;
pub mod storage;
pub mod system;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{BridgeError, HostFailure};

// Re-export commonly used types
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use request::{
    Completion, FinishedTask, Headers, HostDownload, HostDownloadResponse, HostRequest,
    HostResponse, HostTask, HostUpload, HttpMethod, RequestHost,
};
pub use socket::{
    CloseEvent, ConnectOptions, ErrorEvent, MessageEvent, OpenEvent, SocketCallback, SocketData,
    SocketHandle, SocketHost,
};
pub use storage::StorageHost;
pub use system::{EnvInfo, HostCapabilities, SystemHost, SystemInfo};
