//! # Socket Session
//!
//! Adapts the host's listener-registration socket API into a session with
//! one handler slot per event kind and an explicit [`ReadyState`].
//!
//! ## Overview
//!
//! [`SocketSession::connect`] opens the host socket right away and registers
//! exactly one forwarding listener per event kind. Application handlers live
//! in slots on the session; assigning a slot replaces the previous handler,
//! so hosts that append listeners never deliver an event twice.
//!
//! ```ignore
//! use core_socket::SocketSession;
//! use bridge_traits::socket::ConnectOptions;
//!
//! let session = SocketSession::connect(host.as_ref(), "wss://example.com/ws", ConnectOptions::default())?;
//! session.set_onmessage(|event| println!("{:?}", event.data));
//! session.send("ping")?;
//! ```

pub mod error;
pub mod event;
pub mod session;
pub mod state;

pub use error::{Result, SocketError};
pub use event::{SocketEventHandler, SocketEventKind, SubscriptionHandle};
pub use session::SocketSession;
pub use state::ReadyState;
