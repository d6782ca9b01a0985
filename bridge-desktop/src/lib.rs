//! # Desktop Host Bridges
//!
//! Implementations of the host bridge traits for desktop processes
//! (macOS, Windows, Linux), so the adapter can run outside a mini-game host.
//!
//! ## Overview
//!
//! - `RequestHost` using `reqwest`
//! - `SocketHost` using `tokio-tungstenite`
//! - `StorageHost` backed by a JSON file
//! - `SystemHost` reporting the local OS
//!
//! Request and socket work is spawned onto the caller's Tokio runtime; calling
//! them outside a runtime fails immediately instead of blocking.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopSystem, FileStorage, ReqwestRequestHost, TungsteniteSocketHost};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let request = ReqwestRequestHost::new()?;
//!     let socket = TungsteniteSocketHost::new();
//!     let storage = FileStorage::open("storage.json")?;
//!     let system = DesktopSystem::from_env();
//!     // Hand these to the adapter
//!     Ok(())
//! }
//! ```

mod request;
mod socket;
mod storage;
mod system;

pub use request::ReqwestRequestHost;
pub use socket::{TungsteniteSocket, TungsteniteSocketHost};
pub use storage::FileStorage;
pub use system::{DesktopSystem, APP_KEY_ENV};
