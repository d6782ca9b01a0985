//! Synchronization primitives.
//!
//! Async-aware channels and locks from `tokio::sync`, plus the
//! `CancellationToken` used to stop timers and host tasks.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::oneshot;
//!
//! # core_async::runtime::block_on(async {
//! let (tx, rx) = oneshot::channel();
//! tx.send(7).unwrap();
//! assert_eq!(rx.await.unwrap(), 7);
//! # });
//! ```

pub use tokio::sync::{mpsc, oneshot, Mutex, MutexGuard, Notify};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};
