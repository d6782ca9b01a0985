//! Runtime abstraction layer for the host adapter.
//!
//! Every crate in the workspace reaches the async runtime through this crate
//! instead of naming Tokio directly, so the executor stays swappable in one
//! place.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleep, timeouts, instants
//! - `sync`: Channels and async locks
//! - `runtime`: Runtime handles and `block_on`
//! - `timer`: Single-shot cancellable timers
//!
//! # Examples
//!
//! ```rust
//! use core_async::timer;
//! use core_async::time::Duration;
//!
//! # core_async::runtime::block_on(async {
//! let handle = timer::schedule(Duration::from_secs(5), || {
//!     println!("fired");
//! });
//! handle.cancel();
//! # });
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;
pub mod timer;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};
pub use timer::TimerHandle;
