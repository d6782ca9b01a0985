//! Runtime utilities that abstract over the underlying async executor.
//!
//! Downstream crates use these wrappers so they never need to depend on Tokio
//! directly.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a lightweight current-thread runtime.
///
/// Intended for synchronous entry points (tests, log forwarding outside of a
/// runtime). Panics if the runtime cannot be built.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
