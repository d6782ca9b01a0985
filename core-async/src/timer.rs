//! Single-shot cancellable timers.
//!
//! A timer runs its callback once after a delay unless it is cancelled first.
//! Cancellation and expiry race inside a `select!` that is biased towards
//! cancellation, so a timer cancelled before its deadline is polled never runs
//! its callback.
//!
//! ```rust
//! use core_async::timer;
//! use core_async::time::Duration;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! # core_async::runtime::block_on(async {
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = fired.clone();
//! let handle = timer::schedule(Duration::from_millis(10), move || {
//!     flag.store(true, Ordering::SeqCst);
//! });
//! handle.cancel();
//! core_async::time::sleep(Duration::from_millis(20)).await;
//! assert!(!fired.load(Ordering::SeqCst));
//! # });
//! ```

use crate::runtime::Handle;
use crate::sync::CancellationToken;
use crate::time::{sleep, Duration};

/// Handle to a scheduled timer.
///
/// Dropping the handle does **not** cancel the timer; call [`TimerHandle::cancel`].
#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
    delay: Duration,
}

impl TimerHandle {
    /// Cancels the timer. Idempotent; a no-op once the callback has run.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// The delay this timer was scheduled with.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Schedules `callback` to run once after `delay`.
///
/// # Panics
///
/// Panics when called outside of a runtime. Use [`try_schedule`] where that
/// cannot be guaranteed.
pub fn schedule<F>(delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let handle = Handle::current();
    spawn_timer(&handle, delay, callback)
}

/// Like [`schedule`], but returns `None` instead of panicking when no
/// runtime is running. `callback` is dropped in that case.
pub fn try_schedule<F>(delay: Duration, callback: F) -> Option<TimerHandle>
where
    F: FnOnce() + Send + 'static,
{
    let handle = Handle::try_current().ok()?;
    Some(spawn_timer(&handle, delay, callback))
}

fn spawn_timer<F>(handle: &Handle, delay: Duration, callback: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();

    crate::task::spawn_on(handle, async move {
        tokio::select! {
            biased;
            _ = cancelled.cancelled() => {}
            _ = sleep(delay) => {
                if !cancelled.is_cancelled() {
                    callback();
                }
            }
        }
    });

    TimerHandle { token, delay }
}
