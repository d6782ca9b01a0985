//! In-flight operation bookkeeping.
//!
//! A [`PendingOperation`] ties together one host task, at most one
//! [`TimerGuard`] and the channel that settles the caller's future. Its
//! [`Settler`] is moved into the host completion; whichever of completion,
//! timer or drop comes first decides the outcome.
//!
//! Phases move strictly forward:
//!
//! ```text
//! InFlight --settle--> Settled
//! InFlight --expire--> TimedOut --settle/drop--> Settled
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use bridge_traits::request::HostTask;
use core_async::sync::oneshot;
use core_async::time::Duration;
use core_async::timer::{self, TimerHandle};
use tracing::{debug, warn};

use crate::error::{RequestError, Result};

/// Lifecycle phase of a pending operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Dispatched, no outcome yet
    InFlight,
    /// The timer fired and the task was aborted; waiting for the host
    TimedOut,
    /// The future has been settled
    Settled,
}

/// A single cancellation timer bound to one operation.
///
/// Dropping the guard clears the timer.
#[derive(Debug)]
pub struct TimerGuard {
    handle: TimerHandle,
}

impl TimerGuard {
    /// Arm a timer that runs `on_fire` once after `delay`.
    ///
    /// Returns `None` when no runtime is available to drive the timer.
    pub fn arm<F>(delay: Duration, on_fire: F) -> Option<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        timer::try_schedule(delay, on_fire).map(|handle| Self { handle })
    }

    pub fn delay(&self) -> Duration {
        self.handle.delay()
    }

    /// Clear the timer. A no-op once it has fired.
    pub fn clear(self) {
        self.handle.cancel();
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.cancel();
    }
}

/// How an armed timer behaves when it fires
#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    pub delay: Duration,
    /// Logged at WARN on expiry
    pub message: String,
    /// Settle with [`RequestError::TimedOut`] on expiry instead of waiting
    /// for the host's abort callback
    pub settle_on_timeout: bool,
}

struct PendingState<T> {
    phase: Phase,
    timer: Option<TimerGuard>,
    timed_out_message: Option<String>,
    sender: Option<oneshot::Sender<Result<T>>>,
}

struct Shared<T> {
    operation: &'static str,
    state: Mutex<PendingState<T>>,
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, PendingState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, outcome: Result<T>) {
        let (sender, timer) = {
            let mut state = self.lock();
            if state.phase == Phase::Settled {
                debug!(operation = self.operation, "late completion ignored");
                return;
            }
            state.phase = Phase::Settled;
            (state.sender.take(), state.timer.take())
        };

        if let Some(timer) = timer {
            timer.clear();
        }
        if let Some(sender) = sender {
            let _ = sender.send(outcome);
        }
    }

    fn expire(&self, task: &dyn HostTask, message: &str, settle_on_timeout: bool) {
        let sender = {
            let mut state = self.lock();
            if state.phase != Phase::InFlight {
                return;
            }
            // The guard already fired; dropping it only cancels a spent token.
            state.timer = None;
            state.timed_out_message = Some(message.to_string());
            if settle_on_timeout {
                state.phase = Phase::Settled;
                state.sender.take()
            } else {
                state.phase = Phase::TimedOut;
                None
            }
        };

        warn!(operation = self.operation, "{}", message);
        task.abort();

        if let Some(sender) = sender {
            let _ = sender.send(Err(RequestError::TimedOut {
                operation: self.operation,
                message: message.to_string(),
            }));
        }
    }

    fn abandon(&self) {
        let (sender, timer, error) = {
            let mut state = self.lock();
            let error = match state.phase {
                Phase::Settled => return,
                Phase::InFlight => RequestError::Abandoned {
                    operation: self.operation,
                },
                Phase::TimedOut => RequestError::TimedOut {
                    operation: self.operation,
                    message: state.timed_out_message.take().unwrap_or_default(),
                },
            };
            state.phase = Phase::Settled;
            (state.sender.take(), state.timer.take(), error)
        };

        warn!(operation = self.operation, error = %error, "completion dropped without a result");
        drop(timer);
        if let Some(sender) = sender {
            let _ = sender.send(Err(error));
        }
    }
}

/// Settles a [`PendingOperation`]; moved into the host completion callback.
///
/// Dropping it without calling [`settle`](Self::settle) settles the
/// operation with `Abandoned`, or `TimedOut` when the timer already fired.
pub struct Settler<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Settler<T> {
    pub fn settle(mut self, outcome: Result<T>) {
        if let Some(shared) = self.shared.take() {
            shared.settle(outcome);
        }
    }
}

impl<T> Drop for Settler<T> {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            shared.abandon();
        }
    }
}

/// One in-flight host operation awaiting its outcome
pub struct PendingOperation<T> {
    shared: Arc<Shared<T>>,
    receiver: oneshot::Receiver<Result<T>>,
}

impl<T: Send + 'static> PendingOperation<T> {
    /// Create the operation and the settler to hand to the host.
    pub fn new(operation: &'static str) -> (Self, Settler<T>) {
        let (sender, receiver) = oneshot::channel();
        let shared = Arc::new(Shared {
            operation,
            state: Mutex::new(PendingState {
                phase: Phase::InFlight,
                timer: None,
                timed_out_message: None,
                sender: Some(sender),
            }),
        });
        let settler = Settler {
            shared: Some(Arc::clone(&shared)),
        };
        (Self { shared, receiver }, settler)
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase
    }

    /// Whether a timer is currently armed.
    pub fn has_timer(&self) -> bool {
        self.shared.lock().timer.is_some()
    }

    /// Arm the timeout for `task`.
    ///
    /// Does nothing when `policy` is `None` or when the operation already
    /// settled (the host completed synchronously inside the dispatch call).
    pub fn arm(&self, task: Arc<dyn HostTask>, policy: Option<TimeoutPolicy>) {
        let Some(policy) = policy else {
            return;
        };

        let mut state = self.shared.lock();
        if state.phase != Phase::InFlight {
            debug!(operation = self.shared.operation, "completed before timer was armed");
            return;
        }

        let weak: Weak<Shared<T>> = Arc::downgrade(&self.shared);
        let TimeoutPolicy {
            delay,
            message,
            settle_on_timeout,
        } = policy;
        state.timer = TimerGuard::arm(delay, move || {
            if let Some(shared) = weak.upgrade() {
                shared.expire(task.as_ref(), &message, settle_on_timeout);
            }
        });
        if state.timer.is_none() {
            warn!(
                operation = self.shared.operation,
                "no async runtime to drive the timeout; running unguarded"
            );
        }
    }

    /// Wait for the operation to settle.
    pub async fn wait(self) -> Result<T> {
        let operation = self.shared.operation;
        self.receiver
            .await
            .unwrap_or(Err(RequestError::Abandoned { operation }))
    }
}
