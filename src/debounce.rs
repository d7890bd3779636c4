//! Debounce primitive
//!
//! A value pushed into a [`Debouncer`] is delivered only after it has stayed
//! unchanged for the configured delay. A push before the delay elapses
//! overwrites the pending value and restarts the timer, so intermediate values
//! are never emitted.
//!
//! The pending value lives in a single-slot [`Mailbox`] with overwrite
//! semantics. One timer task per debouncer watches the mailbox; `cancel()` (or
//! dropping the debouncer) tears that task down, after which nothing is ever
//! emitted.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

/// Single-slot mailbox: a new offer replaces whatever was waiting
///
/// Every offer bumps a generation counter, so a reader can take the value
/// only if nothing was offered since it last looked.
#[derive(Debug)]
pub struct Mailbox<T> {
    slot: Mutex<Slot<T>>,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    generation: u64,
}

impl<T> Mailbox<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                value: None,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put a value in the slot, returning the one it superseded (if any)
    pub fn offer(&self, value: T) -> Option<T> {
        let mut slot = self.lock();
        slot.generation = slot.generation.wrapping_add(1);
        slot.value.replace(value)
    }

    /// Take the waiting value, leaving the slot empty
    pub fn take(&self) -> Option<T> {
        self.lock().value.take()
    }

    /// Number of offers so far
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Take the waiting value only if no offer happened after `generation`
    pub fn take_if_unchanged(&self, generation: u64) -> Option<T> {
        let mut slot = self.lock();
        if slot.generation == generation {
            slot.value.take()
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().value.is_none()
    }
}

impl<T> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

struct Shared<T> {
    mailbox: Mailbox<T>,
    changed: Notify,
}

/// Trailing-edge debouncer backed by a tokio timer task
pub struct Debouncer<T> {
    shared: Arc<Shared<T>>,
    timer: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Send + 'static,
{
    /// Spawn the timer task. Settled values arrive on the returned receiver.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let shared = Arc::new(Shared {
            mailbox: Mailbox::new(),
            changed: Notify::new(),
        });
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let timer = tokio::spawn(run_timer(shared.clone(), delay, out_tx));

        (Self { shared, timer }, out_rx)
    }

    /// Replace the pending value and restart the quiet period
    ///
    /// Returns the superseded value if it had not been emitted yet.
    pub fn push(&self, value: T) -> Option<T> {
        let superseded = self.shared.mailbox.offer(value);
        self.shared.changed.notify_one();
        superseded
    }

    /// Withdraw the pending value without emitting it
    pub fn take_pending(&self) -> Option<T> {
        self.shared.mailbox.take()
    }

    /// Stop the timer and drop any pending value. Idempotent.
    pub fn cancel(&self) {
        self.timer.abort();
        self.shared.mailbox.take();
    }

    /// Whether a value is waiting for its quiet period to elapse
    pub fn is_pending(&self) -> bool {
        !self.shared.mailbox.is_empty()
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

async fn run_timer<T>(shared: Arc<Shared<T>>, delay: Duration, out: mpsc::UnboundedSender<T>) {
    loop {
        // Idle until the first push of a new burst
        shared.changed.notified().await;

        // Each further push restarts the quiet period. A value is emitted
        // only if no push landed since its own quiet period began.
        let value = loop {
            let generation = shared.mailbox.generation();
            tokio::select! {
                _ = shared.changed.notified() => continue,
                _ = tokio::time::sleep(delay) => {
                    match shared.mailbox.take_if_unchanged(generation) {
                        Some(value) => break Some(value),
                        None if shared.mailbox.generation() != generation => continue,
                        None => break None,
                    }
                }
            }
        };

        if let Some(value) = value {
            if out.send(value).is_err() {
                // Consumer is gone
                return;
            }
        }
    }
}
