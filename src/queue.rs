//! FIFO between the engine's callback thread and the HTTP stream handler
//!
//! Producers push from plain OS threads and never block beyond a short mutex hold.
//! The consumer waits asynchronously with a timeout so it can re-check liveness.

use crate::session::TranslationEvent;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::warn;

pub struct EventQueue {
    events: Mutex<VecDeque<TranslationEvent>>,
    notify: Notify,
    capacity: Option<usize>,
}

impl EventQueue {
    /// Unbounded queue
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// Queue that drops its oldest event once `capacity` is exceeded
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            events: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    /// Append an event. Always succeeds.
    pub fn push(&self, event: TranslationEvent) {
        {
            let mut events = self.lock();
            events.push_back(event);

            if let Some(cap) = self.capacity {
                while events.len() > cap {
                    if let Some(dropped) = events.pop_front() {
                        warn!(
                            "Event queue full ({}), dropping oldest {:?} event",
                            cap, dropped.kind
                        );
                    }
                }
            }
        }

        self.notify.notify_one();
    }

    /// Take the next event without waiting
    pub fn try_pop(&self) -> Option<TranslationEvent> {
        self.lock().pop_front()
    }

    /// Wait up to `timeout` for the next event. `None` means nothing arrived in time.
    pub async fn pop_timeout(&self, timeout: Duration) -> Option<TranslationEvent> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register interest before checking so a push in between leaves a permit
            let notified = self.notify.notified();

            if let Some(event) = self.try_pop() {
                return Some(event);
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TranslationEvent>> {
        // A panicking producer cannot leave the deque half-modified
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
