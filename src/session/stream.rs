use super::event::TranslationEvent;
use crate::queue::EventQueue;
use futures::stream::{self, Stream};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// How a stream loop waits and shuts down
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Max wait on the queue before re-checking the active flag
    pub poll_interval: Duration,
    /// Hand out whatever is still queued once the flag goes false, then end
    pub drain_on_stop: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            drain_on_stop: false,
        }
    }
}

struct LoopState {
    queue: Arc<EventQueue>,
    active: watch::Receiver<bool>,
    options: StreamOptions,
}

/// Events from `queue` for as long as `active` stays true.
///
/// Each step waits for whichever comes first: an event, the poll interval, or a
/// change of the active flag. The stream ends once the flag is false.
pub fn event_stream(
    queue: Arc<EventQueue>,
    active: watch::Receiver<bool>,
    options: StreamOptions,
) -> impl Stream<Item = TranslationEvent> + Send + 'static {
    let state = LoopState {
        queue,
        active,
        options,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if !*state.active.borrow_and_update() {
                if state.options.drain_on_stop {
                    if let Some(event) = state.queue.try_pop() {
                        return Some((event, state));
                    }
                }
                return None;
            }

            tokio::select! {
                event = state.queue.pop_timeout(state.options.poll_interval) => {
                    if let Some(event) = event {
                        return Some((event, state));
                    }
                }
                changed = state.active.changed() => {
                    // Sender gone means the controller is gone
                    if changed.is_err() {
                        return None;
                    }
                }
            }
        }
    })
}
