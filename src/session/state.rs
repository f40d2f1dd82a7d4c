use tokio::sync::watch;

/// Shared "is translation running" flag.
///
/// Written by start/stop, read by every stream loop. Backed by a watch channel so
/// stream loops can wait for the flag to flip instead of only polling it.
#[derive(Debug)]
pub struct SessionState {
    active: watch::Sender<bool>,
}

impl SessionState {
    pub fn new() -> Self {
        let (active, _) = watch::channel(false);
        Self { active }
    }

    pub fn is_active(&self) -> bool {
        *self.active.borrow()
    }

    pub fn set_active(&self, active: bool) {
        self.active.send_replace(active);
    }

    /// Receiver that wakes whenever the flag changes
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.active.subscribe()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
