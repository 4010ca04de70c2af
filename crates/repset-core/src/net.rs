//! Connectivity tracking
//!
//! The monitor holds the current online/offline state and notifies
//! subscribers of transitions. Duplicate reports are suppressed, so a
//! subscriber sees at most one event per actual transition; the sync engine
//! consumes the subscription to trigger automatic drains on reconnect.

use tokio::sync::watch;

/// Shared online/offline state with transition notifications
#[derive(Debug, Clone)]
pub struct NetworkMonitor {
    state: std::sync::Arc<watch::Sender<bool>>,
}

impl NetworkMonitor {
    /// Create a monitor with the given initial state
    #[must_use]
    pub fn new(initially_online: bool) -> Self {
        let (state, _) = watch::channel(initially_online);
        Self {
            state: std::sync::Arc::new(state),
        }
    }

    /// Current connectivity
    #[must_use]
    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Record a connectivity report; repeated reports of the current state
    /// are dropped without waking subscribers
    pub fn set_online(&self, online: bool) {
        let changed = self.state.send_if_modified(|state| {
            if *state == online {
                false
            } else {
                *state = online;
                true
            }
        });
        if changed {
            tracing::debug!(online, "connectivity changed");
        }
    }

    /// Subscribe to connectivity transitions
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}
