use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Tracks whether the remote API is believed reachable.
///
/// The environment reports transitions through [`ConnectivityMonitor::set_online`];
/// listeners only observe actual changes.
#[derive(Debug, Clone)]
pub struct ConnectivityMonitor {
    state: Arc<watch::Sender<bool>>,
}

impl ConnectivityMonitor {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        Self { state: Arc::new(state) }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Report the current state; returns whether it changed
    pub fn set_online(&self, online: bool) -> bool {
        self.state.send_if_modified(|current| {
            if *current == online {
                false
            } else {
                *current = online;
                true
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }

    /// Run `callback(online)` on every transition until the monitor is dropped
    pub fn on_change<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: Fn(bool) + Send + 'static,
    {
        let mut changes = self.subscribe();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let online = *changes.borrow_and_update();
                callback(online);
            }
        })
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}
