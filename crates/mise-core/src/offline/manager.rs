use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use tokio::sync::Mutex;

use crate::kernel::component::KernelComponent;
use crate::kernel::error::Result;
use crate::offline::connectivity::ConnectivityMonitor;
use crate::offline::sync::{AutoReplayHandle, OfflineSync, spawn_auto_replay};
use crate::storage::config::OfflineConfig;

/// Kernel component owning the offline sync service and its replay task.
///
/// `initialize` runs a cleanup pass, `start` spawns auto-replay when enabled
/// and `stop` shuts it down.
#[derive(Debug)]
pub struct OfflineManager {
    sync: Arc<OfflineSync>,
    monitor: ConnectivityMonitor,
    auto_replay: bool,
    interval: Duration,
    replay_task: Mutex<Option<AutoReplayHandle>>,
}

impl OfflineManager {
    pub fn new(sync: Arc<OfflineSync>, monitor: ConnectivityMonitor, config: &OfflineConfig) -> Self {
        Self {
            sync,
            monitor,
            auto_replay: config.auto_replay,
            interval: Duration::from_secs(config.replay_interval_secs.max(1)),
            replay_task: Mutex::new(None),
        }
    }

    pub fn sync(&self) -> &Arc<OfflineSync> {
        &self.sync
    }

    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    pub async fn is_replaying_automatically(&self) -> bool {
        self.replay_task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl KernelComponent for OfflineManager {
    fn name(&self) -> &'static str {
        "OfflineManager"
    }

    async fn initialize(&self) -> Result<()> {
        self.sync.cleanup().await?;
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if !self.auto_replay {
            info!("Offline auto-replay disabled");
            return Ok(());
        }
        let mut task = self.replay_task.lock().await;
        if task.is_none() {
            *task = Some(spawn_auto_replay(
                self.sync.clone(),
                self.monitor.clone(),
                self.interval,
            ));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let task = self.replay_task.lock().await.take();
        if let Some(task) = task {
            task.stop().await;
        }
        Ok(())
    }
}
