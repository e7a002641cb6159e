use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use crate::kernel::component::KernelComponent;
use crate::offline::connectivity::ConnectivityMonitor;
use crate::offline::manager::OfflineManager;
use crate::offline::sync::spawn_auto_replay;
use crate::offline::tests::support::harness;
use crate::offline::types::Operation;
use crate::storage::config::OfflineConfig;

const INTERVAL: Duration = Duration::from_secs(30);

#[tokio::test(start_paused = true)]
async fn test_interval_replays_while_online() {
    let h = harness(true);
    let remote = h.remote.clone();
    let sync = Arc::new(h.sync);
    sync.enqueue("orders", Operation::Create, json!({})).await.expect("enqueue");

    let handle = spawn_auto_replay(sync.clone(), ConnectivityMonitor::new(true), INTERVAL);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(remote.requests().is_empty(), "no replay before the first interval");

    tokio::time::sleep(INTERVAL).await;
    assert_eq!(remote.requests(), vec!["POST /api/orders"]);
    assert!(sync.pending().is_empty());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_nothing_replays_while_offline() {
    let h = harness(true);
    let remote = h.remote.clone();
    let sync = Arc::new(h.sync);
    sync.enqueue("orders", Operation::Create, json!({})).await.expect("enqueue");
    let monitor = ConnectivityMonitor::new(false);

    let handle = spawn_auto_replay(sync.clone(), monitor.clone(), INTERVAL);
    tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;

    assert!(remote.requests().is_empty());
    assert_eq!(sync.pending()[0].retry_count, 0);

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_coming_back_online_triggers_replay() {
    let h = harness(true);
    let remote = h.remote.clone();
    let sync = Arc::new(h.sync);
    sync.enqueue("orders", Operation::Create, json!({})).await.expect("enqueue");
    let monitor = ConnectivityMonitor::new(false);

    let handle = spawn_auto_replay(sync.clone(), monitor.clone(), INTERVAL);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(monitor.set_online(true));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(remote.requests().len(), 1);
    assert!(sync.pending().is_empty());

    handle.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stopped_task_no_longer_replays() {
    let h = harness(true);
    let remote = h.remote.clone();
    let sync = Arc::new(h.sync);

    let handle = spawn_auto_replay(sync.clone(), ConnectivityMonitor::new(true), INTERVAL);
    handle.stop().await;

    sync.enqueue("orders", Operation::Create, json!({})).await.expect("enqueue");
    tokio::time::sleep(INTERVAL * 2).await;

    assert!(remote.requests().is_empty());
    assert_eq!(sync.pending().len(), 1);
}

#[tokio::test]
async fn test_monitor_reports_only_real_transitions() {
    let monitor = ConnectivityMonitor::default();
    assert!(monitor.is_online());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let listener = monitor.on_change(move |online| seen_clone.lock().expect("seen lock").push(online));

    assert!(!monitor.set_online(true));
    assert!(monitor.set_online(false));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!monitor.set_online(false));
    assert!(monitor.set_online(true));
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(monitor.is_online());
    assert_eq!(*seen.lock().expect("seen lock"), vec![false, true]);
    listener.abort();
}

#[tokio::test(start_paused = true)]
async fn test_offline_manager_owns_replay_task() {
    let h = harness(true);
    let sync = Arc::new(h.sync);
    let manager = OfflineManager::new(sync, ConnectivityMonitor::new(true), &OfflineConfig::default());

    manager.initialize().await.expect("initialize");
    assert!(!manager.is_replaying_automatically().await);

    manager.start().await.expect("start");
    assert!(manager.is_replaying_automatically().await);

    manager.stop().await.expect("stop");
    assert!(!manager.is_replaying_automatically().await);
}

#[tokio::test]
async fn test_offline_manager_respects_disabled_auto_replay() {
    let h = harness(true);
    let config = OfflineConfig {
        auto_replay: false,
        ..OfflineConfig::default()
    };
    let manager = OfflineManager::new(Arc::new(h.sync), ConnectivityMonitor::new(true), &config);

    manager.start().await.expect("start");
    assert!(!manager.is_replaying_automatically().await);
    manager.stop().await.expect("stop");
}
