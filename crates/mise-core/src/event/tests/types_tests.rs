use serde_json::json;

use crate::event::Event;
use crate::event::types::{ChangeAction, ChangeEvent, PluginLifecycleEvent};

#[test]
fn test_lifecycle_event_names() {
    let id = || "inventory".to_string();
    assert_eq!(PluginLifecycleEvent::Loaded { plugin_id: id() }.name(), "plugin.loaded");
    assert_eq!(PluginLifecycleEvent::Unloaded { plugin_id: id() }.name(), "plugin.unloaded");
    assert_eq!(PluginLifecycleEvent::Enabled { plugin_id: id() }.name(), "plugin.enabled");
    assert_eq!(PluginLifecycleEvent::Disabled { plugin_id: id() }.name(), "plugin.disabled");
}

#[test]
fn test_change_event_wire_shape() {
    let event = ChangeEvent::new(ChangeAction::AddOfflineData, json!({"id": "orders_1_abc"}), 42);
    let value = serde_json::to_value(&event).expect("serialize");

    assert_eq!(
        value,
        json!({"action": "add_offline_data", "data": {"id": "orders_1_abc"}, "timestamp": 42})
    );
    assert_eq!(ChangeAction::SyncComplete.to_string(), "sync_complete");
}

#[test]
fn test_clone_event_preserves_type() {
    let event = ChangeEvent::new(ChangeAction::Cleanup, json!(null), 7);
    let cloned = event.clone_event();

    let back = cloned.as_any().downcast_ref::<ChangeEvent>().expect("same type");
    assert_eq!(back, &event);
}
