use serde_json::json;

use crate::kernel::constants::CACHE_TTL_MS;
use crate::offline::tests::support::{NOW, harness};
use crate::offline::types::CachedData;

#[tokio::test]
async fn test_cache_put_get_and_overwrite() {
    let h = harness(true);

    h.sync.cache_data("menu", "today", json!(["soup"])).await.expect("cache");
    h.clock.advance(1_000);
    let updated = h.sync.cache_data("menu", "today", json!(["salad"])).await.expect("cache");
    h.sync.cache_data("menu", "tomorrow", json!(["fish"])).await.expect("cache");
    h.sync.cache_data("staff", "today", json!([])).await.expect("cache");

    let entry = h.sync.cached("menu", "today").expect("cached");
    assert_eq!(entry, updated);
    assert_eq!(entry.data, json!(["salad"]));
    assert_eq!(entry.timestamp, NOW + 1_000);
    assert_eq!(entry.version, "1.0");
    assert_eq!(h.sync.cached_collection("menu").len(), 2);
    assert!(h.sync.cached("menu", "yesterday").is_none());
}

#[tokio::test]
async fn test_expired_entries_are_purged_on_read() {
    let h = harness(true);
    h.sync.cache_data("menu", "old", json!(1)).await.expect("cache");
    h.clock.advance(CACHE_TTL_MS);
    h.sync.cache_data("menu", "fresh", json!(2)).await.expect("cache");

    // Exactly at the TTL the old entry is still valid
    assert_eq!(h.sync.cached_collection("menu").len(), 2);

    h.clock.advance(1);
    assert!(h.sync.cached("menu", "old").is_none());

    let persisted: Vec<CachedData> =
        serde_json::from_str(&h.store.get("cached_data").expect("get").expect("present")).expect("json");
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].key, "fresh");
}

#[tokio::test]
async fn test_backdated_entry_is_absent_and_purged() {
    let h = harness(true);
    let stale = json!([{
        "collection": "menu",
        "key": "today",
        "data": "stale",
        "timestamp": NOW - CACHE_TTL_MS - 1,
        "version": "1.0"
    }]);
    h.store.set("cached_data", &stale.to_string()).expect("set");

    assert!(h.sync.cached_collection("menu").is_empty());
    assert_eq!(h.store.get("cached_data").expect("get").as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_cleanup_reports_expired_cache_entries() {
    let h = harness(true);
    h.sync.cache_data("menu", "a", json!(1)).await.expect("cache");
    h.sync.cache_data("menu", "b", json!(2)).await.expect("cache");
    h.clock.advance(CACHE_TTL_MS + 1);

    let report = h.sync.cleanup().await.expect("cleanup");
    assert_eq!(report.expired_cache_entries, 2);
    assert_eq!(report.stale_queue_entries, 0);
}

#[tokio::test]
async fn test_corrupt_cache_reads_as_empty() {
    let h = harness(true);
    h.store.set("cached_data", "{oops").expect("set");
    assert!(h.sync.cached_collection("menu").is_empty());
}
