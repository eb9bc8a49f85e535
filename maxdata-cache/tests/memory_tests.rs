use chrono::{Duration, Utc};
use maxdata_cache::{
    spawn_sweeper, CacheConfig, CacheError, CacheRepository, MemoryCacheRepository, NoopCacheRepository,
};
use proptest::prelude::*;
use std::sync::Arc;

fn in_an_hour() -> chrono::DateTime<Utc> {
    Utc::now() + Duration::hours(1)
}

// ── Expiry ───────────────────────────────────────────────────────

#[test]
fn expired_entry_reads_as_absent_and_is_evicted() {
    let cache = MemoryCacheRepository::new();
    cache.set("k", b"v".to_vec(), Utc::now() - Duration::seconds(1));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn live_entry_is_returned() {
    let cache = MemoryCacheRepository::new();
    cache.set("k", b"v".to_vec(), in_an_hour());
    assert_eq!(cache.get("k"), Some(b"v".to_vec()));
}

#[test]
fn set_overwrites_value_and_expiry() {
    let cache = MemoryCacheRepository::new();
    cache.set("k", b"old".to_vec(), Utc::now() - Duration::seconds(5));
    cache.set("k", b"new".to_vec(), in_an_hour());
    assert_eq!(cache.get("k"), Some(b"new".to_vec()));
}

#[test]
fn sweep_removes_only_expired() {
    let cache = MemoryCacheRepository::new();
    let now = Utc::now();
    cache.set("old", vec![1], now - Duration::minutes(1));
    cache.set("fresh", vec![2], now + Duration::minutes(1));
    assert_eq!(cache.sweep_expired(now), 1);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("fresh"), Some(vec![2]));
}

// ── Removal ──────────────────────────────────────────────────────

#[test]
fn wildcard_remove_clears_prefix() {
    let cache = MemoryCacheRepository::new();
    cache.set("prefix/a", vec![1], in_an_hour());
    cache.set("prefix/b", vec![2], in_an_hour());
    cache.set("other/c", vec![3], in_an_hour());

    assert_eq!(cache.remove("prefix*"), 2);
    assert_eq!(cache.get("prefix/a"), None);
    assert_eq!(cache.get("prefix/b"), None);
    assert_eq!(cache.get("other/c"), Some(vec![3]));
}

#[test]
fn exact_remove_leaves_siblings() {
    let cache = MemoryCacheRepository::new();
    cache.set("a", vec![1], in_an_hour());
    cache.set("ab", vec![2], in_an_hour());
    assert_eq!(cache.remove("a"), 1);
    assert_eq!(cache.remove("a"), 0);
    assert_eq!(cache.get("ab"), Some(vec![2]));
}

#[test]
fn clear_empties_cache() {
    let cache = MemoryCacheRepository::new();
    cache.set("a", vec![1], in_an_hour());
    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn noop_repository_never_stores() {
    let cache = NoopCacheRepository;
    cache.set("k", vec![1], in_an_hour());
    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.remove("*"), 0);
}

// ── Sweeper ──────────────────────────────────────────────────────

#[test]
fn sweeper_purges_unread_entries() {
    let cache = Arc::new(MemoryCacheRepository::new());
    cache.set("stale", vec![1], Utc::now() - Duration::seconds(1));
    let _handle = spawn_sweeper(&cache, std::time::Duration::from_millis(10)).unwrap();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !cache.is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(10));
    }
    assert!(cache.is_empty());
}

#[test]
fn sweeper_stops_when_cache_dropped() {
    let cache = Arc::new(MemoryCacheRepository::new());
    let handle = spawn_sweeper(&cache, std::time::Duration::from_millis(5)).unwrap();
    drop(cache);
    handle.join().unwrap();
}

#[test]
fn config_defaults_to_five_minutes() {
    assert_eq!(CacheConfig::default().sweep_interval().as_secs(), 300);
    let parsed: CacheConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(parsed.sweep_interval_secs, 300);
}

#[test]
fn zero_interval_is_rejected() {
    let config = CacheConfig {
        sweep_interval_secs: 0,
    };
    assert!(matches!(config.validate(), Err(CacheError::Configuration(_))));
    assert!(matches!(MemoryCacheRepository::with_sweeper(&config), Err(CacheError::Configuration(_))));

    let cache = Arc::new(MemoryCacheRepository::new());
    let err = spawn_sweeper(&cache, std::time::Duration::ZERO).unwrap_err();
    assert!(err.to_string().contains("non-zero"));
}

#[test]
fn with_sweeper_starts_from_default_config() {
    let config = CacheConfig::default();
    assert!(config.validate().is_ok());
    let cache = MemoryCacheRepository::with_sweeper(&config).unwrap();
    cache.set("people/LoadAll/a", b"x".to_vec(), in_an_hour());
    assert_eq!(cache.get("people/LoadAll/a"), Some(b"x".to_vec()));
}

#[test]
fn with_sweeper_purges_on_the_configured_interval() {
    let cache = MemoryCacheRepository::with_sweeper(&CacheConfig {
        sweep_interval_secs: 1,
    })
    .unwrap();
    cache.set("stale", b"x".to_vec(), Utc::now() - Duration::seconds(1));
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while !cache.is_empty() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(50));
    }
    assert!(cache.is_empty());
}

// ── Properties ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn prefix_remove_keeps_exactly_non_matching(
        keys in prop::collection::hash_set("[ab]{1,4}", 0..20),
        prefix in "[ab]{1,2}",
    ) {
        let cache = MemoryCacheRepository::new();
        for k in &keys {
            cache.set(k, k.as_bytes().to_vec(), in_an_hour());
        }
        let removed = cache.remove(&format!("{prefix}*"));
        let expected = keys.iter().filter(|k| k.starts_with(&prefix)).count();
        prop_assert_eq!(removed, expected);
        for k in &keys {
            prop_assert_eq!(cache.get(k).is_some(), !k.starts_with(&prefix));
        }
    }
}
