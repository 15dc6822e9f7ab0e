//! End-to-end tests against a live Redis server.
//!
//! Ignored by default so the suite stays runnable without infrastructure.
//! Point `CACHET_TEST_REDIS_URL` at a disposable Redis and run:
//!
//! ```text
//! CACHET_TEST_REDIS_URL=redis://127.0.0.1:6379 cargo test -p cachet-redis -- --ignored
//! ```
//!
//! Every test uses its own cache identifier (its own key namespace) and
//! flushes it before and after, so tests do not interfere with each other.

use cachet_redis::{BackendError, BackendOptions, RedisBackend};

fn test_options() -> BackendOptions {
    let url = std::env::var("CACHET_TEST_REDIS_URL")
        .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    let host_port = url.strip_prefix("redis://").unwrap_or(&url);
    let (hostname, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => (host.to_string(), port.parse().expect("port in test url")),
        None => (host_port.to_string(), 6379),
    };
    BackendOptions {
        hostname,
        port,
        ..Default::default()
    }
}

fn fresh_backend(cache: &str) -> RedisBackend {
    let mut backend = RedisBackend::new(cache, &test_options()).expect("redis reachable");
    backend.flush().expect("flush test namespace");
    backend
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn round_trip_plain_and_compressed() {
    let payload = b"some rather large cached value, large cached value, cached value";
    for level in [0u32, 6] {
        let cache = format!("it_round_trip_{level}");
        let options = BackendOptions {
            compression_level: level,
            ..test_options()
        };
        let mut backend = RedisBackend::new(&cache, &options).unwrap();
        backend.flush().unwrap();

        backend.set("id", payload, &[], None).unwrap();
        assert_eq!(backend.get("id").unwrap().as_deref(), Some(payload.as_slice()));
        assert!(backend.has("id").unwrap());
        assert_eq!(backend.get("missing").unwrap(), None);
        assert!(!backend.has("missing").unwrap());

        backend.flush().unwrap();
    }
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn tag_retrieval_and_removal_clean_both_indices() {
    let mut backend = fresh_backend("it_tags");

    backend.set("id", b"v", &["t1", "t2"], None).unwrap();
    assert_eq!(
        backend.find_identifiers_by_tag("t1").unwrap(),
        vec!["id".to_string()]
    );
    assert_eq!(
        backend.find_identifiers_by_tag("t2").unwrap(),
        vec!["id".to_string()]
    );

    assert!(backend.remove("id").unwrap());
    assert!(backend.find_identifiers_by_tag("t1").unwrap().is_empty());
    assert!(backend.find_identifiers_by_tag("t2").unwrap().is_empty());
    assert_eq!(backend.get("id").unwrap(), None);

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn freeze_gates_writes_but_not_reads() {
    let mut backend = fresh_backend("it_freeze");

    backend.set("id", b"v", &["t"], Some(3600)).unwrap();
    backend.freeze().unwrap();
    assert!(backend.is_frozen().unwrap());

    assert!(matches!(
        backend.set("other", b"w", &[], None).unwrap_err(),
        BackendError::Frozen { .. }
    ));
    assert!(matches!(
        backend.remove("id").unwrap_err(),
        BackendError::Frozen { .. }
    ));
    assert!(matches!(
        backend.freeze().unwrap_err(),
        BackendError::AlreadyFrozen { .. }
    ));
    assert!(matches!(
        backend.flush_by_tag("t").unwrap_err(),
        BackendError::Frozen { .. }
    ));

    // Reads and iteration still work on a frozen backend.
    assert_eq!(backend.get("id").unwrap().as_deref(), Some(b"v".as_slice()));
    assert!(backend.has("id").unwrap());
    let scanned: Vec<_> = backend.entries().collect::<Result<_, _>>().unwrap();
    assert_eq!(scanned, vec![("id".to_string(), b"v".to_vec())]);

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn flush_thaws_and_clears_everything() {
    let mut backend = fresh_backend("it_flush");

    backend.set("a", b"1", &["t"], None).unwrap();
    backend.set("b", b"2", &[], None).unwrap();
    backend.freeze().unwrap();

    backend.flush().unwrap();
    assert!(!backend.is_frozen().unwrap());
    assert_eq!(backend.get("a").unwrap(), None);
    assert_eq!(backend.get("b").unwrap(), None);
    assert!(backend.find_identifiers_by_tag("t").unwrap().is_empty());
    assert_eq!(backend.entries().count(), 0);

    // Thawed: writes are accepted again.
    backend.set("c", b"3", &[], None).unwrap();
    assert!(backend.has("c").unwrap());

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn flush_by_tag_removes_exactly_the_tagged_entries() {
    let mut backend = fresh_backend("it_flush_by_tag");

    backend.set("a", b"v1", &["x"], None).unwrap();
    backend.set("b", b"v2", &["x", "y"], None).unwrap();
    backend.set("c", b"v3", &["z"], None).unwrap();

    assert_eq!(backend.flush_by_tag("x").unwrap(), 2);
    assert_eq!(backend.get("a").unwrap(), None);
    assert_eq!(backend.get("b").unwrap(), None);
    assert!(backend.find_identifiers_by_tag("y").unwrap().is_empty());

    // Entries carrying only other tags remain gettable.
    assert_eq!(backend.get("c").unwrap().as_deref(), Some(b"v3".as_slice()));
    assert_eq!(
        backend.find_identifiers_by_tag("z").unwrap(),
        vec!["c".to_string()]
    );

    assert_eq!(backend.flush_by_tag("x").unwrap(), 0);

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn flush_by_tags_accumulates_per_tag_counts() {
    let mut backend = fresh_backend("it_flush_by_tags");

    backend.set("a", b"v1", &["x"], None).unwrap();
    backend.set("b", b"v2", &["x", "y"], None).unwrap();
    backend.set("c", b"v3", &["y"], None).unwrap();

    // x flushes a and b; afterwards y only holds c.
    assert_eq!(backend.flush_by_tags(&["x", "y"]).unwrap(), 3);
    assert_eq!(backend.entries().count(), 0);

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn removing_a_nonexistent_entry_is_a_successful_noop() {
    let mut backend = fresh_backend("it_remove_noop");

    backend.set("keep", b"v", &["t"], None).unwrap();
    assert!(backend.remove("never_existed").unwrap());

    // Store state is unchanged.
    assert_eq!(backend.get("keep").unwrap().as_deref(), Some(b"v".as_slice()));
    assert_eq!(
        backend.find_identifiers_by_tag("t").unwrap(),
        vec!["keep".to_string()]
    );

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn resetting_an_entry_overwrites_but_keeps_stale_tag_memberships() {
    let mut backend = fresh_backend("it_stale_tags");

    backend.set("id", b"v1", &["old"], None).unwrap();
    backend.set("id", b"v2", &["new"], None).unwrap();

    assert_eq!(backend.get("id").unwrap().as_deref(), Some(b"v2".as_slice()));
    // One live payload per id: the entries record holds no duplicate.
    assert_eq!(backend.entries().count(), 1);

    // Accepted legacy behavior: the old membership is not diffed away by
    // set; it stays until remove/flush cleans it up.
    assert_eq!(
        backend.find_identifiers_by_tag("old").unwrap(),
        vec!["id".to_string()]
    );
    assert_eq!(
        backend.find_identifiers_by_tag("new").unwrap(),
        vec!["id".to_string()]
    );

    // The stale membership is harmless to tag flushing and gets cleaned up.
    assert_eq!(backend.flush_by_tag("old").unwrap(), 1);
    assert_eq!(backend.get("id").unwrap(), None);
    assert!(backend.find_identifiers_by_tag("new").unwrap().is_empty());

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn iteration_covers_all_live_entries() {
    let mut backend = fresh_backend("it_iteration");

    for i in 0..250 {
        let id = format!("entry_{i}");
        backend.set(&id, id.as_bytes(), &[], None).unwrap();
    }
    backend.remove("entry_0").unwrap();

    let mut seen: Vec<(String, Vec<u8>)> =
        backend.entries().collect::<Result<_, _>>().unwrap();
    seen.sort();
    assert_eq!(seen.len(), 249);
    for (id, payload) in &seen {
        assert_eq!(id.as_bytes(), payload.as_slice());
        assert_ne!(id, "entry_0");
    }

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn default_lifetime_applies_when_set_has_none() {
    let options = BackendOptions {
        default_lifetime: 3600,
        ..test_options()
    };
    let mut backend = RedisBackend::new("it_default_lifetime", &options).unwrap();
    backend.flush().unwrap();

    backend.set("with_default", b"v", &[], None).unwrap();
    backend.set("unlimited", b"v", &[], Some(0)).unwrap();
    assert!(backend.has("with_default").unwrap());
    assert!(backend.has("unlimited").unwrap());

    backend.flush().unwrap();
}

#[test]
#[ignore = "requires a live Redis (CACHET_TEST_REDIS_URL)"]
fn frozen_flag_is_not_refreshed_across_instances() {
    let mut first = fresh_backend("it_frozen_cache");
    let mut second = RedisBackend::new("it_frozen_cache", &test_options()).unwrap();

    assert!(!first.is_frozen().unwrap());
    second.freeze().unwrap();

    // The first instance cached "not frozen" and keeps serving it; a fresh
    // instance observes the marker.
    assert!(!first.is_frozen().unwrap());
    let mut third = RedisBackend::new("it_frozen_cache", &test_options()).unwrap();
    assert!(third.is_frozen().unwrap());

    third.flush().unwrap();
}
