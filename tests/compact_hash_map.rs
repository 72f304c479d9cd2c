// CompactHashMap / CompactHashSet test suite.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. The core invariants exercised:
// - Map semantics: insert returns the previous value, len counts keys.
// - Density: removal moves the last entry into the hole, so array-order
//   iteration changes in exactly that way.
// - Payload release: removed, cleared, drained and retained-away entries
//   are dropped immediately.
// - Configuration: invalid configs are rejected, sizing hints honored.
use compact_hashmap::{
    CompactConfig, CompactHashMap, CompactHashSet, ConfigError, MIN_LOAD_FACTOR,
};
use std::collections::hash_map::RandomState;
use std::rc::Rc;

// Test: basic put/get/remove lifecycle.
// Verifies: previous-value reporting and absence after remove.
#[test]
fn put_get_remove() {
    let mut m = CompactHashMap::new();
    assert_eq!(m.insert("a".to_string(), 1), None);
    assert_eq!(m.insert("b".to_string(), 2), None);
    assert_eq!(m.insert("c".to_string(), 3), None);
    assert_eq!(m.len(), 3);
    assert_eq!(m.insert("b".to_string(), 20), Some(2));
    assert_eq!(m.len(), 3);

    assert_eq!(m.remove("b"), Some(20));
    assert_eq!(m.get("b"), None);
    assert!(!m.contains_key("b"));
    assert_eq!(m.remove("b"), None);
    assert_eq!(m.remove_entry("a"), Some(("a".to_string(), 1)));
    assert_eq!(m.len(), 1);
}

// Test: iteration before and after removal.
// Assumes: no removals means array order equals insertion order.
// Verifies: removing "b" leaves the two survivors; removing an interior
// entry relocates the last one into its slot.
#[test]
fn iteration_follows_array_order() {
    let mut m = CompactHashMap::new();
    for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
        m.insert(k, v);
    }
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["a", "b", "c"]);

    m.remove("b");
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["a", "c"]);
    assert_eq!(m.values().copied().collect::<Vec<_>>(), [1, 3]);

    m.insert("d", 4);
    m.insert("e", 5);
    m.remove("a");
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["e", "c", "d"]);
}

// Test: twenty keys, every even-indexed one removed.
// Verifies: size 10 and every survivor retrievable with its value.
#[test]
fn remove_every_even_indexed_key() {
    let mut m = CompactHashMap::new();
    for i in 0..20 {
        m.insert(format!("k{i}"), i);
    }
    for i in (0..20).step_by(2) {
        assert_eq!(m.remove(&format!("k{i}")), Some(i));
    }
    assert_eq!(m.len(), 10);
    for i in (1..20).step_by(2) {
        assert_eq!(m.get(&format!("k{i}")), Some(&i));
    }
    for i in (0..20).step_by(2) {
        assert!(m.get(&format!("k{i}")).is_none());
    }
}

// Test: growth across many resizes.
// Verifies: all keys survive rehashing; capacity tracks the load factor.
#[test]
fn grows_and_keeps_everything() {
    let mut m = CompactHashMap::new();
    assert_eq!(m.capacity(), 0, "nothing allocated before first insert");
    for i in 0..10_000u32 {
        m.insert(i, i.wrapping_mul(7));
    }
    assert_eq!(m.len(), 10_000);
    assert!(m.capacity() >= 10_000);
    for i in 0..10_000u32 {
        assert_eq!(m[&i], i.wrapping_mul(7));
    }
    assert!(!m.is_fallback());
}

// Test: the expected-size hint.
// Verifies: a map built for n entries does not grow while reaching n.
#[test]
fn expected_size_avoids_resize() {
    let mut m = CompactHashMap::with_expected_size(100);
    m.insert(0u32, 0u32);
    let cap = m.capacity();
    assert!(cap >= 100);
    for i in 1..100 {
        m.insert(i, i);
    }
    assert_eq!(m.capacity(), cap);
}

// Test: reserve and shrink_to_fit.
// Verifies: reserve makes room up front; shrinking an emptied map
// releases the bucket array and the map stays usable.
#[test]
fn reserve_and_shrink() {
    let mut m: CompactHashMap<u32, u32> = CompactHashMap::new();
    m.insert(1, 1);
    m.reserve(500);
    assert!(m.capacity() >= 501);
    for i in 0..400 {
        m.insert(i, i);
    }
    for i in 0..400 {
        m.remove(&i);
    }
    m.shrink_to_fit();
    assert_eq!(m.capacity(), 0);
    m.insert(7, 7);
    assert_eq!(m.get(&7), Some(&7));
}

// Test: payload release.
// Verifies: Rc strong counts drop as soon as entries leave the map,
// through remove, retain, drain and clear.
#[test]
fn removed_payloads_are_released() {
    let tracker = Rc::new(());
    let mut m = CompactHashMap::new();
    for i in 0..8 {
        m.insert(i, Rc::clone(&tracker));
    }
    assert_eq!(Rc::strong_count(&tracker), 9);

    m.remove(&0);
    assert_eq!(Rc::strong_count(&tracker), 8);

    m.retain(|k, _| k % 2 == 0);
    assert_eq!(Rc::strong_count(&tracker), 4);

    let first: Vec<_> = m.drain().take(1).collect();
    assert_eq!(Rc::strong_count(&tracker), 2, "unconsumed drain items drop");
    drop(first);

    for i in 0..5 {
        m.insert(i, Rc::clone(&tracker));
    }
    m.clear();
    assert_eq!(Rc::strong_count(&tracker), 1);
    assert!(m.is_empty());
}

// Test: in-place mutation through get_mut, iter_mut and values_mut.
#[test]
fn mutation_through_views() {
    let mut m: CompactHashMap<u32, Vec<u32>> = (0..5).map(|k| (k, vec![k])).collect();
    m.get_mut(&3).unwrap().push(30);
    for (k, v) in &mut m {
        v.push(*k + 100);
    }
    for v in m.values_mut() {
        v.reverse();
    }
    assert_eq!(m[&3], vec![103, 30, 3]);
    assert_eq!(m[&0], vec![100, 0]);
}

// Test: bulk construction and extend with duplicate keys.
// Verifies: later duplicates overwrite earlier values.
#[test]
fn from_iter_and_extend() {
    let mut m: CompactHashMap<&str, i32> = [("x", 1), ("y", 2), ("x", 3)].into_iter().collect();
    assert_eq!(m.len(), 2);
    assert_eq!(m["x"], 3);
    let more = [("z", 26), ("y", 25)];
    m.extend(more.iter().map(|&(k, v)| (k, v)));
    assert_eq!(m.len(), 3);
    assert_eq!(m["y"], 25);

    let owned: Vec<(&str, i32)> = m.clone().into_iter().collect();
    assert_eq!(owned.len(), 3);
    let rebuilt: CompactHashMap<&str, i32> = owned.into_iter().collect();
    assert_eq!(m, rebuilt);
}

// Test: Index on a missing key.
#[test]
#[should_panic(expected = "key not found")]
fn index_missing_key_panics() {
    let m: CompactHashMap<u32, u32> = CompactHashMap::new();
    let _ = m[&1];
}

// Test: configuration validation.
// Verifies: each invalid field maps to its ConfigError variant.
#[test]
fn config_validation() {
    let bad_lf = CompactHashMap::<u32, u32>::with_config(
        CompactConfig::new().with_load_factor(0.0),
        RandomState::new(),
    );
    assert!(matches!(bad_lf, Err(ConfigError::LoadFactor(_))));

    let bad_chain = CompactHashMap::<u32, u32>::with_config(
        CompactConfig::new().with_max_bucket_len(0),
        RandomState::new(),
    );
    assert!(matches!(bad_chain, Err(ConfigError::MaxBucketLen)));

    let too_big = CompactHashSet::<u32>::with_config(
        CompactConfig::for_set().with_expected_size(usize::MAX),
        RandomState::new(),
    );
    assert!(matches!(too_big, Err(ConfigError::ExpectedSize(_))));
}

// Test: the sparsest load factor accepted.
// Verifies: factors below MIN_LOAD_FACTOR are rejected; at MIN_LOAD_FACTOR
// the map grows in step with its length and honors sizing hints.
#[test]
fn smallest_load_factor() {
    let too_sparse = CompactHashMap::<u32, u32>::with_config(
        CompactConfig::new().with_load_factor(1e-9),
        RandomState::new(),
    );
    assert!(matches!(too_sparse, Err(ConfigError::LoadFactor(_))));

    let mut m = CompactHashMap::<u32, u32>::with_config(
        CompactConfig::new().with_load_factor(MIN_LOAD_FACTOR),
        RandomState::new(),
    )
    .unwrap();
    for k in 0..2000 {
        m.insert(k, k);
        assert!(m.len() <= m.capacity(), "len {} > capacity {}", m.len(), m.capacity());
    }
    assert!(m.capacity() <= 4 * m.len(), "capacity {} overshoots", m.capacity());
    assert!((0..2000).all(|k| m.get(&k) == Some(&k)));

    m.reserve(5000);
    assert!(m.capacity() >= m.len() + 5000);

    let mut hinted = CompactHashMap::<u32, u32>::with_config(
        CompactConfig::new()
            .with_load_factor(MIN_LOAD_FACTOR)
            .with_expected_size(300),
        RandomState::new(),
    )
    .unwrap();
    hinted.insert(1, 1);
    assert!(hinted.capacity() >= 300);
}

// Test: containers move across threads.
#[test]
fn containers_are_send() {
    fn assert_send<T: Send>() {}
    assert_send::<CompactHashMap<String, u32>>();
    assert_send::<CompactHashSet<String>>();
    assert_send::<compact_hashmap::CompactLinkedHashMap<String, u32>>();
}

// Test: set basics over the public API.
#[test]
fn set_basics() {
    let mut s: CompactHashSet<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    assert!(!s.insert("a".to_string()));
    assert!(s.contains("b"));
    assert_eq!(s.get("c").map(String::as_str), Some("c"));
    assert!(s.remove("b"));
    let mut rest: Vec<String> = s.iter().cloned().collect();
    rest.sort();
    assert_eq!(rest, ["a", "c"]);
}
