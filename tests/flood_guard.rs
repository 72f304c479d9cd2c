// Flood guard test suite.
//
// Keys that all hash alike build one long bucket chain. Once a chain grows
// past the configured limit the container switches, once and for good, to
// its fallback representation. Invariants exercised:
// - The switch is invisible to callers apart from is_fallback().
// - Every entry, its value and the iteration order survive the switch.
// - The switch triggers on insert, on bulk load, and never for well-spread
//   keys.
use compact_hashmap::{
    CompactConfig, CompactHashMap, CompactHashSet, CompactLinkedHashMap, DEFAULT_MAX_BUCKET_LEN,
};
use std::hash::{BuildHasher, Hasher};

// Every key hashes to zero.
#[derive(Clone, Default)]
struct Flood;
struct FloodHasher;
impl BuildHasher for Flood {
    type Hasher = FloodHasher;
    fn build_hasher(&self) -> FloodHasher {
        FloodHasher
    }
}
impl Hasher for FloodHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Test: the chain limit.
// Verifies: DEFAULT_MAX_BUCKET_LEN colliding keys are tolerated; one more
// trips the guard.
#[test]
fn trips_just_past_limit() {
    let mut m: CompactHashMap<u32, u32, Flood> = CompactHashMap::with_hasher(Flood);
    for k in 0..DEFAULT_MAX_BUCKET_LEN as u32 {
        m.insert(k, k);
    }
    assert!(!m.is_fallback());
    m.insert(1000, 1000);
    assert!(m.is_fallback());
    assert_eq!(m.len(), DEFAULT_MAX_BUCKET_LEN + 1);
}

// Test: behavior after the switch.
// Verifies: full map semantics across thousands of colliding keys, with
// insertion order kept.
#[test]
fn fallback_is_a_full_map() {
    let mut m: CompactHashMap<String, usize, Flood> = CompactHashMap::with_hasher(Flood);
    for i in 0..2000 {
        assert_eq!(m.insert(format!("key{i}"), i), None);
    }
    assert!(m.is_fallback());
    assert_eq!(m.insert("key7".to_string(), 70), Some(7));
    for i in (0..2000).step_by(3) {
        assert!(m.remove(&format!("key{i}")).is_some());
    }
    for i in 0..2000 {
        let want = if i % 3 == 0 {
            None
        } else if i == 7 {
            Some(70)
        } else {
            Some(i)
        };
        assert_eq!(m.get(&format!("key{i}")).copied(), want);
    }
    let order: Vec<usize> = m.values().copied().take(4).collect();
    assert_eq!(order, [1, 2, 4, 5]);
    m.clear();
    assert!(m.is_empty());
    assert!(m.is_fallback(), "the switch is permanent");
}

// Test: order survives the switch in a linked map.
// Verifies: access order established before the switch is kept and
// promotion keeps working afterwards.
#[test]
fn linked_order_survives_switch() {
    let mut m: CompactLinkedHashMap<u32, u32, Flood> = CompactLinkedHashMap::access_order(
        CompactConfig::new().with_max_bucket_len(4),
        Flood,
    )
    .unwrap();
    for k in 0..4 {
        m.insert(k, k);
    }
    m.get(&1);
    assert!(!m.is_fallback());
    m.insert(4, 4);
    assert!(m.is_fallback());
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), [0, 2, 3, 1, 4]);
    m.get(&0);
    assert_eq!(m.keys().copied().collect::<Vec<_>>(), [2, 3, 1, 4, 0]);
    assert_eq!(m.pop_front(), Some((2, 2)));
    assert_eq!(m.iter().rev().map(|(k, _)| *k).collect::<Vec<_>>(), [0, 4, 1, 3]);
}

// Test: bulk construction.
// Verifies: a colliding bulk load ends up in the fallback form with
// every element.
#[test]
fn bulk_load_switches() {
    let s: CompactHashSet<u64, Flood> = (0..100).collect();
    assert!(s.is_fallback());
    assert_eq!(s.len(), 100);
    assert!((0..100).all(|v| s.contains(&v)));
}

// Test: well-spread keys never trip the guard.
#[test]
fn random_keys_stay_compact() {
    let mut m = CompactHashMap::new();
    for i in 0..20_000u64 {
        m.insert(i.wrapping_mul(0x9e37_79b9_7f4a_7c15), i);
    }
    assert!(!m.is_fallback());
    assert_eq!(m.len(), 20_000);
}

// Test: iter_mut, drain and clone on the fallback form.
#[test]
fn views_work_after_switch() {
    let mut m: CompactHashMap<u32, u32, Flood> = (0..20).map(|k| (k, k)).collect();
    assert!(m.is_fallback());
    for (_, v) in m.iter_mut() {
        *v += 1;
    }
    let copy = m.clone();
    assert_eq!(copy, m);
    let drained: Vec<(u32, u32)> = m.drain().collect();
    assert_eq!(drained, (0..20).map(|k| (k, k + 1)).collect::<Vec<_>>());
    assert!(m.is_empty());
    assert_eq!(copy.len(), 20);
}

// Test: mutable iteration on both representations.
// Verifies: iter_mut, values_mut and `for (k, v) in &mut map` reach every
// value while compact and after the switch, for both map kinds.
#[test]
fn mutable_iteration_on_both_representations() {
    for colliding in [4u32, 40] {
        let mut m: CompactHashMap<u32, u32, Flood> = CompactHashMap::with_hasher(Flood);
        let mut l: CompactLinkedHashMap<u32, u32, Flood> = CompactLinkedHashMap::with_hasher(Flood);
        for k in 0..colliding {
            m.insert(k, k);
            l.insert(k, k);
        }
        assert_eq!(m.is_fallback(), colliding > DEFAULT_MAX_BUCKET_LEN as u32);
        assert_eq!(l.is_fallback(), m.is_fallback());

        for (k, v) in m.iter_mut() {
            *v += *k;
        }
        for v in m.values_mut() {
            *v += 1;
        }
        for (_, v) in &mut m {
            *v *= 10;
        }
        for k in 0..colliding {
            assert_eq!(m.get(&k), Some(&((2 * k + 1) * 10)));
        }

        let seen: Vec<u32> = l
            .iter_mut()
            .map(|(k, v)| {
                *v = k + 100;
                *k
            })
            .collect();
        assert_eq!(seen, (0..colliding).collect::<Vec<_>>());
        for v in l.values_mut() {
            *v += 1;
        }
        assert_eq!(
            l.values().copied().collect::<Vec<_>>(),
            (101..101 + colliding).collect::<Vec<_>>()
        );
    }
}
