// Cursor test suite.
//
// A Cursor is a detached traversal position: each step takes the container,
// so other code may touch the container between steps. Invariants exercised:
// - Exhaustion is reported as an error, not a panic.
// - remove() needs a preceding next() and removes exactly that entry.
// - Removing through the cursor never skips or repeats an entry.
// - Any structural change made around the cursor poisons it.
use compact_hashmap::{CompactHashMap, CompactLinkedHashMap, Cursor, CursorTarget, IterError};
use std::collections::HashSet;
use std::hash::{BuildHasher, Hasher};

// Walks the whole container, removing entries whose key satisfies `drop_if`.
// Returns the keys visited.
fn sweep<M>(m: &mut M, mut c: Cursor, drop_if: impl Fn(&u32) -> bool) -> Vec<u32>
where
    M: CursorTarget<Key = u32>,
{
    let mut visited = Vec::new();
    while c.has_next() {
        let k = *c.next_key(&*m).expect("has_next promised an element");
        visited.push(k);
        if drop_if(&k) {
            let (rk, _) = c.remove(m).expect("current element removable");
            assert_eq!(rk, k);
        }
    }
    assert_eq!(c.next(&*m).err(), Some(IterError::Exhausted));
    visited
}

// Test: a single entry, next() called twice.
// Verifies: the second call reports Exhausted.
#[test]
fn next_past_end_is_exhausted() {
    let mut m = CompactHashMap::new();
    m.insert("only", 1);
    let mut c = m.cursor();
    assert_eq!(c.next(&m).unwrap(), (&"only", &1));
    assert!(!c.has_next());
    assert_eq!(c.next(&m), Err(IterError::Exhausted));
}

// Test: remove without a current element.
// Verifies: before next() and after a remove(), NoCurrentElement.
#[test]
fn remove_requires_current_element() {
    let mut m: CompactHashMap<u32, u32> = (0..3).map(|k| (k, k)).collect();
    let mut c = m.cursor();
    assert_eq!(c.remove(&mut m), Err(IterError::NoCurrentElement));
    c.next(&m).unwrap();
    assert!(c.remove(&mut m).is_ok());
    assert_eq!(c.remove(&mut m), Err(IterError::NoCurrentElement));
    assert_eq!(m.len(), 2);
}

// Test: removal during traversal in array order.
// Assumes: removal relocates the last entry into the visited slot.
// Verifies: every entry is visited exactly once and the predicate's
// survivors remain.
#[test]
fn sweep_array_order() {
    let mut m: CompactHashMap<u32, u32> = (0..50).map(|k| (k, k)).collect();
    let c = m.cursor();
    let mut visited = sweep(&mut m, c, |k| k % 4 != 1);
    visited.sort_unstable();
    assert_eq!(visited, (0..50).collect::<Vec<_>>());
    let rest: HashSet<u32> = m.keys().copied().collect();
    assert_eq!(rest, (0..50).filter(|k| k % 4 == 1).collect::<HashSet<u32>>());
}

// Test: removal during traversal in insertion and access order.
// Verifies: visits follow link order exactly and survivors keep it.
#[test]
fn sweep_link_order() {
    let mut ins: CompactLinkedHashMap<u32, u32> = (0..30).rev().map(|k| (k, k)).collect();
    let c = ins.cursor();
    let visited = sweep(&mut ins, c, |k| k % 2 == 0);
    assert_eq!(visited, (0..30).rev().collect::<Vec<_>>());
    assert_eq!(
        ins.keys().copied().collect::<Vec<_>>(),
        (0..30).rev().filter(|k| k % 2 == 1).collect::<Vec<_>>()
    );

    let mut acc = CompactLinkedHashMap::with_access_order();
    for k in 0..10u32 {
        acc.insert(k, k);
    }
    acc.get(&0);
    acc.get(&5);
    let order: Vec<u32> = acc.keys().copied().collect();
    let c = acc.cursor();
    let visited = sweep(&mut acc, c, |k| *k < 5);
    assert_eq!(visited, order);
    assert_eq!(acc.keys().copied().collect::<Vec<_>>(), [6, 7, 8, 9, 5]);
}

// Test: every even-indexed key removed through the cursor.
// Verifies: ten survivors with correct values.
#[test]
fn cursor_removes_every_other_entry() {
    let mut m = CompactLinkedHashMap::new();
    for i in 0..20u32 {
        m.insert(format!("k{i}"), i);
    }
    let mut c = m.cursor();
    let mut index = 0;
    while c.has_next() {
        c.next(&m).unwrap();
        if index % 2 == 0 {
            c.remove(&mut m).unwrap();
        }
        index += 1;
    }
    assert_eq!(m.len(), 10);
    for i in (1..20).step_by(2) {
        assert_eq!(m.peek(&format!("k{i}")), Some(&i));
    }
}

// Test: fail-fast on outside modification.
// Verifies: an insert of a new key between steps poisons the cursor; the
// error repeats on every later call, including remove().
#[test]
fn outside_insert_poisons_cursor() {
    let mut m: CompactHashMap<u32, u32> = (0..4).map(|k| (k, k)).collect();
    let mut c = m.cursor();
    c.next(&m).unwrap();
    m.insert(100, 100);
    let err = c.next(&m).unwrap_err();
    assert!(matches!(err, IterError::ConcurrentModification { .. }));
    assert_eq!(c.next(&m), Err(err));
    assert_eq!(c.remove(&mut m), Err(err));
    assert!(!c.has_next());
}

// Test: which outside operations count as structural.
// Verifies: value updates and reads leave the cursor valid; remove, clear,
// and access-order promotion invalidate it.
#[test]
fn only_structural_changes_poison() {
    let mut m: CompactHashMap<u32, u32> = (0..4).map(|k| (k, k)).collect();
    let mut c = m.cursor();
    c.next(&m).unwrap();
    m.insert(2, 20);
    *m.get_mut(&3).unwrap() = 30;
    let _ = m.get(&1);
    assert!(c.next(&m).is_ok());

    m.remove(&3);
    assert!(c.next(&m).is_err());

    let mut c = m.cursor();
    m.clear();
    assert!(c.next(&m).is_err());

    let mut lru = CompactLinkedHashMap::with_access_order();
    lru.extend([(1u32, 1u32), (2, 2), (3, 3)]);
    let mut c = lru.cursor();
    lru.get(&3);
    assert!(c.next(&lru).is_ok(), "touching the back entry does not reorder");
    lru.get(&1);
    assert!(matches!(
        c.next(&lru),
        Err(IterError::ConcurrentModification { .. })
    ));
}

#[derive(Clone, Default)]
struct ModThree;
struct ModThreeHasher(u64);
impl BuildHasher for ModThree {
    type Hasher = ModThreeHasher;
    fn build_hasher(&self) -> ModThreeHasher {
        ModThreeHasher(0)
    }
}
impl Hasher for ModThreeHasher {
    fn write(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = self.0.wrapping_add(u64::from(*b));
        }
    }
    fn finish(&self) -> u64 {
        self.0 % 3
    }
}

// Test: cursor over a container that has switched to its fallback form.
// Verifies: traversal keeps insertion order and removal works there too.
#[test]
fn cursor_over_fallback() {
    let mut m: CompactLinkedHashMap<u32, u32, ModThree> = CompactLinkedHashMap::with_hasher(ModThree);
    for k in 0..60 {
        m.insert(k, k);
    }
    assert!(m.is_fallback());
    let c = m.cursor();
    let visited = sweep(&mut m, c, |k| k % 5 != 0);
    assert_eq!(visited, (0..60).collect::<Vec<_>>());
    assert_eq!(
        m.keys().copied().collect::<Vec<_>>(),
        (0..60).step_by(5).collect::<Vec<_>>()
    );
}

// Test: the switch to fallback poisons cursors started before it.
#[test]
fn fallback_switch_poisons_cursor() {
    let mut m: CompactHashMap<u32, u32, ModThree> = CompactHashMap::with_hasher(ModThree);
    m.insert(0, 0);
    let mut c = m.cursor();
    for k in 1..60 {
        m.insert(k, k);
    }
    assert!(m.is_fallback());
    assert!(c.next(&m).is_err());
}

// Test: a cursor handed a container it did not come from.
// Verifies: every step on another container, same generation or not, a
// clone or a fallback-form map, reports WrongContainer and touches nothing;
// the cursor still works on its own container afterwards.
#[test]
fn cursor_rejects_other_containers() {
    let mut a: CompactHashMap<u32, u32> = CompactHashMap::new();
    let mut b: CompactHashMap<u32, u32> = CompactHashMap::new();
    for k in 0..5 {
        a.insert(k, k);
        b.insert(k + 100, k + 100);
    }
    let mut c = a.cursor();
    assert_eq!(c.next(&b), Err(IterError::WrongContainer));
    assert_eq!(c.remove(&mut b), Err(IterError::WrongContainer));
    assert_eq!(b.len(), 5);

    let mut twin = a.clone();
    assert_eq!(c.next(&twin), Err(IterError::WrongContainer));
    assert_eq!(c.remove(&mut twin), Err(IterError::WrongContainer));
    assert_eq!(twin.len(), 5);

    let mut flooded: CompactHashMap<u32, u32, ModThree> = CompactHashMap::with_hasher(ModThree);
    for k in 0..60 {
        flooded.insert(k, k);
    }
    assert!(flooded.is_fallback());
    assert_eq!(c.next(&flooded), Err(IterError::WrongContainer));

    // Not poisoned by the rejected steps.
    let visited = sweep(&mut a, c, |k| k % 2 == 0);
    assert_eq!(visited.len(), 5);
    assert_eq!(a.len(), 2);
}
