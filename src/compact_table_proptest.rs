#![cfg(test)]

// Property tests for CompactTable kept inside the crate so they can reach the
// raw table and its invariant checker.

use crate::compact_table::{CompactTable, Inserted};
use crate::hashing::smear;
use crate::links::Links;
use proptest::prelude::*;
use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Array,
    Insertion,
    Access,
}

impl Mode {
    fn links(self) -> Links {
        match self {
            Mode::Array => Links::Array,
            Mode::Insertion => Links::ordered(false),
            Mode::Access => Links::ordered(true),
        }
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, i32),
    Remove(u32),
    Find(u32),
    Touch(u32),
    // Walk in traversal order removing every entry whose value is odd.
    RetainEven,
    Reserve(usize),
    Shrink,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Mode, Vec<Op>)> {
    let mode = prop_oneof![Just(Mode::Array), Just(Mode::Insertion), Just(Mode::Access)];
    let key = 0u32..24;
    let op = prop_oneof![
        6 => (key.clone(), any::<i32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.clone().prop_map(Op::Find),
        2 => key.prop_map(Op::Touch),
        1 => Just(Op::RetainEven),
        1 => (0usize..40).prop_map(Op::Reserve),
        1 => Just(Op::Shrink),
        1 => Just(Op::Clear),
    ];
    (mode, proptest::collection::vec(op, 1..120))
}

fn traversal(t: &CompactTable<u32, i32>) -> Vec<(u32, i32)> {
    std::iter::successors(t.first(), |&i| t.next_of(i))
        .map(|i| (*t.key_at(i), *t.value_at(i)))
        .collect()
}

fn reverse_traversal(t: &CompactTable<u32, i32>) -> Vec<(u32, i32)> {
    std::iter::successors(t.last(), |&i| t.prev_of(i))
        .map(|i| (*t.key_at(i), *t.value_at(i)))
        .collect()
}

// The model is the expected traversal order. Array order mirrors the
// table's swap-with-last removal; link orders keep relative order.
fn model_remove(model: &mut Vec<(u32, i32)>, mode: Mode, pos: usize) -> (u32, i32) {
    match mode {
        Mode::Array => model.swap_remove(pos),
        Mode::Insertion | Mode::Access => model.remove(pos),
    }
}

fn model_touch(model: &mut Vec<(u32, i32)>, mode: Mode, pos: usize) -> bool {
    if mode != Mode::Access || pos + 1 == model.len() {
        return false;
    }
    let e = model.remove(pos);
    model.push(e);
    true
}

fn run(mode: Mode, ops: Vec<Op>, hash: impl Fn(u32) -> u32) -> Result<(), TestCaseError> {
    let mut sut: CompactTable<u32, i32> = CompactTable::new(mode.links(), 0.75, 0);
    let mut model: Vec<(u32, i32)> = Vec::new();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let pos = model.iter().position(|e| e.0 == k);
                match sut.insert(hash(k), k, v, |a, b| a == b) {
                    Inserted::Updated { old, reordered } => {
                        let pos = pos.expect("update only for present keys");
                        prop_assert_eq!(old, model[pos].1);
                        model[pos].1 = v;
                        prop_assert_eq!(reordered, model_touch(&mut model, mode, pos));
                    }
                    Inserted::New { chain_len, .. } => {
                        prop_assert!(pos.is_none(), "new entry for a present key");
                        prop_assert!(chain_len >= 1);
                        model.push((k, v));
                    }
                }
            }
            Op::Remove(k) => {
                let got = sut.remove(hash(k), |x| *x == k);
                match model.iter().position(|e| e.0 == k) {
                    Some(pos) => {
                        let want = model_remove(&mut model, mode, pos);
                        prop_assert_eq!(got, Some(want));
                    }
                    None => prop_assert!(got.is_none()),
                }
            }
            Op::Find(k) => {
                let got = sut.find(hash(k), |x| *x == k).map(|i| *sut.value_at(i));
                let want = model.iter().find(|e| e.0 == k).map(|e| e.1);
                prop_assert_eq!(got, want);
            }
            Op::Touch(k) => {
                if let Some(i) = sut.find(hash(k), |x| *x == k) {
                    let pos = model.iter().position(|e| e.0 == k).expect("model has key");
                    let moved = sut.touch(i);
                    prop_assert_eq!(moved, model_touch(&mut model, mode, pos));
                }
            }
            Op::RetainEven => {
                let mut visited = Vec::new();
                let mut cur = sut.first();
                while let Some(i) = cur {
                    let upcoming = sut.next_of(i);
                    let (k, v) = (*sut.key_at(i), *sut.value_at(i));
                    visited.push(k);
                    cur = if v % 2 == 0 {
                        upcoming
                    } else {
                        let last = sut.len() - 1;
                        let resume = sut.links().adjust_after_remove(upcoming, i, last);
                        sut.remove_at(i);
                        resume
                    };
                }
                let mut expected_visits: Vec<u32> = model.iter().map(|e| e.0).collect();
                expected_visits.sort_unstable();
                visited.sort_unstable();
                prop_assert_eq!(visited, expected_visits, "every entry visited once");

                let mut pos = 0;
                while pos < model.len() {
                    if model[pos].1 % 2 == 0 {
                        pos += 1;
                    } else {
                        model_remove(&mut model, mode, pos);
                    }
                }
            }
            Op::Reserve(n) => {
                sut.reserve(n);
                if sut.bucket_count() != 0 {
                    prop_assert!(sut.capacity() >= sut.len() + n);
                }
            }
            Op::Shrink => sut.shrink_to_fit(),
            Op::Clear => {
                sut.clear();
                model.clear();
            }
        }

        // Post-conditions after each op
        sut.assert_invariants();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(traversal(&sut), model.clone());
        let mut rev = reverse_traversal(&sut);
        rev.reverse();
        prop_assert_eq!(rev, model.clone());
    }
    Ok(())
}

// Property: state-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - Dense storage: every index in [0, len) is reachable from exactly one bucket.
// - Lookup, update and removal parity with the model.
// - Traversal order (forward and reverse) matches the model in all three modes.
// - Removal during a walk visits every entry exactly once.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((mode, ops) in arb_scenario()) {
        let s = RandomState::new();
        run(mode, ops, |k| smear(s.hash_one(k)))?;
    }
}

// Property: same state machine with every key in one bucket chain. The table
// itself never degrades, so this stresses chain unlinking and relinking
// during swap-with-last removal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_single_chain((mode, ops) in arb_scenario()) {
        run(mode, ops, |_| 0)?;
    }
}
