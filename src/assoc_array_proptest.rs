#![cfg(test)]

// Property tests for AssocArray kept inside the crate so they can reach
// the bucket chains through collision_stats without extra surface.

use crate::assoc_array::{AssocArray, Status};
use crate::entry::Entry;
use crate::hash::OneAtATime;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::hash::{BuildHasher, Hasher};
use std::rc::Rc;

// Pool-indexed operations so that shrinking moves towards earlier keys.
#[derive(Clone, Debug)]
enum OpI {
    Add(usize, i32),
    AddReplace(usize, i32),
    Del(usize),
    DelFirst,
    DelLast,
    Get(usize),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    // Equal-length keys: a probe matches any stored key it prefixes, so
    // uniform lengths keep lookups resolving to exactly one key.
    proptest::collection::vec("[a-c]{3}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Add(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::AddReplace(i, v)),
            idx.clone().prop_map(OpI::Del),
            Just(OpI::DelFirst),
            Just(OpI::DelLast),
            idx.clone().prop_map(OpI::Get),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Model: the ordered list as a Vec of (key, value), oldest first, plus a
// per-key count of live entries. Lookup by key resolves to the newest
// live entry with that key, which is its last occurrence in the Vec.
#[derive(Default)]
struct Model {
    order: Vec<(String, i32)>,
    counts: hashbrown::HashMap<String, usize>,
}

impl Model {
    fn newest(&self, k: &str) -> Option<usize> {
        self.order.iter().rposition(|(kk, _)| kk == k)
    }

    fn push(&mut self, k: &str, v: i32) {
        self.order.push((k.to_string(), v));
        *self.counts.entry(k.to_string()).or_insert(0) += 1;
    }

    fn remove_at(&mut self, i: usize) -> (String, i32) {
        let (k, v) = self.order.remove(i);
        if let Some(c) = self.counts.get_mut(&k) {
            *c -= 1;
            if *c == 0 {
                self.counts.remove(&k);
            }
        }
        (k, v)
    }
}

fn run_ops<S: BuildHasher>(
    mut sut: AssocArray<i32, S>,
    released: Rc<Cell<usize>>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model = Model::default();
    let mut removed = 0usize;

    for op in ops {
        match op {
            OpI::Add(i, v) => {
                let k = &pool[i];
                prop_assert!(sut.add(v, k.as_bytes()).is_ok());
                model.push(k, v);
            }
            OpI::AddReplace(i, v) => {
                let k = &pool[i];
                if let Some(at) = model.newest(k) {
                    model.remove_at(at);
                    removed += 1;
                }
                let id = sut.add_replace(v, k.as_bytes()).map_err(|r| {
                    TestCaseError::fail(format!("add_replace failed: {}", r.error))
                })?;
                model.push(k, v);
                prop_assert_eq!(sut.last_id(), Some(id), "replaced entry lands at the tail");
            }
            OpI::Del(i) => {
                let k = &pool[i];
                let expect = match model.newest(k) {
                    Some(at) => {
                        model.remove_at(at);
                        removed += 1;
                        Status::Removed
                    }
                    None => Status::NotFound,
                };
                prop_assert_eq!(sut.del(k.as_bytes()), expect);
            }
            OpI::DelFirst => {
                let expect = if model.order.is_empty() {
                    Status::NotFound
                } else {
                    model.remove_at(0);
                    removed += 1;
                    Status::Removed
                };
                prop_assert_eq!(sut.del_first(), expect);
            }
            OpI::DelLast => {
                let expect = if model.order.is_empty() {
                    Status::NotFound
                } else {
                    model.remove_at(model.order.len() - 1);
                    removed += 1;
                    Status::Removed
                };
                prop_assert_eq!(sut.del_last(), expect);
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let got = sut.get_by_key(k.as_bytes()).map(|e| *e.data());
                let want = model.newest(k).map(|at| model.order[at].1);
                prop_assert_eq!(got, want);
                prop_assert_eq!(sut.contains_key(k.as_bytes()), model.counts.contains_key(k));
            }
            OpI::Iterate => {
                let fwd: Vec<(Vec<u8>, i32)> = sut
                    .iter()
                    .map(|e: &Entry<i32>| (e.key().to_vec(), *e.data()))
                    .collect();
                let want: Vec<(Vec<u8>, i32)> = model
                    .order
                    .iter()
                    .map(|(k, v)| (k.as_bytes().to_vec(), *v))
                    .collect();
                prop_assert_eq!(&fwd, &want);
                let back: Vec<i32> = sut.iter().rev().map(|e| *e.data()).collect();
                let want_back: Vec<i32> = model.order.iter().rev().map(|(_, v)| *v).collect();
                prop_assert_eq!(back, want_back);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.len(), model.order.len());
        prop_assert_eq!(sut.is_empty(), model.order.is_empty());
        prop_assert_eq!(released.get(), removed, "release runs once per removal");
        prop_assert_eq!(
            sut.get_first().map(|e| *e.data()),
            model.order.first().map(|(_, v)| *v)
        );
        prop_assert_eq!(
            sut.get_last().map(|e| *e.data()),
            model.order.last().map(|(_, v)| *v)
        );
        let stats = sut.collision_stats();
        prop_assert_eq!(stats.entries, model.order.len());
        prop_assert!(sut.collision_percent() < 100);
    }

    let live = sut.len();
    drop(sut);
    prop_assert_eq!(released.get(), removed + live, "drop releases the rest");
    Ok(())
}

fn counting(released: &Rc<Cell<usize>>) -> impl FnMut(Entry<i32>) + 'static {
    let r = released.clone();
    move |_e| r.set(r.get() + 1)
}

// Every key hashes to zero: all entries share bucket 0 and lookups depend
// entirely on key comparison along the chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: state-machine equivalence against an ordered Vec model.
// Invariants exercised across random operation sequences:
// - Lookup returns the newest live entry for a key; duplicates from `add` stay.
// - `add_replace` removes one older entry for the key and appends at the tail.
// - `del_first`/`del_last` remove the list ends and report NotFound when empty.
// - Forward and reverse iteration match insertion order.
// - The release strategy runs exactly once per removed entry, and on drop.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario(), bits in 0u32..6) {
        let released = Rc::new(Cell::new(0));
        let sut = AssocArray::builder(bits)
            .release(counting(&released))
            .build()
            .expect("create");
        run_ops(sut, released, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_one_at_a_time((pool, ops) in arb_scenario()) {
        let released = Rc::new(Cell::new(0));
        let sut = AssocArray::builder(3)
            .release(counting(&released))
            .hasher(OneAtATime)
            .build()
            .expect("create");
        run_ops(sut, released, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_single_chain((pool, ops) in arb_scenario(), bits in 0u32..4) {
        let released = Rc::new(Cell::new(0));
        let sut = AssocArray::builder(bits)
            .release(counting(&released))
            .hasher(ConstBuildHasher)
            .build()
            .expect("create");
        run_ops(sut, released, &pool, ops)?;
    }
}
