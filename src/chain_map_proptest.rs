#![cfg(test)]

// Property tests for ChainMap kept inside the crate so they can reach the
// structural invariant checker on the private bucket array.

use crate::chain_map::ChainMap;
use crate::key::Key;
use num_bigint::BigInt;
use proptest::prelude::*;
use std::collections::{HashMap, HashSet};

/// Hashable keys of every supported kind, composites nested up to two deep.
fn arb_key() -> impl Strategy<Value = Key> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Key::Int),
        any::<bool>().prop_map(Key::Bool),
        "[a-z]{0,8}".prop_map(Key::Text),
        any::<i128>().prop_map(|v| Key::Big(BigInt::from(v))),
    ];
    leaf.prop_recursive(2, 12, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Key::Seq),
            proptest::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(Key::Record),
        ]
    })
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Remove(usize),
    Get(usize),
    Has(usize),
    Clear,
    Resize(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Key>, Vec<OpI>)> {
    proptest::collection::vec(arb_key(), 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::Get),
            idx.clone().prop_map(OpI::Has),
            Just(OpI::Clear),
            (1usize..64).prop_map(OpI::Resize),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - set/get/has/remove/length/clear parity with the model after every op.
// - Manual resize never changes the observable entry set.
// - After every op: size counter == reachable nodes, per-bucket key
//   uniqueness, every node in the bucket its key hashes to.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: ChainMap<i32> = ChainMap::new();
        let mut model: HashMap<Key, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Set(i, v) => {
                    sut.set(pool[i].clone(), v).unwrap();
                    model.insert(pool[i].clone(), v);
                }
                OpI::Remove(i) => {
                    sut.remove(&pool[i]).unwrap();
                    model.remove(&pool[i]);
                }
                OpI::Get(i) => {
                    prop_assert_eq!(sut.get(&pool[i]).unwrap(), model.get(&pool[i]));
                }
                OpI::Has(i) => {
                    prop_assert_eq!(sut.has(&pool[i]).unwrap(), model.contains_key(&pool[i]));
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
                OpI::Resize(n) => {
                    sut.resize(n);
                }
            }
            prop_assert_eq!(sut.length(), model.len());
            sut.assert_structural_invariants();
        }

        let got: HashSet<(Key, i32)> = sut
            .entries()
            .into_iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        let want: HashSet<(Key, i32)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, want);
    }
}
