//! Unit tests for pairing/one_to_one.rs

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use reciprologs::common::ReciprologPair;
use reciprologs::pairing::filter_one_to_one;

use crate::helpers::pair;

#[test]
fn test_duplicate_sequence_resolved_to_best_pair() {
    // b1 and b2 are identical copies; both are reciprologs of a1.
    let pairs = vec![pair("a1", "b1", 300.0, 300.0), pair("a1", "b2", 300.0, 310.0)];
    let out = filter_one_to_one(&pairs);
    assert_eq!(out.kept, vec![pairs[1].clone()]);
    assert_eq!(out.dropped, vec![pairs[0].clone()]);
}

#[test]
fn test_chain_of_claims() {
    let pairs = vec![
        pair("a1", "b1", 100.0, 100.0),
        pair("a1", "b2", 200.0, 200.0),
        pair("a2", "b2", 150.0, 150.0),
        pair("a3", "b1", 50.0, 50.0),
    ];
    let out = filter_one_to_one(&pairs);
    // a1-b2 takes over from a1-b1, beats a2-b2; b1 is free again for a3.
    assert_eq!(out.kept, vec![pairs[1].clone(), pairs[3].clone()]);
    assert_eq!(out.dropped.len(), 2);
}

fn arb_pairs() -> impl Strategy<Value = Vec<ReciprologPair>> {
    prop::collection::vec((0..5usize, 0..5usize, 1..50u32, 1..50u32), 0..25).prop_map(|v| {
        v.into_iter()
            .map(|(a, b, s1, s2)| pair(&format!("a{}", a), &format!("b{}", b), s1 as f64, s2 as f64))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_kept_pairs_are_disjoint(pairs in arb_pairs()) {
        let out = filter_one_to_one(&pairs);
        prop_assert_eq!(out.kept.len() + out.dropped.len(), pairs.len());
        let mut seen = FxHashSet::default();
        for p in &out.kept {
            prop_assert!(seen.insert(p.members.0.clone()));
            prop_assert!(seen.insert(p.members.1.clone()));
        }
    }

    #[test]
    fn prop_filter_is_idempotent(pairs in arb_pairs()) {
        let once = filter_one_to_one(&pairs);
        let twice = filter_one_to_one(&once.kept);
        prop_assert_eq!(&twice.kept, &once.kept);
        prop_assert!(twice.dropped.is_empty());
    }
}
