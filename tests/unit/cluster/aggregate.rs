//! Unit tests for cluster/mod.rs (Aggregator)

use reciprologs::cluster::{Aggregator, BruteForceStrategy, Policy, StrategyKind};
use reciprologs::common::SubsetIndex;

use crate::helpers::{edge, group_ids};

fn aggregator(policy: Policy) -> Aggregator {
    Aggregator::new(policy, StrategyKind::detect(false).build())
}

fn star() -> Vec<reciprologs::common::ReciprologPair> {
    vec![edge("A1", "B1"), edge("A1", "C1"), edge("A1", "D1")]
}

#[test]
fn test_star_chained_is_one_group() {
    let groups = aggregator(Policy::Chained).aggregate(&star(), &SubsetIndex::new());
    assert_eq!(group_ids(&groups), vec![vec!["A1", "B1", "C1", "D1"]]);
}

#[test]
fn test_star_strict_splits_into_pairs() {
    let groups = aggregator(Policy::Strict).aggregate(&star(), &SubsetIndex::new());
    assert_eq!(
        group_ids(&groups),
        vec![vec!["A1", "B1"], vec!["A1", "C1"], vec!["A1", "D1"]]
    );
}

#[test]
fn test_triangle_with_tail() {
    let pairs = vec![
        edge("A1", "B1"),
        edge("B1", "C1"),
        edge("A1", "C1"),
        edge("C1", "D1"),
        edge("E1", "F1"),
    ];
    let strict = aggregator(Policy::Strict).aggregate(&pairs, &SubsetIndex::new());
    assert_eq!(
        group_ids(&strict),
        vec![vec!["A1", "B1", "C1"], vec!["C1", "D1"], vec!["E1", "F1"]]
    );
    let chained = aggregator(Policy::Chained).aggregate(&pairs, &SubsetIndex::new());
    assert_eq!(
        group_ids(&chained),
        vec![vec!["A1", "B1", "C1", "D1"], vec!["E1", "F1"]]
    );
}

#[test]
fn test_groups_outside_subsets_removed() {
    let pairs = vec![edge("A1", "B1"), edge("A2", "B2")];
    let mut subsets = SubsetIndex::new();
    subsets.insert("A", ["A1".to_string()].into_iter().collect());
    subsets.insert("B", ["B1".to_string()].into_iter().collect());
    let groups = aggregator(Policy::Strict).aggregate(&pairs, &subsets);
    assert_eq!(group_ids(&groups), vec![vec!["A1", "B1"]]);
}

#[test]
fn test_empty_input() {
    let agg = Aggregator::new(Policy::Strict, Box::new(BruteForceStrategy::default()));
    assert!(agg.aggregate(&[], &SubsetIndex::new()).is_empty());
    assert_eq!(agg.strategy_name(), "brute-force");
    assert_eq!(agg.policy(), Policy::Strict);
}
