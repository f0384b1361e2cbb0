//! Graph and brute-force strategies must agree on every input.

use proptest::prelude::*;

use reciprologs::cluster::{Adjacency, BruteForceStrategy, GroupingStrategy};
use reciprologs::common::{Member, OrthoGroup, ReciprologPair};

fn arb_pairs() -> impl Strategy<Value = Vec<ReciprologPair>> {
    // Up to 4 inputs with 3 sequences each.
    let member = (0..4u8, 0..3u8).prop_map(|(t, i)| {
        let tag = ((b'A' + t) as char).to_string();
        Member::new(tag.clone(), format!("{}{}", tag, i))
    });
    prop::collection::vec((member.clone(), member), 0..30).prop_map(|v| {
        v.into_iter()
            .filter(|(a, b)| a.tag != b.tag)
            .map(|(a, b)| ReciprologPair::new(a, b, 1.0, 1.0))
            .collect()
    })
}

/// Every strict group must be a clique no vertex can extend.
fn assert_maximal_cliques(adjacency: &Adjacency, groups: &[OrthoGroup]) {
    for group in groups {
        let members: Vec<&Member> = group.members().iter().collect();
        assert!(members.len() >= 2);
        assert!(adjacency.every_member_match(&members));
        for (candidate, _) in adjacency.iter() {
            if group.members().contains(candidate) {
                continue;
            }
            let mut extended = members.clone();
            extended.push(candidate);
            assert!(!adjacency.every_member_match(&extended));
        }
    }
}

#[test]
fn test_brute_force_strict_cliques_are_maximal() {
    let pairs: Vec<ReciprologPair> = [("A1", "B1"), ("A1", "C1"), ("B1", "C1"), ("B1", "D1"), ("C1", "D1")]
        .iter()
        .map(|(a, b)| crate::helpers::edge(a, b))
        .collect();
    let adjacency = Adjacency::from_pairs(&pairs);
    let groups = BruteForceStrategy::default().strict_groups(&adjacency);
    assert_eq!(groups.len(), 2);
    assert_maximal_cliques(&adjacency, &groups);
}

#[cfg(feature = "graph")]
mod graph_equivalence {
    use super::*;
    use reciprologs::cluster::GraphStrategy;

    fn sorted(mut groups: Vec<OrthoGroup>) -> Vec<OrthoGroup> {
        groups.sort();
        groups
    }

    proptest! {
        #[test]
        fn prop_chained_groups_agree(pairs in arb_pairs()) {
            let adjacency = Adjacency::from_pairs(&pairs);
            let graph = sorted(GraphStrategy.chained_groups(&adjacency));
            let brute = sorted(BruteForceStrategy::default().chained_groups(&adjacency));
            prop_assert_eq!(graph, brute);
        }

        #[test]
        fn prop_strict_groups_agree(pairs in arb_pairs()) {
            let adjacency = Adjacency::from_pairs(&pairs);
            let graph = sorted(GraphStrategy.strict_groups(&adjacency));
            let brute = sorted(BruteForceStrategy::default().strict_groups(&adjacency));
            assert_maximal_cliques(&adjacency, &graph);
            prop_assert_eq!(graph, brute);
        }
    }
}

proptest! {
    #[test]
    fn prop_chained_groups_partition_members(pairs in arb_pairs()) {
        let adjacency = Adjacency::from_pairs(&pairs);
        let groups = BruteForceStrategy::default().chained_groups(&adjacency);
        let total: usize = groups.iter().map(OrthoGroup::len).sum();
        prop_assert_eq!(total, adjacency.vertex_count());
    }
}
