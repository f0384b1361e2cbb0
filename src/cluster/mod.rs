//! Aggregation of pairwise reciprologs into multi-input groups.
//!
//! Two policies:
//! - `Chained`: connected components of the pair graph.
//! - `Strict`: maximal cliques, every member paired with every other member.
//!
//! Each policy has a graph-based and a brute-force implementation behind
//! [`GroupingStrategy`]. The strategy is picked once at startup and handed
//! to the [`Aggregator`]; both produce the same groups.

pub mod brute_force;
#[cfg(feature = "graph")]
pub mod graph;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use clap::ValueEnum;
use tracing::info;

use crate::common::{Member, OrthoGroup, ReciprologPair, SubsetIndex};

pub use brute_force::BruteForceStrategy;
#[cfg(feature = "graph")]
pub use graph::GraphStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Policy {
    /// Transitive closure; connectivity suffices.
    Chained,
    /// Maximal mutual cliques.
    Strict,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Chained => f.write_str("chained"),
            Policy::Strict => f.write_str("strict"),
        }
    }
}

/// Undirected reciprolog graph as sorted adjacency sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Adjacency {
    neighbors: BTreeMap<Member, BTreeSet<Member>>,
}

impl Adjacency {
    pub fn from_pairs(pairs: &[ReciprologPair]) -> Self {
        let mut neighbors: BTreeMap<Member, BTreeSet<Member>> = BTreeMap::new();
        for pair in pairs {
            let (a, b) = &pair.members;
            if a == b {
                continue;
            }
            neighbors.entry(a.clone()).or_default().insert(b.clone());
            neighbors.entry(b.clone()).or_default().insert(a.clone());
        }
        Self { neighbors }
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Member, &BTreeSet<Member>)> {
        self.neighbors.iter()
    }

    pub fn connected(&self, a: &Member, b: &Member) -> bool {
        self.neighbors.get(a).is_some_and(|n| n.contains(b))
    }

    /// True when every two members are reciprologs of each other.
    pub fn every_member_match(&self, members: &[&Member]) -> bool {
        members.iter().enumerate().all(|(i, a)| {
            members[i + 1..].iter().all(|b| self.connected(a, b))
        })
    }
}

pub trait GroupingStrategy {
    fn name(&self) -> &'static str;

    fn chained_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup>;

    fn strict_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Graph,
    BruteForce,
}

impl StrategyKind {
    /// Graph-based when compiled in and not explicitly disabled.
    pub fn detect(force_brute_force: bool) -> Self {
        if !force_brute_force && cfg!(feature = "graph") {
            StrategyKind::Graph
        } else {
            StrategyKind::BruteForce
        }
    }

    pub fn build(self) -> Box<dyn GroupingStrategy + Send + Sync> {
        match self {
            #[cfg(feature = "graph")]
            StrategyKind::Graph => Box::new(GraphStrategy),
            #[cfg(not(feature = "graph"))]
            StrategyKind::Graph => {
                tracing::warn!("graph support not compiled in; using brute-force grouping");
                Box::new(BruteForceStrategy::default())
            }
            StrategyKind::BruteForce => Box::new(BruteForceStrategy::default()),
        }
    }
}

/// Keep a group when at least one member satisfies its input's subset.
/// Members of unrestricted inputs always do.
pub fn touches_subset(group: &OrthoGroup, subsets: &SubsetIndex) -> bool {
    group
        .members()
        .iter()
        .any(|m| subsets.allows(&m.tag, &m.id))
}

pub struct Aggregator {
    policy: Policy,
    strategy: Box<dyn GroupingStrategy + Send + Sync>,
}

impl Aggregator {
    pub fn new(policy: Policy, strategy: Box<dyn GroupingStrategy + Send + Sync>) -> Self {
        Self { policy, strategy }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Group all pairs and drop groups outside the subsets. Sorted output.
    pub fn aggregate(&self, pairs: &[ReciprologPair], subsets: &SubsetIndex) -> Vec<OrthoGroup> {
        let adjacency = Adjacency::from_pairs(pairs);
        info!(
            "Grouping {} members / {} pairs ({} policy, {} strategy)",
            adjacency.vertex_count(),
            adjacency.edge_count(),
            self.policy,
            self.strategy.name()
        );

        let groups = match self.policy {
            Policy::Chained => self.strategy.chained_groups(&adjacency),
            Policy::Strict => self.strategy.strict_groups(&adjacency),
        };

        let mut groups = groups;
        if !subsets.is_empty() {
            let before = groups.len();
            groups.retain(|g| touches_subset(g, subsets));
            if groups.len() < before {
                info!("Removed {} groups outside the query subsets", before - groups.len());
            }
        }
        groups.sort();
        groups
    }
}
