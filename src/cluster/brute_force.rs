//! Dictionary-based grouping, used when graph support is unavailable.
//!
//! Strict grouping enumerates every subset of each vertex's neighbor set and
//! is exponential in the neighbor count. It is meant for small neighborhoods;
//! larger ones log a warning.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::common::{Member, OrthoGroup};

use super::{Adjacency, GroupingStrategy};

const DEFAULT_WARN_NEIGHBORS: usize = 20;

#[derive(Debug, Clone)]
pub struct BruteForceStrategy {
    /// Neighbor-set size above which strict grouping warns about run time.
    pub warn_neighbors: usize,
}

impl Default for BruteForceStrategy {
    fn default() -> Self {
        Self {
            warn_neighbors: DEFAULT_WARN_NEIGHBORS,
        }
    }
}

/// Call `f` with every k-combination of `0..n`, in lexicographic order.
fn for_each_combination(n: usize, k: usize, mut f: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        f(&idx);
        // Rightmost position that can still move.
        let Some(i) = (0..k).rev().find(|&i| idx[i] != i + n - k) else {
            return;
        };
        idx[i] += 1;
        for j in i + 1..k {
            idx[j] = idx[j - 1] + 1;
        }
    }
}

impl GroupingStrategy for BruteForceStrategy {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    /// Merge entries whose neighbor sets name another top-level key until no
    /// set does; what remains under each key is one component.
    fn chained_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup> {
        let mut merged: BTreeMap<Member, BTreeSet<Member>> = adjacency
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        loop {
            let mut changed = false;
            let keys: Vec<Member> = merged.keys().cloned().collect();
            for key in keys {
                // Already absorbed into an earlier key.
                let Some(mut group) = merged.remove(&key) else {
                    continue;
                };
                loop {
                    let absorbed: Vec<Member> = group
                        .iter()
                        .filter(|m| merged.contains_key(*m))
                        .cloned()
                        .collect();
                    if absorbed.is_empty() {
                        break;
                    }
                    for other in absorbed {
                        if let Some(set) = merged.remove(&other) {
                            group.extend(set);
                            changed = true;
                        }
                    }
                }
                merged.insert(key, group);
            }
            if !changed {
                break;
            }
        }

        merged
            .into_iter()
            .map(|(key, mut rest)| {
                rest.insert(key);
                OrthoGroup::new(rest.into_iter().collect())
            })
            .collect()
    }

    fn strict_groups(&self, adjacency: &Adjacency) -> Vec<OrthoGroup> {
        let mut retained: Vec<BTreeSet<Member>> = Vec::new();

        for (vertex, neighbors) in adjacency.iter() {
            let neighbors: Vec<&Member> = neighbors.iter().collect();
            if neighbors.len() > self.warn_neighbors {
                warn!(
                    "{} has {} reciprologs; exhaustive clique search may be slow",
                    vertex,
                    neighbors.len()
                );
            }

            for size in (1..=neighbors.len()).rev() {
                for_each_combination(neighbors.len(), size, |combo| {
                    let mut candidate: Vec<&Member> = Vec::with_capacity(size + 1);
                    candidate.push(vertex);
                    candidate.extend(combo.iter().map(|&i| neighbors[i]));
                    if !adjacency.every_member_match(&candidate) {
                        return;
                    }
                    let candidate: BTreeSet<Member> = candidate.into_iter().cloned().collect();
                    if retained.iter().any(|g| candidate.is_subset(g)) {
                        return;
                    }
                    retained.push(candidate);
                });
            }
        }

        retained
            .into_iter()
            .map(|g| OrthoGroup::new(g.into_iter().collect()))
            .collect()
    }
}
