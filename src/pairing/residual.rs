//! Residual resolution for subset-restricted searches.
//!
//! When input S only contributes a subset of its sequences as queries, a
//! forward top hit landing on an S sequence outside that subset has no reverse
//! hit to agree with. Those subjects are collected here per input so a second
//! search can be run with exactly them as queries.

use std::collections::BTreeSet;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::common::TopHitMap;

/// Forward top-hit subjects that never acted as queries in the reverse search.
pub fn residual_subjects(forward: &TopHitMap, reverse_queries: &FxHashSet<String>) -> BTreeSet<String> {
    forward
        .values()
        .map(|top| &top.subject)
        .filter(|subject| !reverse_queries.contains(*subject))
        .cloned()
        .collect()
}

/// Input tag -> subject IDs needing a second directional pass.
#[derive(Debug, Clone, Default)]
pub struct ResidualIndex {
    residuals: FxHashMap<String, BTreeSet<String>>,
}

impl ResidualIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate residuals for `subject_tag`. Empty sets are not stored.
    pub fn record(&mut self, subject_tag: &str, ids: BTreeSet<String>) {
        if ids.is_empty() {
            return;
        }
        self.residuals
            .entry(subject_tag.to_string())
            .or_default()
            .extend(ids);
    }

    pub fn get(&self, tag: &str) -> Option<&BTreeSet<String>> {
        self.residuals.get(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.residuals.is_empty()
    }

    /// Total residual IDs across inputs.
    pub fn total(&self) -> usize {
        self.residuals.values().map(BTreeSet::len).sum()
    }

    /// Tags with residuals, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.residuals.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

/// Fill query keys missing from `base` with entries from a residual round.
///
/// Existing entries are never replaced. Returns the number of keys added.
pub fn merge_top_hits(base: &mut TopHitMap, residual_round: TopHitMap) -> usize {
    let mut added = 0;
    for (query, top) in residual_round {
        if let std::collections::hash_map::Entry::Vacant(slot) = base.entry(query) {
            slot.insert(top);
            added += 1;
        }
    }
    added
}
