//! One-to-one filtering of a pairwise reciprolog set.
//!
//! A member may end up in several pairs when, for example, an input holds two
//! identical sequences. Pairs are scored by the mean of their two directional
//! scores and visited in order; a pair survives only if it strictly beats every
//! surviving pair it shares a member with. Ties favor the earlier pair.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::common::{Member, ReciprologPair};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OneToOneOutcome {
    pub kept: Vec<ReciprologPair>,
    pub dropped: Vec<ReciprologPair>,
}

pub fn filter_one_to_one(pairs: &[ReciprologPair]) -> OneToOneOutcome {
    let mut alive = vec![true; pairs.len()];
    let mut claims: FxHashMap<&Member, usize> = FxHashMap::default();

    for (idx, pair) in pairs.iter().enumerate() {
        let score = pair.mean_score();
        let (a, b) = (&pair.members.0, &pair.members.1);

        let mut rivals: Vec<usize> = [a, b]
            .iter()
            .filter_map(|m| claims.get(*m).copied())
            .filter(|&j| alive[j])
            .collect();
        rivals.dedup();

        if rivals.iter().any(|&j| pairs[j].mean_score() >= score) {
            alive[idx] = false;
            continue;
        }
        for j in rivals {
            alive[j] = false;
        }
        claims.insert(a, idx);
        claims.insert(b, idx);
    }

    let mut outcome = OneToOneOutcome::default();
    for (pair, keep) in pairs.iter().zip(alive) {
        if keep {
            outcome.kept.push(pair.clone());
        } else {
            debug!(
                a = %pair.members.0,
                b = %pair.members.1,
                score = pair.mean_score(),
                "dropped many-to-one pair"
            );
            outcome.dropped.push(pair.clone());
        }
    }
    outcome
}
