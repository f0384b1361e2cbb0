use rustc_hash::FxHashSet;

use crate::common::{Member, ReciprologPair, TopHitMap};

/// A top-hit map together with the tag of its query input.
#[derive(Debug, Clone, Copy)]
pub struct TaggedHits<'a> {
    pub tag: &'a str,
    pub hits: &'a TopHitMap,
}

impl<'a> TaggedHits<'a> {
    pub fn new(tag: &'a str, hits: &'a TopHitMap) -> Self {
        Self { tag, hits }
    }
}

/// Mutual best-match pairs between two opposite directional searches.
///
/// Both maps are scanned so a pair is found even when only one side holds
/// the query that starts the agreement. The result is deduplicated and
/// sorted, and does not depend on argument order.
pub fn find_reciprologs(x: TaggedHits<'_>, y: TaggedHits<'_>) -> Vec<ReciprologPair> {
    let mut seen: FxHashSet<(Member, Member)> = FxHashSet::default();
    let mut pairs = Vec::new();

    for (fwd, rev) in [(x, y), (y, x)] {
        for (query, top) in fwd.hits {
            let Some(back) = rev.hits.get(&top.subject) else {
                continue;
            };
            if back.subject != *query {
                continue;
            }
            let pair = ReciprologPair::new(
                Member::new(fwd.tag, query.as_str()),
                Member::new(rev.tag, top.subject.as_str()),
                top.score,
                back.score,
            );
            if seen.insert(pair.members.clone()) {
                pairs.push(pair);
            }
        }
    }

    pairs.sort_by(|a, b| a.members.cmp(&b.members));
    pairs
}
