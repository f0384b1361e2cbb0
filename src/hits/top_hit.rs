//! Top-hit selection for one directional search.
//!
//! Each query keeps exactly one subject. Candidates are compared in order:
//! bit score DESC -> e-value ASC -> subject length DESC (only when a length
//! lookup is supplied and both lengths are known). When nothing is decisive
//! the first-seen candidate stays.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::common::{HitRecord, LengthIndex, TopHit, TopHitMap};
use crate::error::Result;

use super::ledger::{LossReason, WinLedger};

/// Record filters shared by every comparison of a run.
#[derive(Debug, Clone, Default)]
pub struct SelectionFilters {
    /// Skip hits whose query and subject IDs are identical.
    pub ignore_same_id: bool,
    /// Skip hits whose IDs share the first token when split on this delimiter.
    pub same_prefix_delimiter: Option<String>,
    /// Minimum query coverage in percent.
    pub query_coverage: Option<f64>,
}

/// Outcome of comparing a challenger against the current holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The challenger replaces the holder, which lost for this reason.
    Challenger(LossReason),
    /// The holder stays, the challenger lost for this reason.
    Holder(LossReason),
}

/// Decide between a challenger record and the current top hit.
pub fn compare_candidates(
    challenger: &HitRecord,
    holder: &TopHit,
    lengths: Option<&LengthIndex>,
) -> Verdict {
    match challenger.bit_score.partial_cmp(&holder.score) {
        Some(Ordering::Greater) => return Verdict::Challenger(LossReason::BitScore),
        Some(Ordering::Less) => return Verdict::Holder(LossReason::BitScore),
        _ => {}
    }
    // Lower e-value is better.
    match challenger.e_value.partial_cmp(&holder.e_value) {
        Some(Ordering::Less) => return Verdict::Challenger(LossReason::EValue),
        Some(Ordering::Greater) => return Verdict::Holder(LossReason::EValue),
        _ => {}
    }
    let Some(lengths) = lengths else {
        return Verdict::Holder(LossReason::Tie);
    };
    // A missing length never decides in either direction.
    match (
        lengths.get(&challenger.subject),
        lengths.get(&holder.subject),
    ) {
        (Some(c), Some(h)) if c > h => Verdict::Challenger(LossReason::Length),
        (Some(c), Some(h)) if c < h => Verdict::Holder(LossReason::Length),
        _ => Verdict::Holder(LossReason::Tie),
    }
}

fn id_prefix<'s>(id: &'s str, delimiter: &str) -> &'s str {
    id.split(delimiter).next().unwrap_or(id)
}

/// Accumulates the top hit per query from a stream of records.
pub struct TopHitSelector<'a> {
    filters: &'a SelectionFilters,
    exclude_self_hits: bool,
    allowed_queries: Option<&'a FxHashSet<String>>,
    query_lengths: Option<&'a LengthIndex>,
    subject_lengths: Option<&'a LengthIndex>,
    hits: TopHitMap,
    ledger: Option<WinLedger>,
}

impl<'a> TopHitSelector<'a> {
    pub fn new(filters: &'a SelectionFilters) -> Self {
        Self {
            filters,
            exclude_self_hits: filters.ignore_same_id,
            allowed_queries: None,
            query_lengths: None,
            subject_lengths: None,
            hits: TopHitMap::default(),
            ledger: None,
        }
    }

    /// Mark the comparison as an input searched against itself; self hits
    /// are then always skipped.
    pub fn self_search(mut self, is_self: bool) -> Self {
        self.exclude_self_hits = self.filters.ignore_same_id || is_self;
        self
    }

    pub fn allowed_queries(mut self, allowed: Option<&'a FxHashSet<String>>) -> Self {
        self.allowed_queries = allowed;
        self
    }

    /// Query-side lengths, used for the coverage filter.
    pub fn query_lengths(mut self, lengths: Option<&'a LengthIndex>) -> Self {
        self.query_lengths = lengths;
        self
    }

    /// Subject-side lengths, used for the final tie-break.
    pub fn subject_lengths(mut self, lengths: Option<&'a LengthIndex>) -> Self {
        self.subject_lengths = lengths;
        self
    }

    pub fn with_ledger(mut self, enabled: bool) -> Self {
        self.ledger = enabled.then(WinLedger::new);
        self
    }

    fn passes_filters(&self, rec: &HitRecord) -> bool {
        if let Some(allowed) = self.allowed_queries {
            if !allowed.contains(&rec.query) {
                return false;
            }
        }
        if self.exclude_self_hits && rec.query == rec.subject {
            return false;
        }
        if let Some(delim) = self.filters.same_prefix_delimiter.as_deref() {
            if id_prefix(&rec.query, delim) == id_prefix(&rec.subject, delim) {
                return false;
            }
        }
        if let Some(threshold) = self.filters.query_coverage {
            // No length for the query means coverage can't be judged.
            if let Some(&query_len) = self.query_lengths.and_then(|l| l.get(&rec.query)) {
                if query_len > 0 {
                    let coverage = rec.alignment_length as f64 / query_len as f64 * 100.0;
                    if coverage < threshold {
                        trace!(query = %rec.query, subject = %rec.subject, coverage, "below coverage");
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Offer one record; it becomes the top hit for its query if it wins.
    pub fn offer(&mut self, rec: HitRecord) {
        if !self.passes_filters(&rec) {
            return;
        }

        let Some(holder) = self.hits.get(&rec.query) else {
            if let Some(ledger) = self.ledger.as_mut() {
                ledger.set_best(&rec.query, &rec.subject);
            }
            self.hits.insert(rec.query.clone(), TopHit::from(rec));
            return;
        };

        match compare_candidates(&rec, holder, self.subject_lengths) {
            Verdict::Challenger(reason) => {
                if let Some(ledger) = self.ledger.as_mut() {
                    if holder.subject != rec.subject {
                        ledger.add_loser(&rec.query, &holder.subject, reason);
                    }
                    ledger.set_best(&rec.query, &rec.subject);
                }
                self.hits.insert(rec.query.clone(), TopHit::from(rec));
            }
            Verdict::Holder(reason) => {
                if let Some(ledger) = self.ledger.as_mut() {
                    if holder.subject != rec.subject {
                        ledger.add_loser(&rec.query, &rec.subject, reason);
                    }
                }
            }
        }
    }

    /// Offer every record from a fallible stream, stopping at the first error.
    pub fn consume<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<HitRecord>>,
    {
        for rec in records {
            self.offer(rec?);
        }
        Ok(())
    }

    pub fn finish(self) -> (TopHitMap, Option<WinLedger>) {
        (self.hits, self.ledger)
    }
}

/// Select top hits from already-parsed records with no ledger, using one
/// length lookup for both coverage and tie-break.
pub fn select_top_hits<I>(
    records: I,
    filters: &SelectionFilters,
    lengths: Option<&LengthIndex>,
) -> TopHitMap
where
    I: IntoIterator<Item = HitRecord>,
{
    let mut selector = TopHitSelector::new(filters)
        .query_lengths(lengths)
        .subject_lengths(lengths);
    for rec in records {
        selector.offer(rec);
    }
    selector.finish().0
}
