//! Unit tests for hits/top_hit.rs

use proptest::prelude::*;
use rustc_hash::FxHashSet;

use reciprologs::common::{HitRecord, LengthIndex};
use reciprologs::hits::{select_top_hits, LossReason, SelectionFilters, TopHitSelector};

use crate::helpers::hit;

fn lengths(entries: &[(&str, usize)]) -> LengthIndex {
    entries.iter().map(|(id, len)| (id.to_string(), *len)).collect()
}

#[test]
fn test_best_bitscore_kept_per_query() {
    let records = vec![
        hit("q1", "s1", 100.0, 1e-20),
        hit("q1", "s2", 150.0, 1e-25),
        hit("q1", "s3", 120.0, 1e-30),
        hit("q2", "s1", 80.0, 1e-10),
    ];
    let top = select_top_hits(records, &SelectionFilters::default(), None);
    assert_eq!(top.len(), 2);
    assert_eq!(top["q1"].subject, "s2");
    assert_eq!(top["q1"].score, 150.0);
    assert_eq!(top["q2"].subject, "s1");
}

#[test]
fn test_length_tie_break_independent_of_order() {
    let lens = lengths(&[("short", 200), ("long", 450)]);
    let a = hit("q1", "short", 100.0, 1e-20);
    let b = hit("q1", "long", 100.0, 1e-20);

    let forward = select_top_hits(vec![a.clone(), b.clone()], &SelectionFilters::default(), Some(&lens));
    let backward = select_top_hits(vec![b, a], &SelectionFilters::default(), Some(&lens));
    assert_eq!(forward["q1"].subject, "long");
    assert_eq!(backward["q1"].subject, "long");
}

#[test]
fn test_full_tie_keeps_first_seen() {
    let records = vec![hit("q1", "first", 100.0, 1e-20), hit("q1", "second", 100.0, 1e-20)];
    let top = select_top_hits(records, &SelectionFilters::default(), None);
    assert_eq!(top["q1"].subject, "first");
}

#[test]
fn test_allowed_queries_restrict_selection() {
    let allowed: FxHashSet<String> = ["q1".to_string()].into_iter().collect();
    let filters = SelectionFilters::default();
    let mut selector = TopHitSelector::new(&filters).allowed_queries(Some(&allowed));
    selector.offer(hit("q1", "s1", 50.0, 1e-5));
    selector.offer(hit("q2", "s1", 90.0, 1e-9));
    let (top, ledger) = selector.finish();
    assert!(top.contains_key("q1"));
    assert!(!top.contains_key("q2"));
    assert!(ledger.is_none());
}

#[test]
fn test_self_search_skips_identical_ids() {
    let filters = SelectionFilters::default();
    let mut selector = TopHitSelector::new(&filters).self_search(true);
    selector.offer(hit("g1", "g1", 500.0, 0.0));
    selector.offer(hit("g1", "g2", 200.0, 1e-50));
    let (top, _) = selector.finish();
    assert_eq!(top["g1"].subject, "g2");
}

#[test]
fn test_same_id_filter_outside_self_search() {
    let filters = SelectionFilters {
        ignore_same_id: true,
        ..Default::default()
    };
    let top = select_top_hits(vec![hit("g1", "g1", 500.0, 0.0)], &filters, None);
    assert!(top.is_empty());

    let top = select_top_hits(vec![hit("g1", "g1", 500.0, 0.0)], &SelectionFilters::default(), None);
    assert_eq!(top["g1"].subject, "g1");
}

#[test]
fn test_same_prefix_filter() {
    let filters = SelectionFilters {
        same_prefix_delimiter: Some("_".to_string()),
        ..Default::default()
    };
    let records = vec![
        hit("HUMAN_g1", "HUMAN_g7", 300.0, 1e-80),
        hit("HUMAN_g1", "MOUSE_g1", 250.0, 1e-70),
    ];
    let top = select_top_hits(records, &filters, None);
    assert_eq!(top["HUMAN_g1"].subject, "MOUSE_g1");
}

#[test]
fn test_query_coverage_filter() {
    let filters = SelectionFilters {
        query_coverage: Some(50.0),
        ..Default::default()
    };
    // helpers::hit records an alignment length of 99.
    let lens = lengths(&[("q1", 150), ("q2", 400)]);
    let records = vec![
        hit("q1", "s1", 100.0, 1e-20),
        hit("q2", "s1", 100.0, 1e-20),
        hit("q3", "s1", 100.0, 1e-20),
    ];
    let top = select_top_hits(records, &filters, Some(&lens));
    assert!(top.contains_key("q1"));
    assert!(!top.contains_key("q2"));
    // Unknown query length: coverage can't be judged, hit is kept.
    assert!(top.contains_key("q3"));
}

#[test]
fn test_ledger_records_losers_with_reason() {
    let filters = SelectionFilters::default();
    let lens = lengths(&[("s1", 100), ("s2", 100), ("s3", 100), ("s4", 300)]);
    let mut selector = TopHitSelector::new(&filters)
        .subject_lengths(Some(&lens))
        .with_ledger(true);
    selector.offer(hit("q1", "s1", 100.0, 1e-20));
    selector.offer(hit("q1", "s2", 100.0, 1e-30));
    selector.offer(hit("q1", "s3", 90.0, 1e-30));
    selector.offer(hit("q1", "s4", 100.0, 1e-30));
    let (top, ledger) = selector.finish();
    assert_eq!(top["q1"].subject, "s4");

    let ledger = ledger.unwrap();
    let entry = ledger.get("q1").unwrap();
    assert_eq!(entry.best, "s4");
    assert!(entry.losers.contains(&("s1".to_string(), LossReason::EValue)));
    assert!(entry.losers.contains(&("s3".to_string(), LossReason::BitScore)));
    assert!(entry.losers.contains(&("s2".to_string(), LossReason::Length)));
}

#[test]
fn test_ledger_marks_undecided_challenger_as_tie() {
    let filters = SelectionFilters::default();
    let mut selector = TopHitSelector::new(&filters).with_ledger(true);
    selector.offer(hit("q1", "s1", 100.0, 1e-20));
    selector.offer(hit("q1", "s2", 100.0, 1e-20));
    let (_, ledger) = selector.finish();
    let entry = ledger.unwrap().get("q1").cloned().unwrap();
    assert_eq!(entry.best, "s1");
    assert!(entry.losers.contains(&("s2".to_string(), LossReason::Tie)));
}

fn arb_records() -> impl Strategy<Value = Vec<HitRecord>> {
    prop::collection::vec((0..4usize, 0..6usize, 1..20u32, 1..5i32), 1..40).prop_map(|v| {
        v.into_iter()
            .map(|(q, s, score, exp)| {
                hit(
                    &format!("q{}", q),
                    &format!("s{}", s),
                    score as f64 * 10.0,
                    10f64.powi(-exp),
                )
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_top_hit_is_maximal(records in arb_records()) {
        let top = select_top_hits(records.clone(), &SelectionFilters::default(), None);
        for rec in &records {
            let best = &top[&rec.query];
            prop_assert!(best.score >= rec.bit_score);
            if best.score == rec.bit_score {
                prop_assert!(best.e_value <= rec.e_value);
            }
        }
        let queries: FxHashSet<&str> = records.iter().map(|r| r.query.as_str()).collect();
        prop_assert_eq!(top.len(), queries.len());
    }
}
