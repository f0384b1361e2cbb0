//! Unit tests for hits/parser.rs

use std::io::Cursor;
use std::path::Path;

use reciprologs::error::ReciprologError;
use reciprologs::hits::HitReader;

use crate::helpers::tsv_line;

#[test]
fn test_reader_skips_comments_and_blanks() {
    let text = format!(
        "# BLASTP 2.14.0+\n\n{}\n# end\n{}\n",
        tsv_line("q1", "s1", 120, 1e-40, 250.0),
        tsv_line("q2", "s2", 80, 1e-10, 90.5)
    );
    let records: Vec<_> = HitReader::new(Path::new("hits.tsv"), Cursor::new(text))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].query, "q1");
    assert_eq!(records[0].alignment_length, 119);
    assert_eq!(records[1].bit_score, 90.5);
}

#[test]
fn test_reader_reports_line_of_bad_record() {
    let text = format!("{}\nq3\ts3\t90.0\n", tsv_line("q1", "s1", 120, 1e-40, 250.0));
    let results: Vec<_> = HitReader::new(Path::new("hits.tsv"), Cursor::new(text)).collect();
    assert!(results[0].is_ok());
    match &results[1] {
        Err(ReciprologError::MalformedHit { path, line, .. }) => {
            assert_eq!(path, Path::new("hits.tsv"));
            assert_eq!(*line, 2);
        }
        other => panic!("expected malformed hit, got {:?}", other),
    }
}

#[test]
fn test_reader_rejects_non_numeric_score() {
    let line = tsv_line("q1", "s1", 120, 1e-40, 250.0).replace("250.0", "high");
    let results: Vec<_> = HitReader::new(Path::new("hits.tsv"), Cursor::new(line)).collect();
    assert!(matches!(results[0], Err(ReciprologError::MalformedHit { .. })));
}
