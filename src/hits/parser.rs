//! Parsing of 12-column tabular search output (outfmt 6)
//!
//! Columns used: qseqid (0), sseqid (1), length (3), evalue (10), bitscore (11).

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use crate::common::HitRecord;
use crate::error::{ReciprologError, Result};

const QUERY_COL: usize = 0;
const SUBJECT_COL: usize = 1;
const LENGTH_COL: usize = 3;
const EVALUE_COL: usize = 10;
const BITSCORE_COL: usize = 11;
const MIN_COLUMNS: usize = 12;

const COMMENT_MARKER: char = '#';

/// Parse one tabular line.
///
/// Returns `Ok(None)` for comment and blank lines. The error string names the
/// offending column; the file reader adds path and line number.
pub fn parse_hit_line(line: &str) -> std::result::Result<Option<HitRecord>, String> {
    let line = line.trim_end_matches(['\n', '\r']);
    if line.is_empty() || line.starts_with(COMMENT_MARKER) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < MIN_COLUMNS {
        return Err(format!(
            "expected {} tab-separated columns, found {}",
            MIN_COLUMNS,
            fields.len()
        ));
    }

    let length: usize = parse_field(&fields, LENGTH_COL, "length")?;
    let e_value: f64 = parse_field(&fields, EVALUE_COL, "evalue")?;
    let bit_score: f64 = parse_field(&fields, BITSCORE_COL, "bitscore")?;

    Ok(Some(HitRecord {
        query: fields[QUERY_COL].to_string(),
        subject: fields[SUBJECT_COL].to_string(),
        // The length column overcounts by one relative to the coverage
        // calculation; store the corrected value.
        alignment_length: length.saturating_sub(1),
        e_value,
        bit_score,
    }))
}

fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    col: usize,
    name: &str,
) -> std::result::Result<T, String>
where
    T::Err: std::fmt::Display,
{
    let raw = fields[col].trim();
    raw.parse::<T>()
        .map_err(|e| format!("column {} ({}) = {:?}: {}", col + 1, name, raw, e))
}

/// Lazily reads hit records from a tabular file, skipping comments.
pub struct HitReader<R> {
    path: PathBuf,
    lines: Lines<R>,
    line_no: usize,
}

impl HitReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(path, BufReader::new(file)))
    }
}

impl<R: BufRead> HitReader<R> {
    pub fn new(path: &Path, reader: R) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for HitReader<R> {
    type Item = Result<HitRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;
            match parse_hit_line(&line) {
                Ok(Some(rec)) => return Some(Ok(rec)),
                Ok(None) => continue,
                Err(reason) => {
                    return Some(Err(ReciprologError::MalformedHit {
                        path: self.path.clone(),
                        line: self.line_no,
                        reason,
                    }))
                }
            }
        }
    }
}
