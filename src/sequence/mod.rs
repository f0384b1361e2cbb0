//! FASTA handling for the pipeline: length lookups, ID sets and subset files.
//!
//! IDs are the first whitespace-delimited token of the header, matching what
//! tabular search output reports as qseqid/sseqid.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use bio::io::fasta;
use rustc_hash::FxHashSet;

use crate::common::LengthIndex;

/// Sequence ID -> length for every record in `path`.
pub fn read_lengths(path: &Path) -> Result<LengthIndex> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("Failed to open FASTA {}", path.display()))?;
    let mut lengths = LengthIndex::default();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read FASTA {}", path.display()))?;
        lengths.insert(record.id().to_string(), record.seq().len());
    }
    Ok(lengths)
}

/// All sequence IDs in `path`, sorted.
pub fn read_ids(path: &Path) -> Result<BTreeSet<String>> {
    let reader = fasta::Reader::from_file(path)
        .with_context(|| format!("Failed to open FASTA {}", path.display()))?;
    reader
        .records()
        .map(|r| {
            r.map(|rec| rec.id().to_string())
                .with_context(|| format!("Failed to read FASTA {}", path.display()))
        })
        .collect()
}

/// Read a subset file: one header per line, optional leading '>', only the
/// first whitespace token kept. Blank lines are ignored.
pub fn read_subset_file(path: &Path) -> Result<FxHashSet<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open subset file {}", path.display()))?;
    let mut ids = FxHashSet::default();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let header = line.trim().trim_start_matches('>');
        if let Some(id) = header.split_whitespace().next() {
            ids.insert(id.to_string());
        }
    }
    Ok(ids)
}

/// Copy the records of `src` whose ID is in `ids` into `dest`.
///
/// Returns the number of records written.
pub fn write_subset_fasta<'a, I>(src: &Path, ids: I, dest: &Path) -> Result<usize>
where
    I: IntoIterator<Item = &'a String>,
{
    let wanted: FxHashSet<&str> = ids.into_iter().map(String::as_str).collect();
    let reader = fasta::Reader::from_file(src)
        .with_context(|| format!("Failed to open FASTA {}", src.display()))?;
    let mut writer = fasta::Writer::to_file(dest)
        .with_context(|| format!("Failed to create {}", dest.display()))?;

    let mut written = 0;
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read FASTA {}", src.display()))?;
        if wanted.contains(record.id()) {
            writer.write_record(&record)?;
            written += 1;
        }
    }
    writer.flush()?;
    Ok(written)
}
