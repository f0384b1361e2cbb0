//! Win ledger: why each candidate subject lost for a query.
//!
//! Append-only. An entry is created the first time a query is written to and
//! keeps insertion order so the written ledger follows the input file.

use std::collections::BTreeSet;
use std::fmt;
use std::io::{self, Write};

use rustc_hash::FxHashMap;

/// Criterion that decided a comparison between two candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LossReason {
    BitScore,
    EValue,
    Length,
    /// Nothing was decisive; the first-seen candidate was kept.
    Tie,
}

impl fmt::Display for LossReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LossReason::BitScore => "bitscore",
            LossReason::EValue => "evalue",
            LossReason::Length => "length",
            LossReason::Tie => "tie",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub best: String,
    pub losers: BTreeSet<(String, LossReason)>,
}

#[derive(Debug, Clone, Default)]
pub struct WinLedger {
    order: Vec<String>,
    entries: FxHashMap<String, LedgerEntry>,
}

impl WinLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current best subject for `query`.
    pub fn set_best(&mut self, query: &str, best: &str) {
        match self.entries.get_mut(query) {
            Some(entry) => entry.best = best.to_string(),
            None => {
                self.order.push(query.to_string());
                self.entries.insert(
                    query.to_string(),
                    LedgerEntry {
                        best: best.to_string(),
                        losers: BTreeSet::new(),
                    },
                );
            }
        }
    }

    /// Record `loser` as beaten for `query`. Ignored until a best exists.
    pub fn add_loser(&mut self, query: &str, loser: &str, reason: LossReason) {
        if let Some(entry) = self.entries.get_mut(query) {
            entry.losers.insert((loser.to_string(), reason));
        }
    }

    pub fn get(&self, query: &str) -> Option<&LedgerEntry> {
        self.entries.get(query)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Queries with their entries, in first-write order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LedgerEntry)> {
        self.order
            .iter()
            .filter_map(|q| self.entries.get(q).map(|e| (q.as_str(), e)))
    }

    /// One line per query: `query<TAB>best<TAB>loser(reason),...`.
    ///
    /// A subject that later became the best is not listed among the losers.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# query\tbest\tlosers")?;
        for (query, entry) in self.iter() {
            let losers: Vec<String> = entry
                .losers
                .iter()
                .filter(|(id, _)| *id != entry.best)
                .map(|(id, reason)| format!("{}({})", id, reason))
                .collect();
            writeln!(writer, "{}\t{}\t{}", query, entry.best, losers.join(","))?;
        }
        Ok(())
    }
}
