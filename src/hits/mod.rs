//! Directional hit handling: tabular parsing, top-hit selection and the
//! optional win ledger.

pub mod ledger;
pub mod parser;
pub mod top_hit;

pub use ledger::{LedgerEntry, LossReason, WinLedger};
pub use parser::{parse_hit_line, HitReader};
pub use top_hit::{compare_candidates, select_top_hits, SelectionFilters, TopHitSelector, Verdict};
