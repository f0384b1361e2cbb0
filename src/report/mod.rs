//! Line-oriented writers for groups, pairs and ledgers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::common::{OrthoGroup, ReciprologPair};
use crate::hits::WinLedger;

/// Buffered writer for `path`, or stdout when `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

/// One group per line, member IDs tab-separated.
pub fn write_groups<W: Write + ?Sized>(writer: &mut W, groups: &[OrthoGroup]) -> io::Result<()> {
    for group in groups {
        let ids: Vec<&str> = group.ids().collect();
        writeln!(writer, "{}", ids.join("\t"))?;
    }
    writer.flush()
}

/// One pair per line: `id_a  id_b  score_a  score_b`, scores ascending.
pub fn write_pairs<W: Write + ?Sized>(writer: &mut W, pairs: &[ReciprologPair]) -> io::Result<()> {
    for pair in pairs {
        writeln!(
            writer,
            "{}\t{}\t{:.1}\t{:.1}",
            pair.members.0.id, pair.members.1.id, pair.scores.0, pair.scores.1
        )?;
    }
    writer.flush()
}

pub fn write_ledger_file(path: &Path, ledger: &WinLedger) -> Result<()> {
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    ledger.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
