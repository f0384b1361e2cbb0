//! External similarity-search invocation.
//!
//! The search program is a black box that writes 12-column tabular output.
//! Runs are independent OS processes; several may run at once, bounded by the
//! caller's process count. Any nonzero exit aborts the run.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, error, info};

use crate::error::ReciprologError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SearchKind {
    /// Nucleotide vs nucleotide (NCBI blastn)
    Blastn,
    /// Protein vs protein (NCBI blastp)
    Blastp,
    /// Translated nucleotide vs translated nucleotide (NCBI tblastx)
    Tblastx,
    /// Protein vs protein (DIAMOND blastp)
    Diamond,
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SearchKind {
    pub fn name(&self) -> &'static str {
        match self {
            SearchKind::Blastn => "blastn",
            SearchKind::Blastp => "blastp",
            SearchKind::Tblastx => "tblastx",
            SearchKind::Diamond => "diamond",
        }
    }

    /// Command that turns a FASTA file into a searchable database.
    pub fn database_command(&self, fasta: &Path, database: &Path) -> Command {
        match self {
            SearchKind::Diamond => {
                let mut cmd = Command::new("diamond");
                cmd.arg("makedb")
                    .arg("--in")
                    .arg(fasta)
                    .arg("-d")
                    .arg(database)
                    .arg("--quiet");
                cmd
            }
            _ => {
                let dbtype = match self {
                    SearchKind::Blastp => "prot",
                    _ => "nucl",
                };
                let mut cmd = Command::new("makeblastdb");
                cmd.arg("-in")
                    .arg(fasta)
                    .arg("-dbtype")
                    .arg(dbtype)
                    .arg("-out")
                    .arg(database);
                cmd
            }
        }
    }

    pub fn search_command(&self, req: &SearchRequest, extra_args: &[String]) -> Command {
        let mut cmd = match self {
            SearchKind::Diamond => {
                let mut cmd = Command::new("diamond");
                cmd.arg("blastp")
                    .arg("-q")
                    .arg(&req.query)
                    .arg("-d")
                    .arg(&req.database)
                    .arg("-o")
                    .arg(&req.out)
                    .args(["--outfmt", "6", "--quiet", "--threads"])
                    .arg(req.threads.to_string());
                cmd
            }
            _ => {
                let mut cmd = Command::new(self.name());
                cmd.arg("-query")
                    .arg(&req.query)
                    .arg("-db")
                    .arg(&req.database)
                    .arg("-out")
                    .arg(&req.out)
                    .args(["-outfmt", "6", "-num_threads"])
                    .arg(req.threads.to_string());
                cmd
            }
        };
        cmd.args(extra_args);
        cmd
    }
}

/// One directional search: `query` FASTA against the database built from a
/// subject input, writing tabular output to `out`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub kind: SearchKind,
    pub query: PathBuf,
    pub subject: PathBuf,
    pub database: PathBuf,
    pub out: PathBuf,
    pub threads: usize,
}

/// The external search collaborator.
pub trait SearchRunner: Sync {
    fn prepare_database(&self, kind: SearchKind, fasta: &Path, database: &Path) -> Result<()>;

    fn search(&self, req: &SearchRequest) -> Result<()>;
}

/// Runs the real search programs found on `PATH`.
#[derive(Debug, Clone, Default)]
pub struct CommandRunner {
    /// Appended verbatim to every search command.
    pub extra_args: Vec<String>,
}

fn render(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn run_command(mut cmd: Command) -> std::result::Result<(), ReciprologError> {
    let rendered = render(&cmd);
    debug!("Running: {}", rendered);
    let output = cmd.stdout(Stdio::null()).stderr(Stdio::piped()).output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            error!("{}", stderr.trim());
        }
        return Err(ReciprologError::SearchFailed {
            command: rendered,
            status: output.status,
        });
    }
    Ok(())
}

impl SearchRunner for CommandRunner {
    fn prepare_database(&self, kind: SearchKind, fasta: &Path, database: &Path) -> Result<()> {
        run_command(kind.database_command(fasta, database))
            .with_context(|| format!("Failed to build {} database for {}", kind, fasta.display()))
    }

    fn search(&self, req: &SearchRequest) -> Result<()> {
        run_command(req.kind.search_command(req, &self.extra_args)).with_context(|| {
            format!(
                "{} search {} vs {} failed",
                req.kind,
                req.query.display(),
                req.subject.display()
            )
        })
    }
}

/// Run every request whose output is missing (or all of them when
/// `overwrite`), at most `processes` at a time.
///
/// Requests sharing an output path (an input compared with itself) run once.
pub fn run_searches<R>(runner: &R, requests: &[SearchRequest], processes: usize, overwrite: bool) -> Result<()>
where
    R: SearchRunner + ?Sized,
{
    let mut claimed: FxHashSet<&Path> = FxHashSet::default();
    let pending: Vec<&SearchRequest> = requests
        .iter()
        .filter(|req| {
            let first = claimed.insert(req.out.as_path());
            if !first {
                debug!("{} already scheduled", req.out.display());
            }
            first
        })
        .filter(|req| {
            let reuse = !overwrite && req.out.exists();
            if reuse {
                info!("Reusing existing results {}", req.out.display());
            }
            !reuse
        })
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    info!(
        "Running {} searches with up to {} concurrent processes",
        pending.len(),
        processes
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(processes.max(1))
        .build()
        .context("Failed to build process pool")?;

    let bar = ProgressBar::new(pending.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} searches")
            .context("Invalid progress template")?,
    );

    let result = pool.install(|| {
        pending.par_iter().try_for_each(|req| {
            runner.search(req)?;
            bar.inc(1);
            Ok(())
        })
    });
    bar.finish_and_clear();
    result
}
