//! Validated run configuration.
//!
//! Everything that can be wrong about the inputs is checked here, before any
//! database is built or search is started.

pub mod args;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::cluster::{Policy, StrategyKind};
use crate::common::SubsetIndex;
use crate::error::ReciprologError;
use crate::hits::SelectionFilters;
use crate::search::SearchKind;
use crate::sequence;

pub use args::{ReciprologArgs, NO_SUBSET};

/// One FASTA input.
#[derive(Debug, Clone)]
pub struct InputSet {
    pub path: PathBuf,
    /// File name; labels the input in pairs and output file names.
    pub tag: String,
    /// Allowed query IDs, `None` when the whole input is used.
    pub subset: Option<FxHashSet<String>>,
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub kind: SearchKind,
    pub inputs: Vec<InputSet>,
    pub policy: Policy,
    pub strategy: StrategyKind,
    pub filters: SelectionFilters,
    pub one_to_one: bool,
    pub dropped_out: Option<PathBuf>,
    pub ledger: bool,
    pub pairs_only: bool,
    pub workdir: PathBuf,
    pub overwrite: bool,
    pub processes: usize,
    pub threads: usize,
    pub out: Option<PathBuf>,
    pub extra_args: Vec<String>,
}

fn config_error(msg: impl Into<String>) -> anyhow::Error {
    ReciprologError::Config(msg.into()).into()
}

fn input_tag(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| config_error(format!("{} is not a file path", path.display())))
}

impl RunConfig {
    pub fn from_args(kind: SearchKind, args: &ReciprologArgs) -> Result<Self> {
        if args.inputs.len() < 2 {
            return Err(config_error("at least two inputs are required"));
        }
        if !args.subset.is_empty() && args.subset.len() != args.inputs.len() {
            return Err(config_error(format!(
                "{} subset entries given for {} inputs; use \"{}\" for inputs without a subset",
                args.subset.len(),
                args.inputs.len(),
                NO_SUBSET
            )));
        }
        if let Some(cov) = args.query_coverage {
            if !(0.0..=100.0).contains(&cov) {
                return Err(config_error(format!("query coverage {} is outside 0-100", cov)));
            }
        }

        // Same tag is only allowed for the same file (self comparison).
        let mut tags: FxHashMap<String, &Path> = FxHashMap::default();
        let mut inputs = Vec::with_capacity(args.inputs.len());
        for (i, path) in args.inputs.iter().enumerate() {
            let tag = input_tag(path)?;
            if let Some(prev) = tags.insert(tag.clone(), path.as_path()) {
                if prev != path.as_path() {
                    return Err(config_error(format!(
                        "inputs {} and {} share the file name {}",
                        prev.display(),
                        path.display(),
                        tag
                    )));
                }
            }

            let subset = match args.subset.get(i).map(String::as_str) {
                None | Some(NO_SUBSET) => None,
                Some(file) => Some(load_subset(path, Path::new(file))?),
            };
            inputs.push(InputSet {
                path: path.clone(),
                tag,
                subset,
            });
        }

        // A self comparison shares result files between both directions.
        for (i, a) in inputs.iter().enumerate() {
            if inputs[i + 1..]
                .iter()
                .any(|b| b.path == a.path && b.subset != a.subset)
            {
                return Err(config_error(format!(
                    "{} is given twice with different subsets",
                    a.path.display()
                )));
            }
        }

        let processes = if args.processes == 0 {
            num_cpus::get()
        } else {
            args.processes
        };

        Ok(Self {
            kind,
            inputs,
            policy: if args.chain { Policy::Chained } else { Policy::Strict },
            strategy: StrategyKind::detect(args.brute_force),
            filters: SelectionFilters {
                ignore_same_id: args.ignore_same_id,
                same_prefix_delimiter: args.ignore_same_prefix.clone(),
                query_coverage: args.query_coverage,
            },
            one_to_one: args.one_to_one,
            dropped_out: args.dropped_out.clone(),
            ledger: args.ledger,
            pairs_only: args.pairs,
            workdir: args.workdir.clone(),
            overwrite: args.overwrite,
            processes,
            threads: args.num_threads.max(1),
            out: args.out.clone(),
            extra_args: args
                .extra_args
                .as_deref()
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        })
    }

    pub fn subset_index(&self) -> SubsetIndex {
        let mut index = SubsetIndex::new();
        for input in &self.inputs {
            if let Some(ids) = &input.subset {
                index.insert(input.tag.clone(), ids.clone());
            }
        }
        index
    }

    pub fn has_subsets(&self) -> bool {
        self.inputs.iter().any(|i| i.subset.is_some())
    }
}

/// Read a subset file and keep only IDs present in the input.
fn load_subset(input: &Path, file: &Path) -> Result<FxHashSet<String>> {
    let requested = sequence::read_subset_file(file)?;
    if requested.is_empty() {
        return Err(config_error(format!("subset file {} is empty", file.display())));
    }
    let present = sequence::read_ids(input)
        .with_context(|| format!("Failed to read IDs from {}", input.display()))?;
    let (kept, missing): (FxHashSet<String>, FxHashSet<String>) =
        requested.into_iter().partition(|id| present.contains(id));
    if kept.is_empty() {
        return Err(config_error(format!(
            "no ID in subset file {} occurs in {}",
            file.display(),
            input.display()
        )));
    }
    if !missing.is_empty() {
        warn!(
            "{} IDs in {} are not in {} and will be ignored",
            missing.len(),
            file.display(),
            input.display()
        );
    }
    Ok(kept)
}
