//! End-to-end run: searches -> top hits -> residual rounds -> reciprocal
//! pairs -> one-to-one filter -> groups.
//!
//! Only the external searches run concurrently. Top-hit maps are built and
//! merged one comparison at a time.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::cluster::{touches_subset, Aggregator};
use crate::common::{LengthIndex, OrthoGroup, ReciprologPair, TopHitMap};
use crate::config::{ReciprologArgs, RunConfig};
use crate::hits::{HitReader, TopHitSelector};
use crate::pairing::{
    filter_one_to_one, find_reciprologs, merge_top_hits, residual_subjects, ResidualIndex, TaggedHits,
};
use crate::report::{open_output, write_groups, write_ledger_file, write_pairs};
use crate::search::{run_searches, CommandRunner, SearchKind, SearchRequest, SearchRunner};
use crate::sequence;

/// (query input index, subject input index)
type Comparison = (usize, usize);

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Reciprocal pairs that survived filtering, across all input pairs.
    pub pairs: Vec<ReciprologPair>,
    /// Pairs removed by the one-to-one filter.
    pub dropped: Vec<ReciprologPair>,
    /// Empty in pairs-only mode.
    pub groups: Vec<OrthoGroup>,
    /// Subjects that needed a residual round.
    pub residuals: usize,
}

pub struct Pipeline<'a, R: SearchRunner + ?Sized> {
    config: &'a RunConfig,
    runner: &'a R,
}

impl<'a, R: SearchRunner + ?Sized> Pipeline<'a, R> {
    pub fn new(config: &'a RunConfig, runner: &'a R) -> Self {
        Self { config, runner }
    }

    fn tag(&self, idx: usize) -> &str {
        &self.config.inputs[idx].tag
    }

    fn kind(&self) -> SearchKind {
        self.config.kind
    }

    /// Every ordered pair of distinct input positions.
    fn comparisons(&self) -> Vec<Comparison> {
        let n = self.config.inputs.len();
        (0..n)
            .flat_map(|q| (0..n).filter(move |&s| s != q).map(move |s| (q, s)))
            .collect()
    }

    fn is_self_search(&self, (q, s): Comparison) -> bool {
        self.config.inputs[q].path == self.config.inputs[s].path
    }

    fn database_path(&self, idx: usize) -> PathBuf {
        self.config
            .workdir
            .join(format!("{}.{}.db", self.tag(idx), self.kind()))
    }

    fn result_path(&self, (q, s): Comparison, round: &str) -> PathBuf {
        self.config.workdir.join(format!(
            "{}{}-{}.{}.tsv",
            self.tag(q),
            round,
            self.tag(s),
            self.kind()
        ))
    }

    fn request(&self, query: &Path, subject: usize, out: PathBuf) -> SearchRequest {
        SearchRequest {
            kind: self.kind(),
            query: query.to_path_buf(),
            subject: self.config.inputs[subject].path.clone(),
            database: self.database_path(subject),
            out,
            threads: self.config.threads,
        }
    }

    /// FASTA used as query for input `idx`: the subset when restricted.
    fn query_fasta(&self, idx: usize) -> Result<PathBuf> {
        let input = &self.config.inputs[idx];
        let Some(subset) = &input.subset else {
            return Ok(input.path.clone());
        };
        let dest = self.config.workdir.join(format!("{}.subset.fa", input.tag));
        let written = sequence::write_subset_fasta(&input.path, subset, &dest)?;
        debug!("Wrote {} subset queries to {}", written, dest.display());
        Ok(dest)
    }

    /// Tie a restricted search result to the query IDs that produced it.
    ///
    /// The sorted IDs are kept next to the result with an `.ids` extension.
    /// A result produced from a different ID set is deleted so it is searched
    /// again instead of being reused.
    fn check_query_ids<'i, I>(&self, out: &Path, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = &'i String>,
    {
        let mut sorted: Vec<&str> = ids.into_iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let current = sorted.join("\n");

        let manifest = out.with_extension("ids");
        let previous = fs::read_to_string(&manifest).ok();
        if out.exists() && previous.as_deref() != Some(current.as_str()) {
            warn!(
                "Query IDs for {} changed since it was written; searching again",
                out.display()
            );
            fs::remove_file(out)
                .with_context(|| format!("Failed to remove stale results {}", out.display()))?;
        }
        fs::write(&manifest, current)
            .with_context(|| format!("Failed to write {}", manifest.display()))?;
        Ok(())
    }

    /// Build databases for subjects of requests that will actually run.
    fn prepare_databases(&self, requests: &[(Comparison, SearchRequest)]) -> Result<()> {
        let mut built: FxHashSet<&Path> = FxHashSet::default();
        for ((_, s), req) in requests {
            if !self.config.overwrite && req.out.exists() {
                continue;
            }
            if !built.insert(req.subject.as_path()) {
                continue;
            }
            info!("Building {} database for {}", self.kind(), self.tag(*s));
            self.runner
                .prepare_database(self.kind(), &req.subject, &req.database)?;
        }
        Ok(())
    }

    fn search_all(&self, requests: &[(Comparison, SearchRequest)]) -> Result<()> {
        self.prepare_databases(requests)?;
        let plain: Vec<SearchRequest> = requests.iter().map(|(_, r)| r.clone()).collect();
        run_searches(
            self.runner,
            &plain,
            self.config.processes,
            self.config.overwrite,
        )
    }

    /// Top hits for one comparison from its result file.
    fn select(
        &self,
        (q, s): Comparison,
        results: &Path,
        allowed: Option<&FxHashSet<String>>,
        lengths: &[LengthIndex],
    ) -> Result<TopHitMap> {
        let mut selector = TopHitSelector::new(&self.config.filters)
            .self_search(self.is_self_search((q, s)))
            .allowed_queries(allowed)
            .query_lengths(Some(&lengths[q]))
            .subject_lengths(Some(&lengths[s]))
            .with_ledger(self.config.ledger);
        let reader = HitReader::open(results)
            .with_context(|| format!("Failed to open search results {}", results.display()))?;
        selector.consume(reader)?;

        let (hits, ledger) = selector.finish();
        if let Some(ledger) = ledger {
            debug!("{} vs {}: ledger covers {} queries", self.tag(q), self.tag(s), ledger.len());
            write_ledger_file(&results.with_extension("ledger"), &ledger)?;
        }
        debug!("{} vs {}: {} queries with a top hit", self.tag(q), self.tag(s), hits.len());
        Ok(hits)
    }

    /// Collect residual subjects and run the second round for them, merging
    /// the new top hits into the existing maps. Returns the residual count.
    fn resolve_residuals(
        &self,
        comparisons: &[Comparison],
        top_hits: &mut FxHashMap<Comparison, TopHitMap>,
        lengths: &[LengthIndex],
    ) -> Result<usize> {
        let mut index = ResidualIndex::new();
        for &(q, s) in comparisons {
            let Some(subset) = &self.config.inputs[s].subset else {
                continue;
            };
            if let Some(forward) = top_hits.get(&(q, s)) {
                index.record(self.tag(s), residual_subjects(forward, subset));
            }
        }
        if index.is_empty() {
            info!("No residual hits to resolve");
            return Ok(0);
        }
        info!(
            "Resolving {} residual hits from {} inputs",
            index.total(),
            index.tags().len()
        );

        let n = self.config.inputs.len();
        let mut allowed: FxHashMap<usize, FxHashSet<String>> = FxHashMap::default();
        let mut requests = Vec::new();
        for s in 0..n {
            let Some(ids) = index.get(self.tag(s)) else {
                continue;
            };
            let fasta = self.write_residual_fasta(s, ids)?;
            allowed.insert(s, ids.iter().cloned().collect());
            for q in (0..n).filter(|&q| q != s) {
                let out = self.result_path((s, q), ".residual");
                self.check_query_ids(&out, ids)?;
                requests.push(((s, q), self.request(&fasta, q, out)));
            }
        }
        self.search_all(&requests)?;

        for ((s, q), req) in &requests {
            let extra = self.select((*s, *q), &req.out, allowed.get(s), lengths)?;
            let base = top_hits.entry((*s, *q)).or_default();
            let added = merge_top_hits(base, extra);
            debug!("{} vs {}: {} top hits added by residual round", self.tag(*s), self.tag(*q), added);
        }
        Ok(index.total())
    }

    fn write_residual_fasta(&self, idx: usize, ids: &BTreeSet<String>) -> Result<PathBuf> {
        let input = &self.config.inputs[idx];
        let dest = self.config.workdir.join(format!("{}.residual.fa", input.tag));
        sequence::write_subset_fasta(&input.path, ids, &dest)?;
        Ok(dest)
    }

    pub fn execute(&self) -> Result<PipelineOutput> {
        let config = self.config;
        fs::create_dir_all(&config.workdir)
            .with_context(|| format!("Failed to create {}", config.workdir.display()))?;

        let lengths: Vec<LengthIndex> = config
            .inputs
            .iter()
            .map(|input| sequence::read_lengths(&input.path))
            .collect::<Result<_>>()?;

        // Forward round: every input against every other input.
        let comparisons = self.comparisons();
        let query_fastas: Vec<PathBuf> = (0..config.inputs.len())
            .map(|i| self.query_fasta(i))
            .collect::<Result<_>>()?;
        let requests: Vec<(Comparison, SearchRequest)> = comparisons
            .iter()
            .map(|&(q, s)| {
                let round = if config.inputs[q].subset.is_some() { ".subset" } else { "" };
                let out = self.result_path((q, s), round);
                ((q, s), self.request(&query_fastas[q], s, out))
            })
            .collect();
        for ((q, _), req) in &requests {
            if let Some(subset) = &config.inputs[*q].subset {
                self.check_query_ids(&req.out, subset)?;
            }
        }
        self.search_all(&requests)?;

        let mut top_hits: FxHashMap<Comparison, TopHitMap> = FxHashMap::default();
        for (cmp, req) in &requests {
            let allowed = config.inputs[cmp.0].subset.as_ref();
            top_hits.insert(*cmp, self.select(*cmp, &req.out, allowed, &lengths)?);
        }

        let residuals = if config.has_subsets() {
            self.resolve_residuals(&comparisons, &mut top_hits, &lengths)?
        } else {
            0
        };

        // Reciprocal pairs per unordered input pair.
        let empty = TopHitMap::default();
        let mut pairs = Vec::new();
        let mut dropped = Vec::new();
        for i in 0..config.inputs.len() {
            for j in i + 1..config.inputs.len() {
                let found = find_reciprologs(
                    TaggedHits::new(self.tag(i), top_hits.get(&(i, j)).unwrap_or(&empty)),
                    TaggedHits::new(self.tag(j), top_hits.get(&(j, i)).unwrap_or(&empty)),
                );
                info!("{} vs {}: {} reciprocal pairs", self.tag(i), self.tag(j), found.len());
                if config.one_to_one {
                    let outcome = filter_one_to_one(&found);
                    if !outcome.dropped.is_empty() {
                        info!(
                            "{} vs {}: removed {} many-to-one pairs",
                            self.tag(i),
                            self.tag(j),
                            outcome.dropped.len()
                        );
                    }
                    pairs.extend(outcome.kept);
                    dropped.extend(outcome.dropped);
                } else {
                    pairs.extend(found);
                }
            }
        }

        let subsets = config.subset_index();
        let groups = if config.pairs_only {
            pairs.retain(|p| {
                let as_group = OrthoGroup::new(vec![p.members.0.clone(), p.members.1.clone()]);
                touches_subset(&as_group, &subsets)
            });
            Vec::new()
        } else {
            Aggregator::new(config.policy, config.strategy.build()).aggregate(&pairs, &subsets)
        };

        Ok(PipelineOutput {
            pairs,
            dropped,
            groups,
            residuals,
        })
    }
}

/// Write groups (or pairs) and the optional dropped-pair file.
pub fn write_results(config: &RunConfig, output: &PipelineOutput) -> Result<()> {
    let destination = config
        .out
        .as_ref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    let mut writer = open_output(config.out.as_deref())?;
    if config.pairs_only {
        write_pairs(&mut writer, &output.pairs)?;
        info!("{} reciprolog pairs written to {}", output.pairs.len(), destination);
    } else {
        write_groups(&mut writer, &output.groups)?;
        info!("{} groups written to {}", output.groups.len(), destination);
    }

    if let Some(path) = &config.dropped_out {
        let mut writer = open_output(Some(path))?;
        write_pairs(&mut writer, &output.dropped)?;
        info!("{} dropped pairs written to {}", output.dropped.len(), path.display());
    }
    Ok(())
}

pub fn run(kind: SearchKind, args: ReciprologArgs) -> Result<()> {
    let config = RunConfig::from_args(kind, &args)?;
    info!(
        "{} inputs, {} search, {} processes",
        config.inputs.len(),
        kind,
        config.processes
    );
    let runner = CommandRunner {
        extra_args: config.extra_args.clone(),
    };
    let output = Pipeline::new(&config, &runner).execute()?;
    write_results(&config, &output)
}
