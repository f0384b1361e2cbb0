use clap::Args;
use std::path::PathBuf;

/// Marker accepted by `--subset` for an unrestricted input.
pub const NO_SUBSET: &str = "-";

#[derive(Args, Debug, Clone)]
pub struct ReciprologArgs {
    /// FASTA inputs, two or more
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Group by transitive closure instead of requiring every member to be a
    /// reciprolog of every other member
    #[arg(long, default_value_t = false)]
    pub chain: bool,
    /// One file of query headers per input, in input order ("-" = whole input).
    /// Only listed sequences are used as queries for that input.
    #[arg(long, num_args = 1..)]
    pub subset: Vec<String>,
    /// Remove many-to-one relationships within each pairwise set
    #[arg(long, default_value_t = false)]
    pub one_to_one: bool,
    /// Write pairs removed by --one-to-one to this file
    #[arg(long, requires = "one_to_one")]
    pub dropped_out: Option<PathBuf>,
    /// Ignore hits whose query and subject IDs are identical
    #[arg(long, default_value_t = false)]
    pub ignore_same_id: bool,
    /// Ignore hits whose IDs share the same prefix before DELIM
    #[arg(long, value_name = "DELIM")]
    pub ignore_same_prefix: Option<String>,
    /// Minimum percent of the query covered by the alignment
    #[arg(long)]
    pub query_coverage: Option<f64>,
    /// Write a ledger of winning and losing subjects per comparison
    #[arg(long, default_value_t = false)]
    pub ledger: bool,
    /// Write pairwise reciprologs with scores instead of groups
    #[arg(long, default_value_t = false)]
    pub pairs: bool,
    /// Use the exhaustive grouping implementation even when graph support is
    /// available
    #[arg(long, default_value_t = false)]
    pub brute_force: bool,
    /// Directory for databases, subset files, search results and ledgers
    #[arg(long, default_value = "reciprologs_work")]
    pub workdir: PathBuf,
    /// Re-run searches even when result files exist
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,
    /// Concurrent search processes (0 = number of CPUs)
    #[arg(short = 'p', long, default_value_t = 0)]
    pub processes: usize,
    /// Threads per search process
    #[arg(short = 'n', long, default_value_t = 1)]
    pub num_threads: usize,
    /// Extra arguments passed to the search program, e.g. "-evalue 1e-5"
    #[arg(long, allow_hyphen_values = true)]
    pub extra_args: Option<String>,
    #[arg(long, short = 'v', default_value_t = false)]
    pub verbose: bool,
}
