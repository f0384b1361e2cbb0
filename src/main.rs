use anyhow::Result;
use clap::{Parser, Subcommand};
use reciprologs::config::ReciprologArgs;
use reciprologs::pipeline;
use reciprologs::search::SearchKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reciprologs")]
#[command(version = "0.1.0")]
#[command(about = "Find reciprocal best hits between two or more sequence sets and group them", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Nucleotide inputs searched with blastn
    Blastn(ReciprologArgs),

    /// Protein inputs searched with blastp
    Blastp(ReciprologArgs),

    /// Nucleotide inputs searched with tblastx
    Tblastx(ReciprologArgs),

    /// Protein inputs searched with DIAMOND
    Diamond(ReciprologArgs),
}

impl Commands {
    fn into_parts(self) -> (SearchKind, ReciprologArgs) {
        match self {
            Commands::Blastn(args) => (SearchKind::Blastn, args),
            Commands::Blastp(args) => (SearchKind::Blastp, args),
            Commands::Tblastx(args) => (SearchKind::Tblastx, args),
            Commands::Diamond(args) => (SearchKind::Diamond, args),
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (kind, args) = cli.command.into_parts();
    init_logging(args.verbose);
    pipeline::run(kind, args)
}
