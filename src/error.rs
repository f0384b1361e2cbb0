//! Error taxonomy for the reciprolog core.
//!
//! Everything here is fatal for the run. Tie-break ambiguity and missing
//! length entries are resolved by policy in the selector and never surface
//! as errors.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReciprologError {
    /// A tabular record could not be parsed.
    #[error("{}:{line}: malformed hit record: {reason}", path.display())]
    MalformedHit {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// Inconsistent inputs, rejected before any search is started.
    #[error("configuration error: {0}")]
    Config(String),

    /// The external search program exited with a nonzero status.
    #[error("command `{command}` failed with {status}")]
    SearchFailed { command: String, status: ExitStatus },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReciprologError>;
