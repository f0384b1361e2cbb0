//! Pairwise reciprolog detection: mutual best matches, residual rounds and
//! one-to-one filtering.

pub mod one_to_one;
pub mod reciprocal;
pub mod residual;

pub use one_to_one::{filter_one_to_one, OneToOneOutcome};
pub use reciprocal::{find_reciprologs, TaggedHits};
pub use residual::{merge_top_hits, residual_subjects, ResidualIndex};
