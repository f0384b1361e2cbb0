//! Unit tests for hit handling

pub mod reader;
pub mod top_hit;
