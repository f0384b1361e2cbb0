pub mod common;
pub mod error;

pub mod hits;
pub mod pairing;
pub mod cluster;

pub mod config;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod sequence;
