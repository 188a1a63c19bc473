//! Statistics over finished runs.

pub mod aggregator;

pub use aggregator::*;
