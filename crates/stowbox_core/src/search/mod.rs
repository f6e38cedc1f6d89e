//! Tag-overlap ranking of stored items.
//!
//! # Invariants
//! - Ranking is pure; candidate rows come from the repository.
//! - An empty query is reported as "no query", not as zero hits.

pub mod rank;
