//! Analysis modules.
//!
//! This module hosts the aggregation pass that turns a validated dataset
//! into per-item Aiken's V results.

pub mod aggregator;

pub use aggregator::*;
