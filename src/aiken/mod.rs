//! Aiken's V estimation engine.
//!
//! This module provides the point estimator, the Wald-type confidence
//! interval, and the normal quantile routine they share.

pub mod estimator;
pub mod quantile;

pub use estimator::{aiken_v, confidence_interval, AikenError};
