//! The Aiken's V aggregation pass.
//!
//! Walks every (dimension, item) group of a dataset in declaration order
//! and produces one result row per group: rater count, mean, V, interval
//! bounds, scale-value frequencies, and the verdict. The first group that
//! violates a precondition aborts the whole pass with an error naming the
//! dimension, the item, and the violated rule.

use anyhow::{Context, Result};
use tracing::debug;

use crate::aiken::{aiken_v, confidence_interval};
use crate::dataset::{Dataset, DatasetError, DimensionBlock, MissingPolicy};
use crate::models::{AikenResult, DimensionReport, Verdict};

/// Run-level parameters of the aggregation pass.
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    /// Nominal coverage of the confidence intervals, in (0, 1).
    pub confidence: f64,
    /// Validity cutoff for item classification.
    pub cutoff: f64,
    /// Missing-rating policy.
    pub missing: MissingPolicy,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            confidence: 0.95,
            cutoff: 0.5,
            missing: MissingPolicy::Error,
        }
    }
}

/// Analyze every (dimension, item) group of the dataset.
///
/// Output order follows the dataset's declaration order for dimensions
/// and items, never an intermediate map's traversal order.
pub fn analyze(dataset: &Dataset, options: &AnalysisOptions) -> Result<Vec<DimensionReport>> {
    let k = dataset.scale.points;
    let mut reports = Vec::with_capacity(dataset.dimensions.len());

    for dimension in &dataset.dimensions {
        let mut results = Vec::with_capacity(dimension.items.len());

        for (index, item) in dimension.items.iter().enumerate() {
            let result = item_result(dimension, index, k, options).with_context(|| {
                format!("item '{}' in dimension '{}'", item, dimension.name)
            })?;
            results.push(result);
        }

        debug!(
            "Analyzed dimension '{}': {} items",
            dimension.name,
            results.len()
        );
        reports.push(DimensionReport {
            name: dimension.name.clone(),
            results,
        });
    }

    Ok(reports)
}

/// Compute the result row for a single item column.
fn item_result(
    dimension: &DimensionBlock,
    index: usize,
    k: u32,
    options: &AnalysisOptions,
) -> Result<AikenResult> {
    let values = collect_ratings(dimension, index, options.missing)?;

    let v = aiken_v(&values, k)?;
    let (ci_lower, ci_upper) = confidence_interval(v, values.len(), k, options.confidence)?;

    let mean = values.iter().map(|&r| f64::from(r)).sum::<f64>() / values.len() as f64;

    Ok(AikenResult {
        item: dimension.items[index].clone(),
        frequencies: frequencies(&values, k),
        raters: values.len(),
        mean,
        v,
        ci_lower,
        ci_upper,
        verdict: Verdict::classify(v, ci_lower, options.cutoff),
    })
}

/// Gather the ratings for one item, applying the missing-rating policy.
fn collect_ratings(
    dimension: &DimensionBlock,
    index: usize,
    policy: MissingPolicy,
) -> Result<Vec<u32>, DatasetError> {
    let column = dimension.item_column(index);

    if policy == MissingPolicy::Error {
        if let Some(row) = column.iter().position(Option::is_none) {
            return Err(DatasetError::MissingRating {
                dimension: dimension.name.clone(),
                item: dimension.items[index].clone(),
                rater: row + 1,
            });
        }
    }

    Ok(column.into_iter().flatten().collect())
}

/// Count the occurrences of each scale value 1..=k.
///
/// Values with zero occurrences are present as 0, never omitted, so the
/// counts always sum to the rater count.
pub fn frequencies(values: &[u32], k: u32) -> Vec<u64> {
    let mut counts = vec![0u64; k as usize];
    for &value in values {
        if (1..=k).contains(&value) {
            counts[(value - 1) as usize] += 1;
        }
    }
    counts
}
