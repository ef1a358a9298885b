//! Data models for the content-validity analyzer.
//!
//! This module contains the core data structures used throughout the
//! application for representing per-item results, dimension groups, and
//! the final report.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an item against the validity cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// The point estimate itself falls below the cutoff.
    Discard,
    /// The point estimate clears the cutoff but its lower bound does not.
    Review,
    /// The whole confidence interval clears the cutoff.
    Retain,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Discard => write!(f, "Discard"),
            Verdict::Review => write!(f, "Review"),
            Verdict::Retain => write!(f, "Retain"),
        }
    }
}

impl Verdict {
    /// Returns an emoji representation of the verdict.
    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::Discard => "❌",
            Verdict::Review => "🟡",
            Verdict::Retain => "✅",
        }
    }

    /// Classify an item from its point estimate and lower bound.
    pub fn classify(v: f64, ci_lower: f64, cutoff: f64) -> Self {
        if v < cutoff {
            Verdict::Discard
        } else if ci_lower < cutoff {
            Verdict::Review
        } else {
            Verdict::Retain
        }
    }
}

/// Per-item result of the Aiken's V aggregation pass.
///
/// All numeric fields carry full floating-point precision; rounding
/// happens only when a report is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AikenResult {
    /// Item code (e.g. "CT1").
    pub item: String,
    /// Frequency of each scale value 1..=k, in ascending order. Values
    /// with zero occurrences are present as 0, never omitted.
    pub frequencies: Vec<u64>,
    /// Number of raters that contributed to this item.
    pub raters: usize,
    /// Arithmetic mean of the item's ratings.
    pub mean: f64,
    /// Aiken's V point estimate.
    pub v: f64,
    /// Lower confidence bound.
    pub ci_lower: f64,
    /// Upper confidence bound.
    pub ci_upper: f64,
    /// Classification against the validity cutoff.
    pub verdict: Verdict,
}

/// Results for all items of one dimension, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionReport {
    /// Dimension label (e.g. "relevance").
    pub name: String,
    /// One result per item.
    pub results: Vec<AikenResult>,
}

impl DimensionReport {
    /// Mean of the dimension's V estimates.
    pub fn mean_v(&self) -> f64 {
        if self.results.is_empty() {
            return 0.0;
        }
        self.results.iter().map(|r| r.v).sum::<f64>() / self.results.len() as f64
    }

    /// Smallest V estimate in the dimension.
    pub fn min_v(&self) -> f64 {
        self.results.iter().map(|r| r.v).fold(f64::INFINITY, f64::min)
    }

    /// Largest V estimate in the dimension.
    pub fn max_v(&self) -> f64 {
        self.results.iter().map(|r| r.v).fold(f64::NEG_INFINITY, f64::max)
    }

    /// Number of items with the given verdict.
    pub fn verdict_count(&self, verdict: Verdict) -> usize {
        self.results.iter().filter(|r| r.verdict == verdict).count()
    }
}

/// Per-dimension summary row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionSummary {
    /// Dimension label.
    pub dimension: String,
    /// Item count.
    pub items: usize,
    /// Mean V across the dimension's items.
    pub mean_v: f64,
    /// Smallest V in the dimension.
    pub min_v: f64,
    /// Largest V in the dimension.
    pub max_v: f64,
}

/// Summary of verdicts and V statistics across the whole analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValiditySummary {
    /// Total number of items.
    pub total_items: usize,
    /// Items classified Retain.
    pub retained: usize,
    /// Items classified Review.
    pub review: usize,
    /// Items classified Discard.
    pub discarded: usize,
    /// Per-dimension statistics, in declaration order.
    pub by_dimension: Vec<DimensionSummary>,
}

impl ValiditySummary {
    /// Build a summary from the per-dimension results.
    pub fn from_dimensions(dimensions: &[DimensionReport]) -> Self {
        let mut summary = Self::default();

        for dimension in dimensions {
            summary.total_items += dimension.results.len();
            summary.retained += dimension.verdict_count(Verdict::Retain);
            summary.review += dimension.verdict_count(Verdict::Review);
            summary.discarded += dimension.verdict_count(Verdict::Discard);

            summary.by_dimension.push(DimensionSummary {
                dimension: dimension.name.clone(),
                items: dimension.results.len(),
                mean_v: dimension.mean_v(),
                min_v: dimension.min_v(),
                max_v: dimension.max_v(),
            });
        }

        summary
    }
}

/// Metadata about the analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Path of the analyzed dataset.
    pub dataset: String,
    /// Date and time of the analysis.
    pub analysis_date: DateTime<Utc>,
    /// Number of scale categories (k).
    pub scale_points: u32,
    /// Nominal coverage of the confidence intervals.
    pub confidence: f64,
    /// Validity cutoff used for classification.
    pub cutoff: f64,
    /// Number of dimensions.
    pub dimensions: usize,
    /// Total number of items.
    pub total_items: usize,
    /// Largest rater row count across dimensions.
    pub raters: usize,
    /// Duration of the analysis in seconds.
    pub duration_seconds: f64,
}

/// The complete content-validity report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Metadata about the run.
    pub metadata: ReportMetadata,
    /// Per-dimension results, in declaration order.
    pub dimensions: Vec<DimensionReport>,
    /// Verdict and V statistics.
    pub summary: ValiditySummary,
}

impl Report {
    /// A copy of the report with every numeric result rounded to
    /// `decimals` places, for presentation output. The original keeps
    /// full precision.
    pub fn rounded(&self, decimals: usize) -> Report {
        let mut report = self.clone();

        for dimension in &mut report.dimensions {
            for result in &mut dimension.results {
                result.mean = round_to(result.mean, decimals);
                result.v = round_to(result.v, decimals);
                result.ci_lower = round_to(result.ci_lower, decimals);
                result.ci_upper = round_to(result.ci_upper, decimals);
            }
        }
        for dimension in &mut report.summary.by_dimension {
            dimension.mean_v = round_to(dimension.mean_v, decimals);
            dimension.min_v = round_to(dimension.min_v, decimals);
            dimension.max_v = round_to(dimension.max_v, decimals);
        }

        report
    }

    /// All results across dimensions, in report order.
    pub fn all_results(&self) -> impl Iterator<Item = &AikenResult> {
        self.dimensions.iter().flat_map(|d| d.results.iter())
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
