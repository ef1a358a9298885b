//! Wide-form rating dataset loading and validation.
//!
//! A dataset carries one block per dimension. Each block declares its
//! items in presentation order and holds one ratings row per expert
//! rater, aligned column-by-column with the item list. Rater identity is
//! row position.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Structural validation failure in a loaded dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    /// The ordinal scale declares fewer than two points.
    #[error("scale must have at least 2 points, got {points}")]
    TooFewScalePoints { points: u32 },

    /// The dataset declares no dimensions.
    #[error("dataset has no dimensions")]
    NoDimensions,

    /// A dimension declares no items.
    #[error("dimension '{dimension}' has no items")]
    NoItems { dimension: String },

    /// A dimension has no rater rows.
    #[error("dimension '{dimension}' has no rater rows")]
    NoRaterRows { dimension: String },

    /// A rater row's width disagrees with the dimension's item count.
    #[error("dimension '{dimension}': rater row {row} has {found} ratings, expected {expected}")]
    RaggedRow {
        dimension: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    /// An item code appears twice within one dimension.
    #[error("dimension '{dimension}': duplicate item code '{item}'")]
    DuplicateItem { dimension: String, item: String },

    /// A rating cell is missing and the policy forbids that.
    #[error("dimension '{dimension}', item '{item}': missing rating from rater {rater}")]
    MissingRating {
        dimension: String,
        item: String,
        rater: usize,
    },
}

/// How the analysis treats missing rating cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Any missing rating fails the run, naming the offending cell.
    #[default]
    Error,
    /// Missing ratings are dropped from that item's rater count.
    Skip,
}

/// The ordinal scale shared by every dimension in a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scale {
    /// Number of discrete rating levels (k).
    pub points: u32,
}

/// One dimension block: its items and the per-rater rating rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionBlock {
    /// Dimension label (e.g. "relevance").
    pub name: String,
    /// Item codes in presentation order.
    pub items: Vec<String>,
    /// One row per rater; row width matches `items`. A `null` cell marks
    /// a rating the expert did not provide.
    pub ratings: Vec<Vec<Option<u32>>>,
}

impl DimensionBlock {
    /// Number of rater rows in this dimension.
    pub fn rater_rows(&self) -> usize {
        self.ratings.len()
    }

    /// The ratings column for the item at `index`, one cell per rater.
    pub fn item_column(&self, index: usize) -> Vec<Option<u32>> {
        self.ratings
            .iter()
            .map(|row| row.get(index).copied().flatten())
            .collect()
    }
}

/// A complete wide-form dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// The rating scale.
    pub scale: Scale,
    /// Dimension blocks in declaration order.
    pub dimensions: Vec<DimensionBlock>,
}

impl Dataset {
    /// Load and validate a dataset from a `.json` or `.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        let dataset = match extension.as_str() {
            "json" => Self::from_json(&content)
                .with_context(|| format!("Failed to parse dataset: {}", path.display()))?,
            "toml" => Self::from_toml(&content)
                .with_context(|| format!("Failed to parse dataset: {}", path.display()))?,
            other => {
                anyhow::bail!(
                    "Unsupported dataset format '{}' (expected .json or .toml): {}",
                    other,
                    path.display()
                );
            }
        };

        dataset.validate()?;
        debug!(
            "Loaded dataset: {} dimensions, {} items, {} rater rows",
            dataset.dimensions.len(),
            dataset.total_items(),
            dataset.rater_rows()
        );

        Ok(dataset)
    }

    /// Parse a dataset from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(Into::into)
    }

    /// Parse a dataset from TOML text. TOML cannot express a missing
    /// cell, so TOML datasets are complete by construction.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Into::into)
    }

    /// Check the dataset's structure: scale range, non-empty dimensions,
    /// rectangular rating rows, unique item codes.
    ///
    /// Rating values themselves are checked by the estimator, and missing
    /// cells are judged by the aggregation pass, where the policy applies.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.scale.points < 2 {
            return Err(DatasetError::TooFewScalePoints {
                points: self.scale.points,
            });
        }
        if self.dimensions.is_empty() {
            return Err(DatasetError::NoDimensions);
        }

        for dimension in &self.dimensions {
            if dimension.items.is_empty() {
                return Err(DatasetError::NoItems {
                    dimension: dimension.name.clone(),
                });
            }
            if dimension.ratings.is_empty() {
                return Err(DatasetError::NoRaterRows {
                    dimension: dimension.name.clone(),
                });
            }

            for (index, row) in dimension.ratings.iter().enumerate() {
                if row.len() != dimension.items.len() {
                    return Err(DatasetError::RaggedRow {
                        dimension: dimension.name.clone(),
                        row: index + 1,
                        expected: dimension.items.len(),
                        found: row.len(),
                    });
                }
            }

            let mut seen = HashSet::new();
            for item in &dimension.items {
                if !seen.insert(item.as_str()) {
                    return Err(DatasetError::DuplicateItem {
                        dimension: dimension.name.clone(),
                        item: item.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Total item count across all dimensions.
    pub fn total_items(&self) -> usize {
        self.dimensions.iter().map(|d| d.items.len()).sum()
    }

    /// Largest rater row count across dimensions.
    pub fn rater_rows(&self) -> usize {
        self.dimensions
            .iter()
            .map(DimensionBlock::rater_rows)
            .max()
            .unwrap_or(0)
    }
}
