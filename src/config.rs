//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.aikenv.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Analysis settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "aiken_report.md".to_string()
}

/// Statistical analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Nominal coverage of the confidence intervals, in (0, 1).
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Decimal places for report output.
    #[serde(default = "default_decimals")]
    pub decimals: usize,

    /// Validity cutoff for item classification.
    #[serde(default = "default_cutoff")]
    pub cutoff: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence: default_confidence(),
            decimals: default_decimals(),
            cutoff: default_cutoff(),
        }
    }
}

fn default_confidence() -> f64 {
    0.95
}

fn default_decimals() -> usize {
    3
}

fn default_cutoff() -> f64 {
    0.5
}

/// Dataset handling settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Exclude missing ratings from an item's rater count instead of
    /// failing the run.
    #[serde(default)]
    pub allow_missing: bool,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include the per-scale-value frequency columns.
    #[serde(default = "default_true")]
    pub include_frequencies: bool,

    /// Include the flagged-items section.
    #[serde(default = "default_true")]
    pub flag_items: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_frequencies: true,
            flag_items: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".aikenv.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(confidence) = args.confidence {
            self.analysis.confidence = confidence;
        }
        if let Some(decimals) = args.decimals {
            self.analysis.decimals = decimals;
        }
        if let Some(cutoff) = args.cutoff {
            self.analysis.cutoff = cutoff;
        }

        // Flags always override
        if args.allow_missing {
            self.dataset.allow_missing = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.analysis.confidence, 0.95);
        assert_eq!(config.analysis.decimals, 3);
        assert_eq!(config.analysis.cutoff, 0.5);
        assert_eq!(config.general.output, "aiken_report.md");
        assert!(!config.dataset.allow_missing);
        assert!(config.report.include_frequencies);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "validity.md"
verbose = true

[analysis]
confidence = 0.99
decimals = 2

[dataset]
allow_missing = true
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output, "validity.md");
        assert!(config.general.verbose);
        assert_eq!(config.analysis.confidence, 0.99);
        assert_eq!(config.analysis.decimals, 2);
        // Unset keys keep their defaults
        assert_eq!(config.analysis.cutoff, 0.5);
        assert!(config.dataset.allow_missing);
        assert!(config.report.flag_items);
    }

    #[test]
    fn test_merge_with_args_overrides() {
        let mut config = Config::default();
        let mut args = crate::cli::tests::make_args();
        args.confidence = Some(0.90);
        args.allow_missing = true;

        config.merge_with_args(&args);
        assert_eq!(config.analysis.confidence, 0.90);
        assert!(config.dataset.allow_missing);
        // Unprovided CLI values leave the config untouched
        assert_eq!(config.analysis.decimals, 3);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[dataset]"));
        assert!(toml_str.contains("[report]"));
    }
}
