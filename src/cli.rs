//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// aikenv - content-validity analyzer for Likert-type instruments
///
/// Compute Aiken's V with confidence intervals for every item of an
/// expert-rated instrument and generate a Markdown or JSON validity
/// report.
///
/// Examples:
///   aikenv --input ratings.json
///   aikenv --input ratings.json --confidence 0.99 --cutoff 0.7
///   aikenv --input ratings.toml --format json --output validity.json
///   aikenv --input ratings.json --dry-run
///   aikenv --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the rating dataset (.json or .toml)
    ///
    /// Wide form: one block per dimension, one ratings row per rater,
    /// one column per item. Not required when using --init-config.
    #[arg(short, long, value_name = "FILE", required_unless_present = "init_config")]
    pub input: Option<PathBuf>,

    /// Output file path for the report
    ///
    /// Defaults to aiken_report.md, or the value in .aikenv.toml.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Confidence level for the intervals, in (0, 1)
    ///
    /// Defaults to 0.95. Can also be set via .aikenv.toml.
    #[arg(long, value_name = "LEVEL", env = "AIKENV_CONFIDENCE")]
    pub confidence: Option<f64>,

    /// Decimal places for numeric report columns (1-10, default 3)
    #[arg(long, value_name = "N")]
    pub decimals: Option<usize>,

    /// Validity cutoff for item classification, in (0, 1]
    ///
    /// Items whose interval clears the cutoff are retained; items whose
    /// point estimate falls below it are discarded. Defaults to 0.5.
    #[arg(long, value_name = "V")]
    pub cutoff: Option<f64>,

    /// Exclude missing ratings from an item's rater count
    ///
    /// By default a missing rating fails the run, naming the offending
    /// dimension, item, and rater.
    #[arg(long)]
    pub allow_missing: bool,

    /// Fail if any item classifies at or below this verdict
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is hit.
    /// Values: discard, review
    #[arg(long, value_name = "VERDICT")]
    pub fail_on: Option<FailOnVerdict>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .aikenv.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dry run: load and validate the dataset without analyzing
    ///
    /// Lists dimensions, items, and rater counts, then exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .aikenv.toml configuration file
    #[arg(long)]
    pub init_config: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Verdict threshold for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FailOnVerdict {
    Discard,
    Review,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate the dataset path
        if let Some(ref input) = self.input {
            if !input.exists() {
                return Err(format!("Dataset file does not exist: {}", input.display()));
            }
            if !input.is_file() {
                return Err(format!("Dataset path is not a file: {}", input.display()));
            }
        }

        // Validate confidence range
        if let Some(confidence) = self.confidence {
            if confidence <= 0.0 || confidence >= 1.0 {
                return Err("Confidence level must be strictly between 0 and 1".to_string());
            }
        }

        // Validate decimals
        if let Some(decimals) = self.decimals {
            if !(1..=10).contains(&decimals) {
                return Err("Decimals must be between 1 and 10".to_string());
            }
        }

        // Validate cutoff range
        if let Some(cutoff) = self.cutoff {
            if cutoff <= 0.0 || cutoff > 1.0 {
                return Err("Cutoff must be in (0, 1]".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/fixtures/sample_ratings.json"
            ))),
            output: None,
            format: OutputFormat::Markdown,
            confidence: None,
            decimals: None,
            cutoff: None,
            allow_missing: false,
            fail_on: None,
            config: None,
            dry_run: false,
            init_config: false,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_missing_dataset() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/ratings.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_confidence_range() {
        let mut args = make_args();
        args.confidence = Some(1.0);
        assert!(args.validate().is_err());

        args.confidence = Some(0.0);
        assert!(args.validate().is_err());

        args.confidence = Some(0.9);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_cutoff_range() {
        let mut args = make_args();
        args.cutoff = Some(0.0);
        assert!(args.validate().is_err());

        args.cutoff = Some(1.0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.input = None;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
