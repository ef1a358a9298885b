//! aikenv - Content-Validity Analyzer
//!
//! A CLI tool that computes Aiken's V with confidence intervals for
//! every item of an expert-rated Likert-type instrument and generates
//! a validity report.
//!
//! Exit codes:
//!   0 - Success (no items below threshold, or no --fail-on set)
//!   1 - Runtime error (dataset, config, validation failure, etc.)
//!   2 - Items found at or below --fail-on verdict

mod aiken;
mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, FailOnVerdict, OutputFormat};
use config::Config;
use dataset::{Dataset, MissingPolicy};
use models::{Report, ReportMetadata, ValiditySummary, Verdict};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Initialize logging
    init_logging(&args);

    info!("aikenv v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the analysis
    match run_analysis(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .aikenv.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".aikenv.toml");

    if path.exists() {
        anyhow::bail!(".aikenv.toml already exists. Remove it first or edit it manually.");
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .aikenv.toml")?;

    println!("✅ Created .aikenv.toml with default settings.");
    println!("   Edit it to customize confidence, cutoff, decimals, and more.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete analysis workflow. Returns exit code (0 or 2).
fn run_analysis(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input = args
        .input
        .clone()
        .context("No input dataset given")?;

    // Step 1: Load and validate the dataset
    println!("📂 Loading dataset: {}", input.display());
    let dataset = Dataset::load(&input)?;
    info!(
        "Dataset: {} dimensions, {} items, {} rater rows, {}-point scale",
        dataset.dimensions.len(),
        dataset.total_items(),
        dataset.rater_rows(),
        dataset.scale.points
    );

    // Handle --dry-run: validate and list, then exit
    if args.dry_run {
        return handle_dry_run(&dataset);
    }

    // Step 2: Run the aggregation pass
    let missing = if config.dataset.allow_missing {
        MissingPolicy::Skip
    } else {
        MissingPolicy::Error
    };

    println!("\n🔬 Computing Aiken's V...");
    println!("   Scale points: {}", dataset.scale.points);
    println!("   Confidence: {}", config.analysis.confidence);
    println!("   Cutoff: {}", config.analysis.cutoff);
    if missing == MissingPolicy::Skip {
        println!("   Missing ratings: excluded from rater counts");
    }

    let options = analysis::AnalysisOptions {
        confidence: config.analysis.confidence,
        cutoff: config.analysis.cutoff,
        missing,
    };

    let dimensions = analysis::analyze(&dataset, &options)?;

    // Step 3: Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let summary = ValiditySummary::from_dimensions(&dimensions);

    let metadata = ReportMetadata {
        dataset: input.display().to_string(),
        analysis_date: Utc::now(),
        scale_points: dataset.scale.points,
        confidence: config.analysis.confidence,
        cutoff: config.analysis.cutoff,
        dimensions: dataset.dimensions.len(),
        total_items: dataset.total_items(),
        raters: dataset.rater_rows(),
        duration_seconds: duration,
    };

    let report = Report {
        metadata,
        dimensions,
        summary: summary.clone(),
    };

    // Step 4: Generate and save the report
    let report_options = report::ReportOptions {
        decimals: config.analysis.decimals,
        include_frequencies: config.report.include_frequencies,
        flag_items: config.report.flag_items,
    };

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.general.output));

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report, config.analysis.decimals)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &report_options),
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Validity Summary:");
    println!("   Items analyzed: {}", summary.total_items);
    println!(
        "   - ✅ Retain: {} | 🟡 Review: {} | ❌ Discard: {}",
        summary.retained, summary.review, summary.discarded
    );
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold = fail_on_to_verdict(fail_level);
        let has_flagged = report.all_results().any(|r| r.verdict <= threshold);

        if has_flagged {
            eprintln!(
                "\n⛔ Items at or below {:?} verdict found. Failing (exit code 2).",
                fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Handle --dry-run: list what would be analyzed, exit.
fn handle_dry_run(dataset: &Dataset) -> Result<i32> {
    println!("\n🔍 Dry run: dataset is valid (no analysis performed).\n");

    println!("   Scale: {} points", dataset.scale.points);
    for dimension in &dataset.dimensions {
        println!(
            "   📐 {} ({} items, {} raters)",
            dimension.name,
            dimension.items.len(),
            dimension.rater_rows()
        );
        println!("      {}", dimension.items.join(", "));
    }
    println!(
        "\n   Total: {} items across {} dimensions",
        dataset.total_items(),
        dataset.dimensions.len()
    );

    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Convert FailOnVerdict to Verdict for comparison.
fn fail_on_to_verdict(level: FailOnVerdict) -> Verdict {
    match level {
        FailOnVerdict::Discard => Verdict::Discard,
        FailOnVerdict::Review => Verdict::Review,
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .aikenv.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
