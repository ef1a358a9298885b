//! Markdown and JSON report generation.
//!
//! Renders the analysis results into a Markdown validity report or a
//! JSON document. Numeric values are rounded here, at the presentation
//! boundary; the report structures themselves carry full precision.

use anyhow::Result;
use std::io::Write;
use std::path::Path;

use crate::models::{DimensionReport, Report, ReportMetadata, ValiditySummary, Verdict};

/// Presentation options for report rendering.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Decimal places for every numeric column.
    pub decimals: usize,
    /// Include the per-scale-value frequency columns.
    pub include_frequencies: bool,
    /// Include the flagged-items section.
    pub flag_items: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            decimals: 3,
            include_frequencies: true,
            flag_items: true,
        }
    }
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, options: &ReportOptions) -> String {
    let mut output = String::new();

    output.push_str("# Content Validity Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary, options));

    output.push_str("## Results by Dimension\n\n");
    for dimension in &report.dimensions {
        output.push_str(&generate_dimension_section(
            dimension,
            report.metadata.scale_points,
            options,
        ));
    }

    if options.flag_items {
        output.push_str(&generate_flagged_section(report, options));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Scale Points:** {}\n", metadata.scale_points));
    section.push_str(&format!(
        "- **Confidence Level:** {}\n",
        metadata.confidence
    ));
    section.push_str(&format!("- **Validity Cutoff:** {}\n", metadata.cutoff));
    section.push_str(&format!("- **Dimensions:** {}\n", metadata.dimensions));
    section.push_str(&format!("- **Items:** {}\n", metadata.total_items));
    section.push_str(&format!("- **Raters:** {}\n", metadata.raters));
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the summary section.
fn generate_summary_section(summary: &ValiditySummary, options: &ReportOptions) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    section.push_str("### Verdicts\n\n");
    section.push_str(&format!(
        "| {} Retain | {} Review | {} Discard | **Total** |\n",
        Verdict::Retain.emoji(),
        Verdict::Review.emoji(),
        Verdict::Discard.emoji(),
    ));
    section.push_str("|:---:|:---:|:---:|:---:|\n");
    section.push_str(&format!(
        "| {} | {} | {} | **{}** |\n\n",
        summary.retained, summary.review, summary.discarded, summary.total_items
    ));

    if !summary.by_dimension.is_empty() {
        section.push_str("### Dimensions\n\n");
        section.push_str("| Dimension | Items | Mean V | Min V | Max V |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");

        for dimension in &summary.by_dimension {
            section.push_str(&format!(
                "| {} | {} | {:.prec$} | {:.prec$} | {:.prec$} |\n",
                dimension.dimension,
                dimension.items,
                dimension.mean_v,
                dimension.min_v,
                dimension.max_v,
                prec = options.decimals
            ));
        }
        section.push('\n');
    }

    section
}

/// Generate the results table for one dimension.
fn generate_dimension_section(
    dimension: &DimensionReport,
    scale_points: u32,
    options: &ReportOptions,
) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", dimension.name));

    let mut header = String::from("| Item |");
    let mut divider = String::from("|:---|");
    if options.include_frequencies {
        for value in 1..=scale_points {
            header.push_str(&format!(" {} |", value));
            divider.push_str(":---:|");
        }
    }
    header.push_str(" Raters | Mean | V | Lower | Upper | Verdict |\n");
    divider.push_str(":---:|:---:|:---:|:---:|:---:|:---|\n");
    section.push_str(&header);
    section.push_str(&divider);

    for result in &dimension.results {
        let mut row = format!("| {} |", result.item);
        if options.include_frequencies {
            for count in &result.frequencies {
                row.push_str(&format!(" {} |", count));
            }
        }
        row.push_str(&format!(
            " {} | {:.prec$} | {:.prec$} | {:.prec$} | {:.prec$} | {} {} |\n",
            result.raters,
            result.mean,
            result.v,
            result.ci_lower,
            result.ci_upper,
            result.verdict.emoji(),
            result.verdict,
            prec = options.decimals
        ));
        section.push_str(&row);
    }
    section.push('\n');

    section
}

/// Generate the flagged-items section listing every non-retained item.
fn generate_flagged_section(report: &Report, options: &ReportOptions) -> String {
    let cutoff = report.metadata.cutoff;
    let mut lines = Vec::new();

    for dimension in &report.dimensions {
        for result in &dimension.results {
            match result.verdict {
                Verdict::Retain => {}
                Verdict::Review => lines.push(format!(
                    "- {} **{}** ({}): V = {:.prec$}, lower bound {:.prec$} under cutoff {}\n",
                    result.verdict.emoji(),
                    result.item,
                    dimension.name,
                    result.v,
                    result.ci_lower,
                    cutoff,
                    prec = options.decimals
                )),
                Verdict::Discard => lines.push(format!(
                    "- {} **{}** ({}): V = {:.prec$} under cutoff {}\n",
                    result.verdict.emoji(),
                    result.item,
                    dimension.name,
                    result.v,
                    cutoff,
                    prec = options.decimals
                )),
            }
        }
    }

    if lines.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Flagged Items\n\n");
    for line in lines {
        section.push_str(&line);
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by aikenv*\n");

    footer
}

/// Write the Markdown report to a file.
#[allow(dead_code)] // Alternative to writing via main
pub fn write_report(report: &Report, options: &ReportOptions, path: &Path) -> Result<()> {
    let content = generate_markdown_report(report, options);

    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Generate a JSON report with numerics rounded to the presentation
/// precision.
pub fn generate_json_report(report: &Report, decimals: usize) -> Result<String> {
    serde_json::to_string_pretty(&report.rounded(decimals)).map_err(Into::into)
}
