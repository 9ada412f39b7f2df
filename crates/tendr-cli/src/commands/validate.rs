//! Validate command - check a document for the mandatory clauses.

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use tendr_core::{ComplianceReport, TenderAnalyzer};

use super::{emit, load_config, load_document};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Document type passed to the analyzer
    #[arg(long, default_value = "Bid")]
    doc_type: String,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Exit with an error when a clause is missing
    #[arg(long)]
    strict: bool,
}

pub async fn run(args: ValidateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let document = load_document(&args.input, &args.doc_type)?;

    info!("Validating {}", args.input.display());
    let report = TenderAnalyzer::new()
        .with_config(config)
        .validate_compliance(&document);

    let output = if args.json {
        serde_json::to_string_pretty(&report)?
    } else {
        format_text(&report)
    };
    emit(&output, None)?;

    if args.strict && !report.compliant {
        anyhow::bail!("{} mandatory clause(s) missing", report.missing_clauses.len());
    }

    Ok(())
}

fn format_text(report: &ComplianceReport) -> String {
    let mut output = String::new();

    for clause in &report.present_clauses {
        output.push_str(&format!("{} {}\n", style("✓").green(), clause));
    }
    for clause in &report.missing_clauses {
        output.push_str(&format!("{} {} (missing)\n", style("✗").red(), clause));
    }

    let status = if report.compliant {
        style("compliant").green()
    } else {
        style("not compliant").yellow()
    };
    output.push_str(&format!("\nScore: {}/100, {}\n", report.score, status));
    output
}
