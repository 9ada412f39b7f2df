//! Analyze command - extract fields from a single tender document.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use tendr_core::{Analyzer, ExtractionResult, Field, FieldValue, TenderAnalyzer};

use super::{emit, load_config, load_document};

/// Arguments for the analyze command.
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input file (PDF or text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Document type passed to the analyzer
    #[arg(long, default_value = "NIT")]
    doc_type: String,

    /// Show the compliance score after the output
    #[arg(long)]
    show_score: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV table of work items
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: AnalyzeArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Analyzing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message("Reading document...");

    let document = load_document(&args.input, &args.doc_type)?;

    pb.set_message("Extracting fields...");
    let analyzer = TenderAnalyzer::new().with_config(config);
    let result = analyzer.analyze(&document);

    pb.finish_and_clear();

    let output = format_result(&result, args.format)?;
    emit(&output, args.output.as_deref())?;

    if args.show_score {
        println!();
        println!(
            "{} Compliance score: {}/100",
            style("ℹ").blue(),
            result.compliance_score
        );
        println!(
            "{} Fields extracted: {}",
            style("ℹ").blue(),
            result.extracted_data.len()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "serial_number",
        "description",
        "quantity",
        "unit",
        "unit_price",
        "total_price",
    ])?;

    for item in result.extracted_data.work_items() {
        wtr.write_record([
            item.serial_number.as_str(),
            item.description.as_str(),
            item.quantity.as_str(),
            item.unit.as_str(),
            item.unit_price.as_deref().unwrap_or(""),
            item.total_price.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", result.summary));
    output.push_str(&format!("Compliance score: {}/100\n", result.compliance_score));
    output.push('\n');

    output.push_str("Key points:\n");
    for point in &result.key_points {
        output.push_str(&format!("  - {}\n", point));
    }

    if let Some(dates) = result.extracted_data.dates() {
        let assigned = dates.assigned();
        if !assigned.is_empty() {
            output.push_str("\nDates:\n");
            for (role, date) in assigned {
                output.push_str(&format!("  {:<24} {}\n", role.label(), date));
            }
        }
    }

    let items = result.extracted_data.work_items();
    if !items.is_empty() {
        output.push_str("\nWork items:\n");
        for item in items {
            output.push_str(&format!(
                "  {:>3}. {} ({}, {})\n",
                item.serial_number, item.description, item.quantity, item.unit
            ));
        }
    }

    let flags = result
        .extracted_data
        .get(Field::PolicyFlags)
        .map(FieldValue::strings)
        .unwrap_or_default();
    if !flags.is_empty() {
        output.push_str(&format!("\nPolicy: {}\n", flags.join(", ")));
    }

    for (label, entries) in [
        ("Missing clauses", &result.missing_clauses),
        ("Risk factors", &result.risk_factors),
    ] {
        if !entries.is_empty() {
            output.push_str(&format!("\n{}:\n", label));
            for entry in entries {
                output.push_str(&format!("  - {}\n", entry));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use tendr_core::{Document, analyze};

    const NOTICE: &str = "Enquiry Number: EAPH250035 Dated: 12.05.2025\n\
        Organisation Name: Northern Coalfields Limited\n\
        1\tRoof Bolts Grouting M20 x 1800M\t20 Nos\tPer No.\n";

    #[test]
    fn test_csv_lists_work_items() {
        let result = analyze(&Document::new(NOTICE, "NIT"));
        let csv = format_csv(&result).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("serial_number,description,quantity,unit,unit_price,total_price")
        );
        assert_eq!(lines.next(), Some("1,Roof Bolts Grouting M20 x 1800M,20 Nos,Per No.,,"));
    }

    #[test]
    fn test_text_has_key_points() {
        let result = analyze(&Document::new(NOTICE, "NIT"));
        let text = format_text(&result);
        assert!(text.contains("Key points:"));
        assert!(text.contains("Enquiry Number: EAPH250035"));
        assert!(text.contains("Roof Bolts Grouting"));
    }
}
