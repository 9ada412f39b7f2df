//! Compare command - screen several bids against each other.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use tendr_core::{ComparisonResult, TenderAnalyzer, VendorDocument};

use super::{emit, load_config, load_text};

/// Arguments for the compare command.
#[derive(Args)]
pub struct CompareArgs {
    /// Bid files or glob patterns (at least two documents)
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: CompareFormat,

    /// Skip unreadable files instead of failing
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum CompareFormat {
    /// JSON output
    Json,
    /// Plain text report
    Text,
}

pub async fn run(args: CompareArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let files = expand_inputs(&args.inputs)?;

    if files.len() < 2 {
        anyhow::bail!("At least two documents are needed for a comparison, found {}", files.len());
    }

    println!(
        "{} Comparing {} documents",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let labels = vendor_labels(&files);
    let mut documents = Vec::with_capacity(files.len());
    for (path, label) in files.iter().zip(labels) {
        pb.set_message(path.display().to_string());
        match load_text(path) {
            Ok(text) => documents.push(VendorDocument::new(label, text)),
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
        pb.inc(1);
    }
    pb.finish_with_message("Loaded");

    let result = TenderAnalyzer::new().with_config(config).compare(&documents);
    debug!(
        "{} similarities, {} red flags",
        result.similarities.len(),
        result.red_flags.len()
    );

    let output = match args.format {
        CompareFormat::Json => serde_json::to_string_pretty(&result)?,
        CompareFormat::Text => format_text(&result),
    };
    emit(&output, args.output.as_deref())?;

    Ok(())
}

/// Expand each input as a glob pattern; inputs matching nothing are taken
/// as literal paths so a missing file is reported by name. A file named by
/// several inputs is kept once, at its first position.
fn expand_inputs(inputs: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    for input in inputs {
        let mut matches: Vec<PathBuf> = glob(input)?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            matches.push(PathBuf::from(input));
        }
        for path in matches {
            let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                files.push(path);
            } else {
                debug!("Skipping repeated input {}", path.display());
            }
        }
    }
    Ok(files)
}

/// One label per file: the file stem, widened with parent directories
/// while two files would otherwise share a label.
fn vendor_labels(files: &[PathBuf]) -> Vec<String> {
    let mut depth = vec![0usize; files.len()];
    loop {
        let labels: Vec<String> = files
            .iter()
            .zip(&depth)
            .map(|(path, &depth)| vendor_label(path, depth))
            .collect();

        let mut widened = false;
        for i in 0..files.len() {
            let clashes = labels.iter().filter(|l| **l == labels[i]).count() > 1;
            if clashes && depth[i] < path_depth(&files[i]) {
                depth[i] += 1;
                widened = true;
            }
        }
        if !widened {
            return labels;
        }
    }
}

fn path_depth(path: &Path) -> usize {
    path.parent().map_or(0, |p| p.components().count())
}

/// The file stem, prefixed with `depth` parent directory names.
fn vendor_label(path: &Path, depth: usize) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("vendor")
        .to_string();

    let parents: Vec<String> = path
        .parent()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    let start = parents.len().saturating_sub(depth);

    let mut parts = parents[start..].to_vec();
    parts.push(stem);
    parts.join("/")
}

fn format_text(result: &ComparisonResult) -> String {
    let mut output = String::new();

    output.push_str("Vendor scores:\n");
    for (vendor, score) in &result.vendor_scores {
        output.push_str(&format!("  {:<24} {:>3}/100\n", vendor, score));
    }

    if !result.red_flags.is_empty() {
        output.push_str("\nRed flags:\n");
        for flag in &result.red_flags {
            output.push_str(&format!("  {}\n", flag));
        }
    }

    if !result.similarities.is_empty() {
        output.push_str("\nSimilarities:\n");
        for similarity in &result.similarities {
            output.push_str(&format!("  {}\n", similarity));
        }
    }

    output.push_str(&format!("\nRecommendation: {}\n", result.recommendation));
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vendor_label_is_file_stem() {
        let files = vec![PathBuf::from("bids/acme_infra.pdf"), PathBuf::from("bids/beta.txt")];
        assert_eq!(vendor_labels(&files), vec!["acme_infra", "beta"]);
    }

    #[test]
    fn test_same_stem_labels_use_directory() {
        let files = vec![
            PathBuf::from("round1/acme.pdf"),
            PathBuf::from("round2/acme.pdf"),
            PathBuf::from("round2/beta.pdf"),
        ];
        assert_eq!(vendor_labels(&files), vec!["round1/acme", "round2/acme", "beta"]);

        let files = vec![PathBuf::from("north/a/bid.txt"), PathBuf::from("south/a/bid.txt")];
        assert_eq!(vendor_labels(&files), vec!["north/a/bid", "south/a/bid"]);
    }

    #[test]
    fn test_unmatched_input_kept_literally() {
        let files = expand_inputs(&["no/such/bid.txt".to_string()]).unwrap();
        assert_eq!(files, vec![PathBuf::from("no/such/bid.txt")]);
    }

    #[test]
    fn test_repeated_inputs_kept_once() {
        let dir = tempfile::tempdir().unwrap();
        let alpha = dir.path().join("alpha.txt");
        let beta = dir.path().join("beta.txt");
        fs::write(&alpha, "alpha").unwrap();
        fs::write(&beta, "beta").unwrap();

        let pattern = dir.path().join("*.txt").display().to_string();
        let alpha_input = alpha.display().to_string();
        let files = expand_inputs(&[alpha_input.clone(), pattern, alpha_input]).unwrap();

        assert_eq!(files, vec![alpha, beta]);
    }
}
