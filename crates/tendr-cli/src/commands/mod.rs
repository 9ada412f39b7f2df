//! CLI command implementations.

pub mod analyze;
pub mod compare;
pub mod config;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use tendr_core::Document;
use tendr_core::models::config::TendrConfig;
use tendr_core::pdf;

/// Load the configuration named by `--config`, or the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TendrConfig> {
    match config_path {
        Some(path) => Ok(TendrConfig::from_file(Path::new(path))?),
        None => Ok(TendrConfig::default()),
    }
}

/// Read the text of a document file. PDFs go through the text layer;
/// everything else is read as UTF-8.
pub fn load_text(path: &Path) -> anyhow::Result<String> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension == "pdf" {
        let loaded = pdf::load_file(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        return Ok(loaded.text);
    }

    let data = fs::read(path)?;
    if pdf::is_pdf(&data) {
        let loaded = pdf::load_text(&data)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        info!("Read {} pages from {}", loaded.page_count, path.display());
        return Ok(loaded.text);
    }

    debug!("Reading {} as plain text", path.display());
    Ok(String::from_utf8_lossy(&data).into_owned())
}

/// Load a file as a [`Document`] of the given type.
pub fn load_document(path: &Path, doc_type: &str) -> anyhow::Result<Document> {
    let size = fs::metadata(path).map(|m| m.len()).ok();
    let text = load_text(path)?;
    let document = Document::new(text, doc_type);
    Ok(match size {
        Some(size) => document.with_size(size),
        None => document,
    })
}

/// Print `output`, or write it to `path` and say so.
pub fn emit(output: &str, path: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = path {
        fs::write(path, output)?;
        println!(
            "{} Output written to {}",
            console::style("✓").green(),
            path.display()
        );
    } else {
        println!("{}", output);
    }
    Ok(())
}
