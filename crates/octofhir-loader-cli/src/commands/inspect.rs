use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_loader::{BundleSize, open_ndjson};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::output::print_rows;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleSummary {
    pub index: usize,
    pub resource_count: usize,
    pub bytes: usize,
}

pub fn summarize(path: &Path, bundle_size: BundleSize) -> Result<Vec<BundleSummary>> {
    let mut file = open_ndjson(path, bundle_size)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    file.resources()
        .enumerate()
        .map(|(i, bundle)| -> Result<BundleSummary> {
            let bundle = bundle?;
            Ok(BundleSummary {
                index: i + 1,
                resource_count: bundle.resource_count,
                bytes: bundle.resource_text.len(),
            })
        })
        .collect()
}

pub fn inspect(path: &Path, bundle_size: BundleSize, format: OutputFormat) -> Result<()> {
    let summaries = summarize(path, bundle_size)?;

    print_rows(
        &summaries,
        &["Bundle", "Resources", "Bytes"],
        |s| {
            vec![
                s.index.to_string(),
                s.resource_count.to_string(),
                s.bytes.to_string(),
            ]
        },
        format,
    )?;

    if matches!(format, OutputFormat::Table) {
        let total: usize = summaries.iter().map(|s| s.resource_count).sum();
        println!(
            "{}: {} bundles, {} resources (bundle size {})",
            "Total".cyan(),
            summaries.len(),
            total,
            bundle_size
        );
    }
    Ok(())
}
