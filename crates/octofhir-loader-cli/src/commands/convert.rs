use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use octofhir_loader::{BundleSize, LoaderConfig, bundle_file_name, discover_ndjson_files, open_ndjson, source_name};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::OutputFormat;
use crate::output::{print_rows, print_success};

/// Outcome of converting one NDJSON file.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file: String,
    pub bundles: usize,
    pub resources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(file: String) -> Self {
        Self {
            file,
            bundles: 0,
            resources: 0,
            error: None,
        }
    }
}

pub async fn convert(paths: &[PathBuf], config: &LoaderConfig, format: OutputFormat) -> Result<()> {
    let mut files = Vec::new();
    for path in paths {
        let found = discover_ndjson_files(path)
            .with_context(|| format!("Failed to read input: {}", path.display()))?;
        files.extend(found);
    }
    if files.is_empty() {
        anyhow::bail!("No NDJSON files found");
    }

    if let Some(dir) = &config.output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let reports = convert_all(files, config).await?;

    print_rows(
        &reports,
        &["File", "Bundles", "Resources", "Status"],
        |r| {
            vec![
                r.file.clone(),
                r.bundles.to_string(),
                r.resources.to_string(),
                match &r.error {
                    Some(e) => format!("{} {e}", "failed:".red()),
                    None => "ok".green().to_string(),
                },
            ]
        },
        format,
    )?;

    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed to convert", reports.len());
    }

    let bundles: usize = reports.iter().map(|r| r.bundles).sum();
    let resources: usize = reports.iter().map(|r| r.resources).sum();
    match &config.output_dir {
        Some(dir) => print_success(&format!(
            "Wrote {bundles} bundles ({resources} resources) to {}",
            dir.display().to_string().cyan()
        )),
        None => print_success(&format!(
            "Converted {resources} resources into {bundles} bundles"
        )),
    }
    Ok(())
}

/// Convert every file, at most `config.parallelism` at a time.
///
/// Each file gets its own bundler on a blocking thread; reports come back in
/// input order.
pub async fn convert_all(files: Vec<PathBuf>, config: &LoaderConfig) -> Result<Vec<FileReport>> {
    let semaphore = Arc::new(Semaphore::new(config.parallelism));
    let mut tasks = JoinSet::new();
    let total = files.len();

    for (index, path) in files.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore).acquire_owned().await?;
        let bundle_size = config.bundle_size;
        let output_dir = config.output_dir.clone();

        tasks.spawn_blocking(move || {
            let _permit = permit;
            (index, convert_file(&path, bundle_size, output_dir.as_deref()))
        });
    }

    let mut reports = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        reports.push(joined.context("Conversion task panicked")?);
    }
    reports.sort_by_key(|(index, _)| *index);

    Ok(reports.into_iter().map(|(_, report)| report).collect())
}

/// Bundle one file, writing each bundle to `output_dir` when given.
pub fn convert_file(path: &Path, bundle_size: BundleSize, output_dir: Option<&Path>) -> FileReport {
    let mut report = FileReport::new(source_name(path));

    if let Err(e) = write_bundles(path, bundle_size, output_dir, &mut report) {
        let msg = format!("{e:#}");
        tracing::error!(file = %report.file, error = %msg, "Conversion failed");
        report.error = Some(msg);
    }
    report
}

fn write_bundles(
    path: &Path,
    bundle_size: BundleSize,
    output_dir: Option<&Path>,
    report: &mut FileReport,
) -> Result<()> {
    let mut file = open_ndjson(path, bundle_size)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    for bundle in file.resources() {
        let bundle = bundle?;
        report.bundles += 1;
        report.resources += bundle.resource_count;

        if let Some(dir) = output_dir {
            let target = dir.join(bundle_file_name(&bundle.resource_file_name, report.bundles));
            fs::write(&target, &bundle.resource_text)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            tracing::debug!(file = %target.display(), resources = bundle.resource_count, "Wrote bundle");
        }
    }

    tracing::info!(
        file = %report.file,
        bundles = report.bundles,
        resources = report.resources,
        "Converted NDJSON file"
    );
    Ok(())
}
