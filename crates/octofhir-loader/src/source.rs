//! NDJSON file discovery and opening.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bulk_data_file::BulkDataFile;
use crate::bundle_size::BundleSize;
use crate::error::Result;

const NDJSON_EXTENSION: &str = "ndjson";

/// Open an NDJSON file, labelled with its file name.
pub fn open_ndjson(path: &Path, bundle_size: BundleSize) -> Result<BulkDataFile<BufReader<File>>> {
    let file = File::open(path)?;
    Ok(BulkDataFile::new(
        BufReader::new(file),
        source_name(path),
        bundle_size,
    ))
}

/// Label used for a file in bundles and errors.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn is_ndjson(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NDJSON_EXTENSION))
}

/// NDJSON files directly inside `path`, sorted.
///
/// A file path is returned as-is, whatever its extension.
pub fn discover_ndjson_files(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_file() && is_ndjson(&entry_path) {
            files.push(entry_path);
        }
    }
    files.sort();

    tracing::debug!(dir = %path.display(), files = files.len(), "Discovered NDJSON files");
    Ok(files)
}

/// Output file name of the `index`-th bundle of a source, e.g. `Patient_0001.json`.
pub fn bundle_file_name(file_name: &str, index: usize) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name);
    format!("{stem}_{index:04}.json")
}
