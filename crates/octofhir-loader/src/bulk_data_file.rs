//! Streaming conversion of an NDJSON source into batch Bundles.
//!
//! A [`BulkDataFile`] owns its reader and hands out a single lazy cursor,
//! [`ResourceBundles`], which reads one page of at most `bundle_size` lines per
//! `next()` call and turns it into one [`ProcessedResource`]. Nothing is read
//! before the first pull, and no more than one page of lines is held at once.

use std::io::{self, BufRead};
use std::iter::FusedIterator;

use crate::bundle::{ProcessedResource, build_bundle};
use crate::bundle_size::BundleSize;
use crate::error::Result;

/// An NDJSON source labelled with its file name.
pub struct BulkDataFile<R> {
    bundles: ResourceBundles<R>,
}

impl<R: BufRead> BulkDataFile<R> {
    pub fn new(reader: R, file_name: impl Into<String>, bundle_size: BundleSize) -> Self {
        Self {
            bundles: ResourceBundles::new(reader, file_name.into(), bundle_size),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.bundles.file_name
    }

    pub fn bundle_size(&self) -> BundleSize {
        self.bundles.bundle_size
    }

    /// The bundles of this file.
    ///
    /// Every call returns the same cursor: bundles already pulled are not
    /// produced again, and once the source is exhausted the cursor stays empty.
    pub fn resources(&mut self) -> &mut ResourceBundles<R> {
        &mut self.bundles
    }

    pub fn into_resources(self) -> ResourceBundles<R> {
        self.bundles
    }
}

impl<R: BufRead> IntoIterator for BulkDataFile<R> {
    type Item = Result<ProcessedResource>;
    type IntoIter = ResourceBundles<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_resources()
    }
}

enum State<R> {
    /// Source still open; the next pull reads a page from it.
    Reading(R),
    /// Source dropped after end-of-stream or a failed page.
    Exhausted,
}

/// Lazy, single-pass sequence of batch Bundles read from an NDJSON source.
pub struct ResourceBundles<R> {
    file_name: String,
    bundle_size: BundleSize,
    state: State<R>,
    lines_read: u64,
    pages: usize,
}

impl<R: BufRead> ResourceBundles<R> {
    fn new(reader: R, file_name: String, bundle_size: BundleSize) -> Self {
        Self {
            file_name,
            bundle_size,
            state: State::Reading(reader),
            lines_read: 0,
            pages: 0,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Number of bundles produced so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.state, State::Exhausted)
    }

    fn next_page(&mut self) -> Result<Option<ProcessedResource>> {
        let State::Reading(reader) = &mut self.state else {
            return Ok(None);
        };

        if at_end(reader)? {
            self.finish();
            return Ok(None);
        }

        let page = read_page(reader, self.bundle_size.get(), &mut self.lines_read)?;
        let reached_end = at_end(reader)?;

        let processed = build_bundle(&page, &self.file_name)?;
        self.pages += 1;
        tracing::debug!(
            file = %self.file_name,
            page = self.pages,
            resources = processed.resource_count,
            "Built batch bundle"
        );

        if reached_end {
            self.finish();
        }
        Ok(Some(processed))
    }

    fn finish(&mut self) {
        if let State::Reading(_) = std::mem::replace(&mut self.state, State::Exhausted) {
            tracing::debug!(
                file = %self.file_name,
                lines = self.lines_read,
                pages = self.pages,
                "Finished reading NDJSON source"
            );
        }
    }
}

impl<R: BufRead> Iterator for ResourceBundles<R> {
    type Item = Result<ProcessedResource>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_page() {
            Ok(page) => page.map(Ok),
            Err(e) => {
                tracing::warn!(file = %self.file_name, error = %e, "Failed to convert page");
                self.finish();
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead> FusedIterator for ResourceBundles<R> {}

fn at_end<R: BufRead>(reader: &mut R) -> io::Result<bool> {
    Ok(reader.fill_buf()?.is_empty())
}

/// Read up to `size` lines, keeping the ones that look like JSON objects.
///
/// Discarded lines still use up a slot of the page.
fn read_page<R: BufRead>(reader: &mut R, size: usize, lines_read: &mut u64) -> io::Result<Vec<String>> {
    let mut page = Vec::new();
    let mut buf = Vec::new();

    for _ in 0..size {
        if at_end(reader)? {
            break;
        }
        buf.clear();
        read_line(reader, &mut buf)?;
        let line = std::str::from_utf8(&buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let line = if *lines_read == 0 {
            line.strip_prefix(BOM).unwrap_or(line)
        } else {
            line
        };
        *lines_read += 1;

        if is_resource_line(line) {
            page.push(line.to_string());
        } else {
            tracing::trace!(line = *lines_read, "Skipping non-object NDJSON line");
        }
    }

    Ok(page)
}

const BOM: char = '\u{FEFF}';

/// Read one line into `line` without its terminator.
///
/// `\n`, `\r\n` and a lone `\r` all end a line.
fn read_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<()> {
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(());
        }

        match available.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                let ending = available[i];
                line.extend_from_slice(&available[..i]);
                reader.consume(i + 1);
                if ending == b'\r' && reader.fill_buf()?.first() == Some(&b'\n') {
                    reader.consume(1);
                }
                return Ok(());
            }
            None => {
                let n = available.len();
                line.extend_from_slice(available);
                reader.consume(n);
            }
        }
    }
}

fn is_resource_line(line: &str) -> bool {
    line.trim_start().starts_with('{')
}
