//! Fetching the public learning-modality export.
//!
//! The body is streamed into a temporary file next to the destination and only moved into place
//! once the whole export has arrived, so a failed transfer never leaves a short CSV behind.

use std::fmt;
use std::io::{self, Read};

#[cfg(feature = "download")]
use std::io::{BufWriter, Write};
#[cfg(feature = "download")]
use std::path::Path;

#[cfg(feature = "download")]
use tempfile::NamedTempFile;

#[cfg(feature = "download")]
use crate::error::{IngestionError, IngestionResult};
use crate::report::format_percentage;

/// CSV export of the "School Learning Modalities" dataset on healthdata.gov.
pub const DEFAULT_DATASET_URL: &str =
    "https://healthdata.gov/api/views/a8v3-a3m3/rows.csv?accessType=DOWNLOAD";

const PROGRESS_STEP: u64 = 4 * 1024 * 1024;

/// How much of the export has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub received: u64,
    /// Announced `Content-Length`, if the server sent one.
    pub expected: Option<u64>,
}

impl fmt::Display for DownloadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mib = |bytes: u64| bytes as f64 / (1024.0 * 1024.0);
        match self.expected {
            Some(total) if total > 0 => write!(
                f,
                "{:.1} of {:.1} MiB ({})",
                mib(self.received),
                mib(total),
                format_percentage(self.received, total)
            ),
            _ => write!(f, "{:.1} MiB", mib(self.received)),
        }
    }
}

/// Stream `url` into `path`, returning the number of bytes written.
///
/// `on_progress` is called every few MiB and once more when the body ends. Requires the
/// `download` cargo feature. Fails with [`IngestionError::Truncated`] if the server announced a
/// length and the body ended short of it; `path` is left untouched on any failure.
#[cfg(feature = "download")]
#[tracing::instrument(skip(path, on_progress), fields(path = %path.as_ref().display()))]
pub fn download_dataset(
    url: &str,
    path: impl AsRef<Path>,
    on_progress: impl FnMut(DownloadProgress),
) -> IngestionResult<u64> {
    let client = reqwest::blocking::Client::builder().build()?;
    download_with(&client, url, path.as_ref(), on_progress)
}

#[cfg(feature = "download")]
fn download_with(
    client: &reqwest::blocking::Client,
    url: &str,
    path: &Path,
    on_progress: impl FnMut(DownloadProgress),
) -> IngestionResult<u64> {
    let response = client.get(url).send()?.error_for_status()?;
    let expected = response.content_length();
    tracing::info!(?expected, "download started");

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;

    let mut reader = ProgressReader::new(response, expected, on_progress);
    let written = {
        let mut out = BufWriter::new(staged.as_file_mut());
        let written = io::copy(&mut reader, &mut out)?;
        out.flush()?;
        written
    };

    if let Some(total) = expected.filter(|&total| total != 0 && total != written) {
        return Err(IngestionError::Truncated {
            received: written,
            expected: total,
        });
    }

    staged.persist(path).map_err(|e| e.error)?;
    tracing::info!(bytes = written, "download complete");
    Ok(written)
}

#[cfg_attr(not(feature = "download"), allow(dead_code))]
struct ProgressReader<R, F> {
    inner: R,
    expected: Option<u64>,
    read: u64,
    next_report: u64,
    finished: bool,
    on_progress: F,
}

#[cfg_attr(not(feature = "download"), allow(dead_code))]
impl<R: Read, F: FnMut(DownloadProgress)> ProgressReader<R, F> {
    fn new(inner: R, expected: Option<u64>, on_progress: F) -> Self {
        Self {
            inner,
            expected,
            read: 0,
            next_report: PROGRESS_STEP,
            finished: false,
            on_progress,
        }
    }

    fn report(&mut self) {
        let progress = DownloadProgress {
            received: self.read,
            expected: self.expected,
        };
        tracing::debug!(bytes = progress.received, expected = ?progress.expected, "downloading");
        (self.on_progress)(progress);
    }
}

impl<R: Read, F: FnMut(DownloadProgress)> Read for ProgressReader<R, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if n == 0 && !buf.is_empty() && !self.finished {
            self.finished = true;
            self.report();
        } else if self.read >= self.next_report {
            self.report();
            while self.next_report <= self.read {
                self.next_report += PROGRESS_STEP;
            }
        }
        Ok(n)
    }
}
