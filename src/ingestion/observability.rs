//! Load observers.
//!
//! [`ingest_from_path`](super::ingest_from_path) reports each load to an [`IngestionObserver`].
//! The CLI always attaches a [`TracingObserver`] and, with `--ingest-log`, a [`FileObserver`]
//! behind a [`CompositeObserver`].

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::IngestionError;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (load failed on bad content).
    Error,
    /// Critical error (I/O and other infrastructure failures).
    Critical,
}

/// Context about a load attempt.
#[derive(Debug, Clone)]
pub struct IngestionContext {
    /// The input path used for ingestion.
    pub path: PathBuf,
}

/// Stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Number of ingested rows.
    pub rows: usize,
    /// Number of distinct reporting weeks.
    pub weeks: usize,
}

/// Observer interface for load outcomes.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Forwards every callback to each wrapped observer, in the order they were added.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    pub fn with(mut self, observer: Arc<dyn IngestionObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.observers.iter().for_each(|o| o.on_success(ctx, stats));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_failure(ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.observers.iter().for_each(|o| o.on_alert(ctx, severity, error));
    }
}

/// Emits load events as structured `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            path = %ctx.path.display(),
            rows = stats.rows,
            weeks = stats.weeks,
            "dataset loaded"
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::warn!(path = %ctx.path.display(), ?severity, %error, "dataset load failed");
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(path = %ctx.path.display(), ?severity, %error, "dataset load alert");
    }
}

/// One line of the ingest log.
#[derive(Debug, Serialize)]
struct LoadRecord {
    at: DateTime<Utc>,
    event: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    weeks: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<IngestionSeverity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl LoadRecord {
    fn new(event: &'static str, ctx: &IngestionContext) -> Self {
        Self {
            at: Utc::now(),
            event,
            path: ctx.path.display().to_string(),
            rows: None,
            weeks: None,
            severity: None,
            error: None,
        }
    }

    fn failed(event: &'static str, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) -> Self {
        Self {
            severity: Some(severity),
            error: Some(error.to_string()),
            ..Self::new(event, ctx)
        }
    }
}

/// Appends load events to a file as JSON lines (`loaded`, `failed`, `alert`).
///
/// Write failures are logged through `tracing` and otherwise ignored; a broken log never fails
/// a load.
#[derive(Debug)]
pub struct FileObserver {
    file: Mutex<File>,
}

impl FileObserver {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    fn append(&self, record: &LoadRecord) {
        let mut line = match serde_json::to_vec(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "could not encode ingest log record");
                return;
            }
        };
        line.push(b'\n');

        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(e) = file.write_all(&line) {
            tracing::warn!(error = %e, "could not write ingest log");
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append(&LoadRecord {
            rows: Some(stats.rows),
            weeks: Some(stats.weeks),
            ..LoadRecord::new("loaded", ctx)
        });
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append(&LoadRecord::failed("failed", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append(&LoadRecord::failed("alert", ctx, severity, error));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_omits_failure_fields() {
        let ctx = IngestionContext {
            path: PathBuf::from("data.csv"),
        };
        let record = LoadRecord {
            rows: Some(10),
            weeks: Some(2),
            ..LoadRecord::new("loaded", &ctx)
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "loaded");
        assert_eq!(json["path"], "data.csv");
        assert_eq!(json["rows"], 10);
        assert!(json.get("severity").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn failure_record_carries_severity_and_message() {
        let ctx = IngestionContext {
            path: PathBuf::from("data.csv"),
        };
        let err = IngestionError::SchemaMismatch {
            message: "missing column".to_string(),
        };
        let json = serde_json::to_value(LoadRecord::failed("failed", &ctx, IngestionSeverity::Error, &err)).unwrap();
        assert_eq!(json["severity"], "error");
        assert_eq!(json["error"], "schema mismatch: missing column");
        assert!(json.get("rows").is_none());
    }
}
