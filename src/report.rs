//! JSON run report
//!
//! Written by `cooper run --report <path>` for CI artifacts.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::SystemTime;
use thiserror::Error;
use tracing::info;

use crate::runner::RunSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Report file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// RFC 3339 timestamp of when the report was produced
    pub generated_at: String,
    pub version: String,
    pub cases_passed: usize,
    pub cases_total: usize,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl Report {
    pub fn new(summary: RunSummary) -> Self {
        let (cases_passed, cases_total) = summary.case_counts();
        Self {
            generated_at: humantime::format_rfc3339_seconds(SystemTime::now()).to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            cases_passed,
            cases_total,
            summary,
        }
    }

    /// Write as pretty JSON, creating or truncating `path`
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), ReportError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        info!(path = %path.display(), "Report written");
        Ok(())
    }
}
