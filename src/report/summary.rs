//! Run summaries.
//!
//! Every invocation can leave a JSON record of what it did (`--summary`),
//! and prints a short human-readable recap when it finishes.

use crate::pipeline::StepOutcome;
use crate::steps::StepReport;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Record of one `dataprep` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub command: String,
    pub dataset: PathBuf,
    pub started_at: DateTime<Utc>,
    pub success: bool,
    /// Counters of an individual step run in this process.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepReport>,
    /// Outcomes of child processes when running the whole pipeline.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pipeline: Vec<StepOutcome>,
}

impl RunSummary {
    pub fn new(command: &str, dataset: &Path, started_at: DateTime<Utc>) -> Self {
        Self {
            command: command.to_string(),
            dataset: dataset.to_path_buf(),
            started_at,
            success: false,
            steps: Vec::new(),
            pipeline: Vec::new(),
        }
    }
}

/// Render a summary as pretty JSON.
pub fn generate_json_summary(summary: &RunSummary) -> Result<String> {
    serde_json::to_string_pretty(summary).map_err(Into::into)
}

/// Write a JSON summary to a file.
pub fn write_json_summary(summary: &RunSummary, path: &Path) -> Result<()> {
    let content = generate_json_summary(summary)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create summary file {}", path.display()))?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// One-paragraph console recap of a step.
pub fn format_step_report(report: &StepReport) -> String {
    let mut lines = vec![format!("📊 {} summary:", report.step)];
    let counters = [
        ("Folders visited", report.folders_visited),
        ("Files moved", report.files_moved),
        ("Files renamed", report.files_renamed),
        ("Folders renamed", report.folders_renamed),
        ("Files deleted", report.files_deleted),
        ("Files copied", report.files_copied),
        ("Skipped", report.skipped),
        ("Errors", report.errors),
    ];

    for (label, value) in counters {
        if value > 0 || label == "Errors" {
            lines.push(format!("   {}: {}", label, value));
        }
    }
    lines.push(format!("   Duration: {:.1}s", report.duration_seconds));

    lines.join("\n")
}
