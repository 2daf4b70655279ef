//! The individual dataset transformations.
//!
//! Each step is a linear pass over directory listings. Failures on a single
//! file or folder are logged and counted in the [`StepReport`]; only
//! failures that make the whole step meaningless are returned as errors.

pub mod downsize;
pub mod map_names;
pub mod reduce;
pub mod reorganize;
pub mod underscore;

use crate::config::Config;
use crate::dataset::Dataset;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Instant;

/// Everything a step needs to run.
#[derive(Debug, Clone)]
pub struct StepContext {
    pub dataset: Dataset,
    pub config: Config,
    /// Whether to draw progress bars.
    pub show_progress: bool,
}

impl StepContext {
    pub fn new(config: Config, show_progress: bool) -> Self {
        Self {
            dataset: Dataset::new(config.general.dataset.clone()),
            config,
            show_progress,
        }
    }

    /// A progress bar of `len` items, or a hidden one in quiet mode.
    pub fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }
}

/// Counters collected while a step runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepReport {
    pub step: String,
    pub folders_visited: usize,
    pub files_moved: usize,
    pub files_renamed: usize,
    pub folders_renamed: usize,
    pub files_deleted: usize,
    pub files_copied: usize,
    pub skipped: usize,
    pub errors: usize,
    pub duration_seconds: f64,
}

impl StepReport {
    pub fn new(step: &str) -> Self {
        Self {
            step: step.to_string(),
            ..Default::default()
        }
    }

    /// Record the elapsed time since `start`.
    pub fn finish(mut self, start: Instant) -> Self {
        self.duration_seconds = start.elapsed().as_secs_f64();
        self
    }
}
