//! Typed errors for dataset preprocessing.
//!
//! Most of the binary propagates `anyhow::Error`; these variants cover the
//! failures callers need to tell apart from plain I/O errors.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PrepError {
    #[error("Dataset directory not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Required directory {split} not found at {}", .path.display())]
    MissingSplit { split: &'static str, path: PathBuf },

    #[error("Target number must be a positive integer, got {0}")]
    InvalidTarget(i64),

    #[error("{failures} image(s) could not be copied out of {}, split left unchanged", .split.display())]
    CopyFailed { split: PathBuf, failures: usize },

    #[error("Step {step} exited with code {code:?}")]
    StepFailed { step: String, code: Option<i32> },

    #[error("Input closed before an answer was given")]
    PromptAborted,
}
