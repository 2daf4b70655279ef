//! Dataset layout: splits, class folders and image file names.
//!
//! A dataset is a root directory with one subdirectory per split, each of
//! which holds one folder per class. Image names encode `<ID>-<CLASS>.<ext>`.

pub mod names;

use crate::error::PrepError;
use anyhow::{Context, Result};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub use names::{extension, extract_class_label, has_extension, sample_id};

/// A top-level dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Validation,
    Test,
}

impl Split {
    /// All splits, in processing order.
    pub const ALL: [Split; 3] = [Split::Train, Split::Validation, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-split counts reported by `dataprep check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitStats {
    pub split: Split,
    pub classes: usize,
    pub images: usize,
}

/// Handle on a dataset root directory.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
}

impl Dataset {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn split_dir(&self, split: Split) -> PathBuf {
        self.root.join(split.as_str())
    }

    /// Verify that the root and every split directory exist.
    pub fn check_structure(&self) -> Result<(), PrepError> {
        if !self.root.exists() {
            return Err(PrepError::DatasetNotFound(self.root.clone()));
        }

        for split in Split::ALL {
            let path = self.split_dir(split);
            if !path.exists() {
                return Err(PrepError::MissingSplit {
                    split: split.as_str(),
                    path,
                });
            }
        }

        Ok(())
    }

    /// Count class folders and images (by extension) in every split.
    pub fn stats(&self, extensions: &[String]) -> Vec<SplitStats> {
        Split::ALL
            .into_iter()
            .map(|split| {
                let dir = self.split_dir(split);
                let classes = class_dirs(&dir).map(|c| c.len()).unwrap_or(0);
                let images = WalkDir::new(&dir)
                    .min_depth(2)
                    .max_depth(2)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| has_extension(&e.file_name().to_string_lossy(), extensions))
                    .count();
                SplitStats {
                    split,
                    classes,
                    images,
                }
            })
            .collect()
    }
}

/// Names of the immediate subdirectories of `dir`, sorted.
pub fn class_dirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries.flatten() {
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }

    names.sort();
    Ok(names)
}

/// Names of every entry (files and folders) directly inside `dir`, sorted.
pub fn entry_names(dir: &Path) -> Result<Vec<String>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut names: Vec<String> = entries
        .flatten()
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();

    names.sort();
    Ok(names)
}

/// Names of the regular files directly inside `dir` whose extension is in
/// `extensions` (case-insensitive), sorted.
pub fn files_with_extensions(dir: &Path, extensions: &[String]) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if entry.path().is_file() && has_extension(&name, extensions) {
            names.push(name);
        } else {
            debug!("Ignoring {}", entry.path().display());
        }
    }

    names.sort();
    Ok(names)
}
