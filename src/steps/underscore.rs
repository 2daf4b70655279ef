//! Replace underscores with dashes in class folder names.

use super::{StepContext, StepReport};
use crate::dataset::{class_dirs, Split};
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

pub const NAME: &str = "underscore-to-dash";

/// The dashed name for `folder`, or `None` if it should be left alone.
pub fn dashed_name(folder: &str, exceptions: &[String]) -> Option<String> {
    if !folder.contains('_') || exceptions.iter().any(|e| folder.contains(e.as_str())) {
        return None;
    }
    Some(folder.replace('_', "-"))
}

/// First of `name`, `name_1`, `name_2`, ... that does not exist in `parent`.
pub fn free_name(parent: &Path, name: &str) -> String {
    if !parent.join(name).exists() {
        return name.to_string();
    }

    let mut counter = 1;
    loop {
        let candidate = format!("{}_{}", name, counter);
        if !parent.join(&candidate).exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Run the underscore normalisation over every split.
pub fn run(ctx: &StepContext) -> Result<StepReport> {
    let start = Instant::now();
    let mut report = StepReport::new(NAME);
    let exceptions = &ctx.config.underscore.exceptions;

    for split in Split::ALL {
        let parent = ctx.dataset.split_dir(split);
        if !parent.exists() {
            warn!("Directory not found: {}", parent.display());
            continue;
        }

        for folder in class_dirs(&parent)? {
            report.folders_visited += 1;

            let Some(dashed) = dashed_name(&folder, exceptions) else {
                continue;
            };

            let target = free_name(&parent, &dashed);
            let folder_path = parent.join(&folder);
            match fs::rename(&folder_path, parent.join(&target)) {
                Ok(()) => {
                    report.folders_renamed += 1;
                    info!("Successfully changed {} to {}", folder_path.display(), target);
                }
                Err(e) => {
                    error!("Error renaming folder {}: {}", folder, e);
                    report.errors += 1;
                }
            }
        }
    }

    Ok(report.finish(start))
}
