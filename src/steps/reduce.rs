//! Merge fine-grained classes into coarse classes.
//!
//! Each split is rebuilt in a sibling `<split>_temp` directory holding one
//! folder per coarse class, then swapped in place of the original split.
//! Images are renamed to `<id>-<coarse>.<ext>` on the way.

use super::{StepContext, StepReport};
use crate::config::ClassMapping;
use crate::dataset::{class_dirs, extension, files_with_extensions, sample_id, Split};
use crate::error::PrepError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

pub const NAME: &str = "reduce-classes";

/// The coarse class for `folder`: the first mapping whose key it contains.
pub fn coarse_class<'a>(folder: &str, mappings: &'a [ClassMapping]) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| folder.contains(m.from.as_str()))
        .map(|m| m.to.as_str())
}

/// The file name an image takes inside its coarse class folder.
pub fn reduced_name(image: &str, coarse: &str) -> String {
    format!("{}-{}.{}", sample_id(image), coarse, extension(image))
}

fn temp_dir_for(split_dir: &Path) -> PathBuf {
    let mut name = split_dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push("_temp");
    split_dir.with_file_name(name)
}

/// Run the class reduction over every split.
pub fn run(ctx: &StepContext) -> Result<StepReport> {
    let start = Instant::now();
    let mut report = StepReport::new(NAME);

    for split in Split::ALL {
        println!("Processing {} directory...", split);
        reduce_split(ctx, &ctx.dataset.split_dir(split), &mut report)?;
        println!("Finished processing {} directory", split);
    }

    Ok(report.finish(start))
}

fn reduce_split(ctx: &StepContext, split_dir: &Path, report: &mut StepReport) -> Result<()> {
    if !split_dir.exists() {
        warn!("Directory not found: {}", split_dir.display());
        return Ok(());
    }

    let mappings = &ctx.config.reduce.mappings;
    let temp_dir = temp_dir_for(split_dir);

    if temp_dir.exists() {
        fs::remove_dir_all(&temp_dir)
            .with_context(|| format!("Failed to clear {}", temp_dir.display()))?;
    }
    for coarse in ctx.config.coarse_classes() {
        fs::create_dir_all(temp_dir.join(&coarse))
            .with_context(|| format!("Failed to create {}", temp_dir.join(&coarse).display()))?;
    }

    let mut failures = 0;
    for class in class_dirs(split_dir)? {
        report.folders_visited += 1;

        let Some(coarse) = coarse_class(&class, mappings) else {
            warn!("No mapping found for class {}", class);
            report.skipped += 1;
            continue;
        };

        let class_path = split_dir.join(&class);
        let images = files_with_extensions(&class_path, &ctx.config.reduce.extensions)?;
        let pb = ctx.progress_bar(images.len() as u64);
        pb.set_message(class.clone());

        for image in images {
            pb.inc(1);
            let dst = temp_dir.join(coarse).join(reduced_name(&image, coarse));
            if dst.exists() {
                warn!(
                    "Duplicate sample {} in {}, keeping the first copy",
                    dst.display(),
                    class
                );
                report.skipped += 1;
                continue;
            }

            match fs::copy(class_path.join(&image), &dst) {
                Ok(_) => report.files_copied += 1,
                Err(e) => {
                    error!("Failed to copy {}: {}", class_path.join(&image).display(), e);
                    report.errors += 1;
                    failures += 1;
                }
            }
        }

        pb.finish_and_clear();
    }

    // The split is only replaced once every image made it into the temp copy.
    if failures > 0 {
        fs::remove_dir_all(&temp_dir)
            .with_context(|| format!("Failed to remove {}", temp_dir.display()))?;
        return Err(PrepError::CopyFailed {
            split: split_dir.to_path_buf(),
            failures,
        }
        .into());
    }

    fs::remove_dir_all(split_dir)
        .with_context(|| format!("Failed to remove {}", split_dir.display()))?;
    fs::rename(&temp_dir, split_dir).with_context(|| {
        format!(
            "Failed to move {} to {}",
            temp_dir.display(),
            split_dir.display()
        )
    })?;

    info!("Reduced {}", split_dir.display());
    Ok(())
}
