//! Randomly delete images so no class exceeds a target size.
//!
//! The training split is capped at the absolute target. Validation and test
//! are shrunk by the ratio that target imposes on the largest training
//! class, so the splits keep their relative proportions.

use super::{StepContext, StepReport};
use crate::dataset::{class_dirs, files_with_extensions, Split};
use crate::error::PrepError;
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

pub const NAME: &str = "delete-to-n";

/// How many images each class of a split may keep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// Keep at most this many images.
    Absolute(usize),
    /// Keep `max(1, floor(count * ratio))` images.
    Ratio(f64),
}

impl Limit {
    /// The number of images a class holding `count` images may keep.
    pub fn target_for(&self, count: usize) -> usize {
        match *self {
            Limit::Absolute(n) => n,
            Limit::Ratio(ratio) => ((count as f64 * ratio) as usize).max(1),
        }
    }
}

/// Ratio between `target` and the largest class in `split_dir`.
///
/// Returns `1.0` when no class exceeds the target.
pub fn reduction_ratio(split_dir: &Path, target: usize, extensions: &[String]) -> Result<f64> {
    let mut max_images = 0;
    for class in class_dirs(split_dir)? {
        let images = files_with_extensions(&split_dir.join(&class), extensions)?;
        max_images = max_images.max(images.len());
    }

    if max_images <= target {
        Ok(1.0)
    } else {
        Ok(target as f64 / max_images as f64)
    }
}

/// Run the downsize step with the given per-class target.
pub fn run(ctx: &StepContext, target: usize) -> Result<StepReport> {
    if target == 0 {
        return Err(PrepError::InvalidTarget(0).into());
    }

    let start = Instant::now();
    let mut report = StepReport::new(NAME);
    let extensions = &ctx.config.downsize.extensions;

    let train_dir = ctx.dataset.split_dir(Split::Train);
    if !train_dir.exists() {
        return Err(PrepError::MissingSplit {
            split: Split::Train.as_str(),
            path: train_dir,
        })
        .context("Training directory is required to compute the reduction ratio");
    }

    let ratio = reduction_ratio(&train_dir, target, extensions)?;
    println!(
        "Reduction ratio calculated from training set: {:.2}%",
        ratio * 100.0
    );

    let mut rng = match ctx.config.downsize.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for split in Split::ALL {
        println!("Processing {} dataset...", split);
        let limit = match split {
            Split::Train => Limit::Absolute(target),
            _ => Limit::Ratio(ratio),
        };
        delete_to_limit(ctx, split, limit, &mut rng, &mut report)?;
    }

    Ok(report.finish(start))
}

/// Cap every class folder of `split` at `limit`.
fn delete_to_limit(
    ctx: &StepContext,
    split: Split,
    limit: Limit,
    rng: &mut StdRng,
    report: &mut StepReport,
) -> Result<()> {
    let split_dir = ctx.dataset.split_dir(split);
    if !split_dir.exists() {
        warn!("Directory not found: {}", split_dir.display());
        return Ok(());
    }

    for class in class_dirs(&split_dir)? {
        let class_dir = split_dir.join(&class);
        report.folders_visited += 1;

        let images = files_with_extensions(&class_dir, &ctx.config.downsize.extensions)?;
        let count = images.len();
        let keep = limit.target_for(count);

        if count <= keep {
            info!(
                "No need to delete images from {}. The folder contains {} images, which is less than or equal to {}.",
                class, count, keep
            );
            continue;
        }

        let excess = count - keep;
        let mut deleted = 0;
        for image in images.choose_multiple(rng, excess) {
            match fs::remove_file(class_dir.join(image)) {
                Ok(()) => deleted += 1,
                Err(e) => {
                    error!("Failed to delete {}: {}", class_dir.join(image).display(), e);
                    report.errors += 1;
                }
            }
        }
        report.files_deleted += deleted;

        info!(
            "{} images deleted from {}. Now there are {} images left.",
            deleted,
            class,
            count - deleted
        );
    }

    Ok(())
}
