//! Move loose images into per-class folders.
//!
//! Images sitting at the top level of a split are moved into
//! `<split>/<label>/`, where the label is parsed from the file name.

use super::{StepContext, StepReport};
use crate::dataset::{entry_names, extract_class_label};
use anyhow::Result;
use std::fs;
use std::time::Instant;
use tracing::{error, info, warn};

pub const NAME: &str = "reorganize";

/// Run the reorganize step over the configured splits.
pub fn run(ctx: &StepContext) -> Result<StepReport> {
    let start = Instant::now();
    let mut report = StepReport::new(NAME);

    for split in &ctx.config.reorganize.splits {
        let data_dir = ctx.dataset.root().join(split);
        println!("Processing directory: {}", data_dir.display());
        let split_start = Instant::now();

        let names = match entry_names(&data_dir) {
            Ok(names) => names,
            Err(_) => {
                error!("Directory not found: {}", data_dir.display());
                report.errors += 1;
                continue;
            }
        };
        report.folders_visited += 1;

        let pb = ctx.progress_bar(names.len() as u64);

        for filename in names {
            pb.inc(1);
            let file_path = data_dir.join(&filename);

            if !file_path.is_file() {
                info!("Skipping {}, not a file", file_path.display());
                continue;
            }

            if filename.starts_with('.') {
                report.skipped += 1;
                continue;
            }

            let label = extract_class_label(&filename);
            if label.is_empty() || label.starts_with('.') {
                warn!("No usable class label in {}, leaving it in place", filename);
                report.skipped += 1;
                continue;
            }

            let class_dir = data_dir.join(label);
            if let Err(e) = fs::create_dir_all(&class_dir) {
                error!("Failed to create {}: {}", class_dir.display(), e);
                report.errors += 1;
                continue;
            }

            let dest_path = class_dir.join(&filename);
            if dest_path.exists() {
                error!("Refusing to overwrite {}", dest_path.display());
                report.errors += 1;
                continue;
            }

            match fs::rename(&file_path, &dest_path) {
                Ok(()) => report.files_moved += 1,
                Err(e) => {
                    error!("Failed to move {}: {}", file_path.display(), e);
                    report.errors += 1;
                }
            }
        }

        pb.finish_and_clear();
        info!(
            "Successfully processed directory: {} in {} seconds",
            data_dir.display(),
            split_start.elapsed().as_secs_f64().round()
        );
    }

    Ok(report.finish(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::test_support::{count_files, fixture};

    #[test]
    fn test_moves_files_into_label_folders() {
        let (dir, ctx) = fixture();
        let val = dir.path().join("validation");
        fs::write(val.join("12-dry-asphalt-smooth.jpg"), b"x").unwrap();
        fs::write(val.join("13-dry-asphalt-smooth.jpg"), b"x").unwrap();
        fs::write(val.join("14-ice.png"), b"x").unwrap();

        let report = run(&ctx).unwrap();

        assert_eq!(report.files_moved, 3);
        assert_eq!(count_files(&val), 0);
        assert!(val.join("dry-asphalt-smooth/12-dry-asphalt-smooth.jpg").is_file());
        assert!(val.join("dry-asphalt-smooth/13-dry-asphalt-smooth.jpg").is_file());
        assert!(val.join("ice/14-ice.png").is_file());
    }

    #[test]
    fn test_skips_hidden_files_and_folders() {
        let (dir, ctx) = fixture();
        let test = dir.path().join("test");
        fs::write(test.join(".DS_Store"), b"x").unwrap();
        fs::create_dir(test.join("wet-mud")).unwrap();

        let report = run(&ctx).unwrap();

        assert!(test.join(".DS_Store").is_file());
        assert!(test.join("wet-mud").is_dir());
        assert_eq!(report.files_moved, 0);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_leaves_train_alone_by_default() {
        let (dir, ctx) = fixture();
        let train = dir.path().join("train");
        fs::write(train.join("1-wet-mud.jpg"), b"x").unwrap();

        run(&ctx).unwrap();

        assert!(train.join("1-wet-mud.jpg").is_file());
    }

    #[test]
    fn test_does_not_overwrite_existing_destination() {
        let (dir, ctx) = fixture();
        let val = dir.path().join("validation");
        fs::create_dir(val.join("wet-mud")).unwrap();
        fs::write(val.join("wet-mud/1-wet-mud.jpg"), b"old").unwrap();
        fs::write(val.join("1-wet-mud.jpg"), b"new").unwrap();

        let report = run(&ctx).unwrap();

        assert_eq!(report.errors, 1);
        assert_eq!(fs::read(val.join("wet-mud/1-wet-mud.jpg")).unwrap(), b"old");
        assert!(val.join("1-wet-mud.jpg").is_file());
    }

    #[test]
    fn test_missing_split_is_counted_not_fatal() {
        let (dir, ctx) = fixture();
        fs::remove_dir(dir.path().join("test")).unwrap();
        fs::write(dir.path().join("validation/3-ice.jpg"), b"x").unwrap();

        let report = run(&ctx).unwrap();

        assert_eq!(report.errors, 1);
        assert_eq!(report.files_moved, 1);
    }
}
