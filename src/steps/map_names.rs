//! Rename severity words in class folders and the images inside them.

use super::{StepContext, StepReport};
use crate::config::Substitution;
use crate::dataset::{class_dirs, entry_names, Split};
use anyhow::Result;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const NAME: &str = "map-class-names";

/// Apply every substitution, in order, to `name`.
pub fn apply_substitutions(name: &str, substitutions: &[Substitution]) -> String {
    substitutions
        .iter()
        .fold(name.to_string(), |acc, sub| acc.replace(&sub.from, &sub.to))
}

/// Rename `dir/from` to `dir/to` unless the names match or `to` is taken.
///
/// Returns whether a rename happened.
pub(crate) fn rename_in(dir: &Path, from: &str, to: &str) -> std::io::Result<bool> {
    if from == to {
        return Ok(false);
    }

    let target = dir.join(to);
    if target.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", target.display()),
        ));
    }

    fs::rename(dir.join(from), target)?;
    Ok(true)
}

/// Run the class-name mapping over every split.
pub fn run(ctx: &StepContext) -> Result<StepReport> {
    let start = Instant::now();
    let mut report = StepReport::new(NAME);
    let substitutions = &ctx.config.map_names.substitutions;

    for split in Split::ALL {
        let parent = ctx.dataset.split_dir(split);
        if !parent.exists() {
            warn!("Directory not found: {}", parent.display());
            continue;
        }

        for folder in class_dirs(&parent)? {
            let folder_start = Instant::now();
            let folder_path = parent.join(&folder);
            report.folders_visited += 1;

            if !substitutions.iter().any(|s| folder.contains(&s.from)) {
                debug!("Nothing to map in {}", folder_path.display());
                continue;
            }

            for image in entry_names(&folder_path)? {
                let new_name = apply_substitutions(&image, substitutions);
                match rename_in(&folder_path, &image, &new_name) {
                    Ok(true) => report.files_renamed += 1,
                    Ok(false) => {}
                    Err(e) => {
                        error!("Error renaming file {}: {}", image, e);
                        report.errors += 1;
                    }
                }
            }

            let new_folder = apply_substitutions(&folder, substitutions);
            match rename_in(&parent, &folder, &new_folder) {
                Ok(renamed) => {
                    report.folders_renamed += usize::from(renamed);
                    info!("Successfully changed {}", folder_path.display());
                }
                Err(e) => {
                    error!("Error renaming folder {}: {}", folder, e);
                    report.errors += 1;
                }
            }

            info!(
                "Successfully mapped {} in {} seconds",
                folder_path.display(),
                folder_start.elapsed().as_secs_f64().round()
            );
        }
    }

    Ok(report.finish(start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::steps::test_support::{fixture, populate};

    #[test]
    fn test_apply_substitutions_in_order() {
        let subs = Config::default().map_names.substitutions;
        assert_eq!(
            apply_substitutions("1-dry-asphalt-smooth.jpg", &subs),
            "1-dry-asphalt-good.jpg"
        );
        assert_eq!(
            apply_substitutions("water-concrete-severe", &subs),
            "water-concrete-bad"
        );
        assert_eq!(apply_substitutions("wet-mud", &subs), "wet-mud");

        let chained = vec![Substitution::new("a", "b"), Substitution::new("b", "c")];
        assert_eq!(apply_substitutions("a", &chained), "c");
    }

    #[test]
    fn test_renames_folder_and_images() {
        let (dir, ctx) = fixture();
        let train = dir.path().join("train");
        populate(&train, "dry-asphalt-smooth", 2, "jpg");
        populate(&train, "wet-concrete-slight", 1, "png");
        populate(&train, "wet-mud", 1, "jpg");

        let report = run(&ctx).unwrap();

        assert!(train.join("dry-asphalt-good/0-dry-asphalt-good.jpg").is_file());
        assert!(train.join("dry-asphalt-good/1-dry-asphalt-good.jpg").is_file());
        assert!(train
            .join("wet-concrete-intermediate/0-wet-concrete-intermediate.png")
            .is_file());
        assert!(train.join("wet-mud/0-wet-mud.jpg").is_file());
        assert!(!train.join("dry-asphalt-smooth").exists());
        assert_eq!(report.files_renamed, 3);
        assert_eq!(report.folders_renamed, 2);
        assert_eq!(report.errors, 0);
    }

    #[test]
    fn test_folder_collision_is_logged_and_skipped() {
        let (dir, ctx) = fixture();
        let test = dir.path().join("test");
        populate(&test, "dry-mud-smooth", 1, "jpg");
        fs::create_dir(test.join("dry-mud-good")).unwrap();
        fs::write(test.join("dry-mud-good/keep.jpg"), b"x").unwrap();

        let report = run(&ctx).unwrap();

        assert_eq!(report.errors, 1);
        assert!(test.join("dry-mud-smooth/0-dry-mud-good.jpg").is_file());
        assert!(test.join("dry-mud-good/keep.jpg").is_file());
    }

    #[test]
    fn test_rename_in_refuses_existing_target() {
        let (dir, _ctx) = fixture();
        let root = dir.path();
        fs::write(root.join("a"), b"1").unwrap();
        fs::write(root.join("b"), b"2").unwrap();

        assert!(!rename_in(root, "a", "a").unwrap());
        assert!(rename_in(root, "a", "b").is_err());
        assert!(rename_in(root, "a", "c").unwrap());
        assert_eq!(fs::read(root.join("b")).unwrap(), b"2");
    }
}
