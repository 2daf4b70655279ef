//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dataprep - preprocessing for split/class image datasets
///
/// Reorganizes, downsizes, renames and consolidates the class folders of a
/// dataset laid out as <dataset>/{train,validation,test}/<class>/<image>.
///
/// Examples:
///   dataprep run
///   dataprep --dataset ./dataset run --max-per-class 5000
///   dataprep delete-to-n 1000 --seed 7
///   dataprep --summary reduce.json reduce-classes
///   dataprep init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Dataset root directory
    ///
    /// Overrides `general.dataset` from the config file (default: ./dataset).
    #[arg(short, long, global = true, value_name = "DIR", env = "DATAPREP_DATASET")]
    pub dataset: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .dataprep.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Write a JSON summary of the run to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run every preprocessing step in order, stopping at the first failure
    Run {
        /// Cap every class at this many images (skips the prompt)
        #[arg(long, value_name = "COUNT", conflicts_with = "no_downsize")]
        max_per_class: Option<i64>,

        /// Do not downsize (skips the prompt)
        #[arg(long)]
        no_downsize: bool,
    },

    /// Move loose images into class folders named after their label
    Reorganize,

    /// Randomly delete images so no class exceeds N
    DeleteToN {
        /// Maximum number of images to keep in each training class
        #[arg(value_name = "N", allow_negative_numbers = true)]
        target: i64,

        /// Seed for reproducible deletion
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replace severity words (smooth/slight/severe) in folder and file names
    MapClassNames,

    /// Replace underscores with dashes in class folder names
    UnderscoreToDash,

    /// Merge fine-grained classes into coarse classes
    ReduceClasses,

    /// Verify the dataset layout and print per-split counts
    Check,

    /// Generate a default .dataprep.toml configuration file
    InitConfig,
}

impl Command {
    /// The subcommand name as typed on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Run { .. } => "run",
            Command::Reorganize => crate::steps::reorganize::NAME,
            Command::DeleteToN { .. } => crate::steps::downsize::NAME,
            Command::MapClassNames => crate::steps::map_names::NAME,
            Command::UnderscoreToDash => crate::steps::underscore::NAME,
            Command::ReduceClasses => crate::steps::reduce::NAME,
            Command::Check => "check",
            Command::InitConfig => "init-config",
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match self.command {
            Command::DeleteToN { target, .. } if target <= 0 => {
                Err("Target number must be a positive integer.".to_string())
            }
            Command::Run {
                max_per_class: Some(max),
                ..
            } if max <= 0 => Err("--max-per-class must be a positive integer".to_string()),
            _ => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Flags forwarded to each child process of `dataprep run`.
    ///
    /// The dataset is passed explicitly so children agree with the parent
    /// even when it came from a config file.
    pub fn forwarded_args(&self, dataset: &std::path::Path) -> Vec<String> {
        let mut args = vec![
            "--dataset".to_string(),
            dataset.to_string_lossy().to_string(),
        ];

        if let Some(ref config) = self.config {
            args.push("--config".to_string());
            args.push(config.to_string_lossy().to_string());
        }
        if self.verbose {
            args.push("--verbose".to_string());
        }
        if self.quiet {
            args.push("--quiet".to_string());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("dataprep").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_subcommand_names() {
        assert_eq!(parse(&["delete-to-n", "10"]).command.name(), "delete-to-n");
        assert_eq!(parse(&["map-class-names"]).command, Command::MapClassNames);
        assert_eq!(
            parse(&["underscore-to-dash"]).command,
            Command::UnderscoreToDash
        );
        assert_eq!(parse(&["reduce-classes"]).command.name(), "reduce-classes");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["reorganize", "--dataset", "/data", "-q"]);
        assert_eq!(args.dataset, Some(PathBuf::from("/data")));
        assert!(args.quiet);
    }

    #[test]
    fn test_run_options_conflict() {
        let result = Args::try_parse_from([
            "dataprep",
            "run",
            "--max-per-class",
            "10",
            "--no-downsize",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_rejects_non_positive_target() {
        assert!(parse(&["delete-to-n", "0"]).validate().is_err());
        assert!(parse(&["delete-to-n", "-5"]).validate().is_err());
        assert!(parse(&["delete-to-n", "5"]).validate().is_ok());
        assert!(parse(&["run", "--max-per-class", "0"]).validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let args = parse(&["-v", "-q", "check"]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["check"]).log_level(), tracing::Level::INFO);
        assert_eq!(parse(&["-v", "check"]).log_level(), tracing::Level::DEBUG);
        assert_eq!(parse(&["-q", "check"]).log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_forwarded_args() {
        let args = parse(&["-c", "prep.toml", "-q", "run", "--no-downsize"]);
        assert_eq!(
            args.forwarded_args(std::path::Path::new("/data")),
            vec!["--dataset", "/data", "--config", "prep.toml", "--quiet"]
        );
    }
}
