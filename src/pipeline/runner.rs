//! Step execution.

use super::Step;
use crate::error::PrepError;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Something that can execute a single pipeline step.
pub trait StepRunner {
    fn run_step(&mut self, step: &Step) -> Result<()>;
}

/// Runs each step as a child process of a `dataprep` executable.
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    program: PathBuf,
    /// Flags placed before the step subcommand (dataset, config, verbosity).
    global_args: Vec<String>,
}

impl SubprocessRunner {
    pub fn new(program: PathBuf, global_args: Vec<String>) -> Self {
        Self {
            program,
            global_args,
        }
    }

    /// A runner that re-invokes the currently running executable.
    pub fn current_exe(global_args: Vec<String>) -> Result<Self> {
        let program = std::env::current_exe().context("Failed to locate the dataprep executable")?;
        Ok(Self::new(program, global_args))
    }

    /// The full argument list for `step`.
    pub fn command_args(&self, step: &Step) -> Vec<String> {
        let mut args = self.global_args.clone();
        args.extend(step.args());
        args
    }
}

impl StepRunner for SubprocessRunner {
    fn run_step(&mut self, step: &Step) -> Result<()> {
        let args = self.command_args(step);
        debug!("Spawning {} {}", self.program.display(), args.join(" "));

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to start {}", self.program.display()))?;

        if status.success() {
            Ok(())
        } else {
            Err(PrepError::StepFailed {
                step: step.name().to_string(),
                code: status.code(),
            }
            .into())
        }
    }
}
