//! The preprocessing pipeline.
//!
//! Runs every step in a fixed order, each in its own child process, and
//! stops at the first step that fails.

pub mod prompt;
pub mod runner;

use serde::Serialize;
use std::time::Instant;

pub use runner::{StepRunner, SubprocessRunner};

/// Default per-class cap offered by the interactive prompt.
pub const DEFAULT_MAX_PER_CLASS: usize = 5000;

/// One pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Reorganize,
    DeleteToN(usize),
    MapClassNames,
    UnderscoreToDash,
    ReduceClasses,
}

impl Step {
    /// The subcommand that runs this step.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Reorganize => crate::steps::reorganize::NAME,
            Step::DeleteToN(_) => crate::steps::downsize::NAME,
            Step::MapClassNames => crate::steps::map_names::NAME,
            Step::UnderscoreToDash => crate::steps::underscore::NAME,
            Step::ReduceClasses => crate::steps::reduce::NAME,
        }
    }

    /// Command-line arguments selecting this step.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![self.name().to_string()];
        if let Step::DeleteToN(target) = self {
            args.push(target.to_string());
        }
        args
    }
}

/// The ordered step list; downsizing is included only when requested.
pub fn plan(max_per_class: Option<usize>) -> Vec<Step> {
    let mut steps = vec![Step::Reorganize];

    if let Some(target) = max_per_class.filter(|n| *n > 0) {
        steps.push(Step::DeleteToN(target));
    }

    steps.extend([
        Step::MapClassNames,
        Step::UnderscoreToDash,
        Step::ReduceClasses,
    ]);
    steps
}

/// How one step of the pipeline went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub step: String,
    pub success: bool,
    pub duration_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run `steps` in order with `runner`, stopping at the first failure.
///
/// Steps after a failure are not attempted and do not appear in the result.
pub fn run_steps(steps: &[Step], runner: &mut dyn StepRunner) -> Vec<StepOutcome> {
    let mut outcomes = Vec::with_capacity(steps.len());

    for step in steps {
        println!("\nRunning {}...", step.args().join(" "));
        let start = Instant::now();

        match runner.run_step(step) {
            Ok(()) => {
                println!("Successfully completed {}", step.name());
                outcomes.push(StepOutcome {
                    step: step.name().to_string(),
                    success: true,
                    duration_seconds: start.elapsed().as_secs_f64(),
                    error: None,
                });
            }
            Err(e) => {
                println!("Error running {}: {}", step.name(), e);
                outcomes.push(StepOutcome {
                    step: step.name().to_string(),
                    success: false,
                    duration_seconds: start.elapsed().as_secs_f64(),
                    error: Some(e.to_string()),
                });
                break;
            }
        }
    }

    outcomes
}

/// Whether every step ran and succeeded.
pub fn all_succeeded(steps: &[Step], outcomes: &[StepOutcome]) -> bool {
    outcomes.len() == steps.len() && outcomes.iter().all(|o| o.success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;
    use anyhow::Result;

    /// Records step names and fails on the configured one.
    struct ScriptedRunner {
        fail_on: Option<&'static str>,
        seen: Vec<String>,
    }

    impl StepRunner for ScriptedRunner {
        fn run_step(&mut self, step: &Step) -> Result<()> {
            self.seen.push(step.name().to_string());
            if self.fail_on == Some(step.name()) {
                return Err(PrepError::StepFailed {
                    step: step.name().to_string(),
                    code: Some(1),
                }
                .into());
            }
            Ok(())
        }
    }

    #[test]
    fn test_plan_without_downsize() {
        assert_eq!(
            plan(None),
            vec![
                Step::Reorganize,
                Step::MapClassNames,
                Step::UnderscoreToDash,
                Step::ReduceClasses
            ]
        );
        assert_eq!(plan(Some(0)).len(), 4);
    }

    #[test]
    fn test_plan_with_downsize() {
        let steps = plan(Some(5000));
        assert_eq!(steps[1], Step::DeleteToN(5000));
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[1].args(), vec!["delete-to-n", "5000"]);
        assert_eq!(steps[4].args(), vec!["reduce-classes"]);
    }

    #[test]
    fn test_runs_every_step_in_order() {
        let steps = plan(Some(10));
        let mut runner = ScriptedRunner {
            fail_on: None,
            seen: Vec::new(),
        };

        let outcomes = run_steps(&steps, &mut runner);

        assert!(all_succeeded(&steps, &outcomes));
        assert_eq!(
            runner.seen,
            vec![
                "reorganize",
                "delete-to-n",
                "map-class-names",
                "underscore-to-dash",
                "reduce-classes"
            ]
        );
    }

    #[test]
    fn test_stops_at_first_failure() {
        let steps = plan(None);
        let mut runner = ScriptedRunner {
            fail_on: Some("map-class-names"),
            seen: Vec::new(),
        };

        let outcomes = run_steps(&steps, &mut runner);

        assert!(!all_succeeded(&steps, &outcomes));
        assert_eq!(runner.seen, vec!["reorganize", "map-class-names"]);
        assert_eq!(outcomes.len(), 2);
        assert!(!outcomes[1].success);
        assert!(outcomes[1]
            .error
            .as_deref()
            .unwrap()
            .contains("map-class-names"));
    }
}
