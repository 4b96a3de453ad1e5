use rayon::prelude::*;

use crate::backend::ResolvedTool;
use crate::config::RunConfig;
use crate::discovery::ConversionTask;
use crate::task::{self, TaskOutcome};

/// Outcome counts for a whole run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub simulated: usize,
}

impl Summary {
    fn from_outcomes(outcomes: &[TaskOutcome]) -> Summary {
        let mut summary = Summary::default();
        for outcome in outcomes {
            match outcome {
                TaskOutcome::Converted => summary.converted += 1,
                TaskOutcome::Skipped(_) => summary.skipped += 1,
                TaskOutcome::Failed(_) => summary.failed += 1,
                TaskOutcome::SimulatedDryRun => summary.simulated += 1,
            }
        }
        summary
    }

    pub fn report(&self) -> String {
        if self.simulated > 0 {
            format!(
                "Dry run: {} conversion(s) simulated, {} skipped",
                self.simulated, self.skipped
            )
        } else {
            format!(
                "Done: {} converted, {} skipped, {} failed",
                self.converted, self.skipped, self.failed
            )
        }
    }
}

/// Drive every task to completion and aggregate the outcomes.
///
/// Per-task failures are logged and counted but never abort the run. The
/// summary is only produced once every task has finished.
pub fn run_all(tasks: &[ConversionTask], config: &RunConfig, tool: ResolvedTool) -> Summary {
    let total = tasks.len();
    let parallel = config.parallel && parallel_available();
    if config.parallel && !parallel {
        crate::logger!("Parallel execution unavailable, converting sequentially");
    }

    let outcomes: Vec<TaskOutcome> = if parallel {
        if config.verbose {
            crate::logger!(
                "Converting {} file(s) using {} threads...",
                total,
                rayon::current_num_threads()
            );
        }
        tasks
            .par_iter()
            .map(|t| run_one(t, None, total, config, tool))
            .collect()
    } else {
        tasks
            .iter()
            .enumerate()
            .map(|(i, t)| run_one(t, Some(i), total, config, tool))
            .collect()
    };

    Summary::from_outcomes(&outcomes)
}

/// Run one task and report its outcome. Sequential mode prints a positional
/// progress prefix; parallel completions arrive in no particular order.
fn run_one(
    task: &ConversionTask,
    index: Option<usize>,
    total: usize,
    config: &RunConfig,
    tool: ResolvedTool,
) -> TaskOutcome {
    match index {
        Some(i) => crate::logger!("[{}/{}] {}", i + 1, total, task.source.display()),
        None => crate::logger!("Converting: {}", task.source.display()),
    }

    let outcome = task::execute(task, config, tool);

    match &outcome {
        TaskOutcome::Converted => crate::logger!("Created: {}", task.dest.display()),
        TaskOutcome::Skipped(reason) => {
            crate::logger!("Skipped {}: {}", task.source.display(), reason)
        }
        TaskOutcome::Failed(reason) => {
            eprintln!("Error: {}: {}", task.source.display(), reason)
        }
        TaskOutcome::SimulatedDryRun => {}
    }

    outcome
}

fn parallel_available() -> bool {
    std::thread::available_parallelism()
        .map(|n| n.get() > 1)
        .unwrap_or(false)
}
