use std::fs;
use std::path::Path;

use crate::backend::{self, ResolvedTool};
use crate::config::RunConfig;
use crate::discovery::ConversionTask;

/// Result of processing one task. Aggregated into the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Converted,
    Skipped(String),
    Failed(String),
    SimulatedDryRun,
}

/// Process one task through the selected backend.
pub fn execute(task: &ConversionTask, config: &RunConfig, tool: ResolvedTool) -> TaskOutcome {
    execute_with(task, config, |source, dest| {
        backend::convert(tool, source, dest, config.quality, config.verbose)
    })
}

/// Skip/dry-run/convert/delete logic, with the backend call injected so the
/// contract is testable without external tools installed.
fn execute_with(
    task: &ConversionTask,
    config: &RunConfig,
    convert: impl FnOnce(&Path, &Path) -> Result<(), String>,
) -> TaskOutcome {
    if task.dest.exists() && !config.overwrite {
        return TaskOutcome::Skipped("output exists".to_string());
    }

    if config.dry_run {
        if config.delete_originals {
            crate::logger!(
                "[dry-run] would convert {} -> {} and delete the original",
                task.source.display(),
                task.dest.display()
            );
        } else {
            crate::logger!(
                "[dry-run] would convert {} -> {}",
                task.source.display(),
                task.dest.display()
            );
        }
        return TaskOutcome::SimulatedDryRun;
    }

    if let Err(reason) = convert(&task.source, &task.dest) {
        return TaskOutcome::Failed(reason);
    }

    if config.delete_originals {
        if let Err(e) = fs::remove_file(&task.source) {
            // The encode succeeded; the run keeps going.
            return TaskOutcome::Failed(format!(
                "converted, but failed to delete {}: {}",
                task.source.display(),
                e
            ));
        }
    }

    TaskOutcome::Converted
}
