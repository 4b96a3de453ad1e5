use anyhow::Result;
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::config::RunConfig;

/// One unit of work: encode `source` into `dest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub source: PathBuf,
    pub dest: PathBuf,
}

/// Build the ordered task list for this run.
///
/// Extensions are matched in configuration order against a sorted, single
/// level directory listing, so the task order is deterministic. Matching is
/// case-sensitive: only the literal extensions in the configured set count.
pub fn collect_tasks(config: &RunConfig) -> Result<Vec<ConversionTask>> {
    if !config.input_dir.is_dir() {
        anyhow::bail!(
            "input directory does not exist: {}",
            config.input_dir.display()
        );
    }

    let entries: Vec<PathBuf> = WalkDir::new(&config.input_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .collect();

    let mut tasks = Vec::new();
    for ext in &config.extensions {
        let suffix = format!(".{}", ext);
        for path in &entries {
            // Entries can vanish between listing and matching; skip them.
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.len() > suffix.len() && name.ends_with(&suffix) {
                let stem = &name[..name.len() - suffix.len()];
                tasks.push(ConversionTask {
                    source: path.clone(),
                    dest: config.output_dir.join(format!("{}.heic", stem)),
                });
            }
        }
    }

    Ok(tasks)
}
