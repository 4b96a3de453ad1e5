mod backend;
mod config;
mod discovery;
mod logger;
mod runner;
mod task;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;

use config::{Cli, RunConfig};

fn main() {
    // Route parse failures to exit code 1; --help and --version exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = RunConfig::resolve(cli)?;
    logger::set_silent(!config.verbose);

    let tool = backend::select(&config)?;
    let tasks = discovery::collect_tasks(&config)?;

    if tasks.is_empty() {
        crate::logger!(
            "No matching files found in: {}",
            config.input_dir.display()
        );
        return Ok(());
    }

    if !config.dry_run {
        std::fs::create_dir_all(&config.output_dir).with_context(|| {
            format!(
                "Failed to create output directory: {}",
                config.output_dir.display()
            )
        })?;
    }

    let summary = runner::run_all(&tasks, &config, tool);
    crate::logger!("{}", summary.report());

    // Per-task failures were already reported; they do not affect the exit code.
    Ok(())
}
