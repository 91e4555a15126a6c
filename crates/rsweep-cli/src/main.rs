use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    doctor::{self, DoctorArgs},
    jobs::{self, JobsArgs},
    presets::{self, PresetsArgs},
    run::{self, RunArgs},
    sanitize::{self, SanitizeArgs},
    version::{self, VersionArgs},
};
use rsweep_core::LaunchError;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "rsweep", about = "Launch experiment grids through GNU parallel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dispatch every job of a plan, stage by stage.
    Run(RunArgs),
    /// List the jobs a plan expands to without running them.
    Jobs(JobsArgs),
    /// Print identifiers next to their path-safe form.
    Sanitize(SanitizeArgs),
    /// List built-in plans.
    Presets(PresetsArgs),
    /// Check that the runner, interpreter and output root are usable.
    Doctor(DoctorArgs),
    /// Print version information.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Jobs(args) => jobs::run(&args),
        Command::Sanitize(args) => sanitize::run(&args),
        Command::Presets(args) => presets::run(&args),
        Command::Doctor(args) => doctor::run(&args),
        Command::Version(args) => version::run(&args),
    };

    // A failing runner ends the process with its own exit code.
    if let Err(err) = &result {
        if let Some(code) = err
            .downcast_ref::<LaunchError>()
            .and_then(LaunchError::exit_code)
        {
            error!(%err, code, "launch failed");
            std::process::exit(code);
        }
    }
    result
}
