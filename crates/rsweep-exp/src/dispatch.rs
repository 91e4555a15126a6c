use std::process::Command;

use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::invocation::{shell_join, JobInvocation};
use crate::stage::StagePlan;

/// Result of handing one stage to a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Stage name.
    pub stage: String,
    /// Number of jobs handed to the runner.
    pub jobs: usize,
    /// Runner command line, program first.
    pub command: Vec<String>,
    /// Runner exit code; `None` for dry runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// True when nothing was spawned.
    pub dry_run: bool,
    /// Materialized jobs, only populated for dry runs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invocations: Vec<JobInvocation>,
}

/// Hands a compiled stage to something that runs its jobs.
pub trait Dispatcher {
    /// Runs every job of `stage` and waits for them.
    fn dispatch(&self, stage: &StagePlan) -> Result<DispatchOutcome, LaunchError>;

    /// Command line the dispatcher runs for `stage`.
    fn command_line(&self, stage: &StagePlan) -> Vec<String>;
}

/// Fans a stage out through GNU parallel.
///
/// Axes become `:::` input sources named by `--header :`, and sanitized
/// companions are linked to their raw axis with `:::+` so both advance
/// together. `--quote` keeps every delegate word intact through parallel's
/// shell, so jobs run exactly the argv recorded in manifests. Concurrency,
/// scheduling and per-job logs are left to parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GnuParallel {
    /// Runner binary, looked up on `PATH` when not a path.
    pub program: String,
    /// Forwarded as `--jobs` when set.
    pub jobs: Option<usize>,
}

impl GnuParallel {
    /// Runner `program` with an optional concurrency cap.
    pub fn new(program: impl Into<String>, jobs: Option<usize>) -> Self {
        Self {
            program: program.into(),
            jobs,
        }
    }
}

impl Dispatcher for GnuParallel {
    fn command_line(&self, stage: &StagePlan) -> Vec<String> {
        let mut argv = vec![
            self.program.clone(),
            "--header".to_string(),
            ":".to_string(),
            "--quote".to_string(),
            "--results".to_string(),
            stage.results_dir.to_string_lossy().into_owned(),
        ];
        if let Some(jobs) = self.jobs {
            argv.push("--jobs".to_string());
            argv.push(jobs.to_string());
        }
        argv.extend(stage.command.iter().cloned());
        argv.extend(stage.templated_assignments());
        for axis in stage.grid.axes() {
            argv.push(":::".to_string());
            argv.push(axis.name().to_string());
            argv.extend(axis.raw_values().into_iter().map(str::to_string));
            if let Some(companion) = axis.companion_name() {
                argv.push(":::+".to_string());
                argv.push(companion);
                argv.extend(axis.sanitized_values().into_iter().map(str::to_string));
            }
        }
        argv
    }

    fn dispatch(&self, stage: &StagePlan) -> Result<DispatchOutcome, LaunchError> {
        let argv = self.command_line(stage);
        info!(
            experiment = %stage.experiment,
            stage = %stage.stage,
            jobs = stage.len(),
            runner = %self.program,
            "dispatching stage"
        );
        debug!(command = %shell_join(&argv), "runner command line");

        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .status()
            .map_err(|err| {
                LaunchError::Dispatch(
                    ErrorInfo::new("runner-spawn", err.to_string())
                        .with_context("runner", self.program.clone())
                        .with_context("stage", stage.stage.clone())
                        .with_hint("install GNU parallel or point RSWEEP_PARALLEL at it"),
                )
            })?;

        if !status.success() {
            let mut info = ErrorInfo::new("runner-failed", "runner exited unsuccessfully")
                .with_context("runner", self.program.clone())
                .with_context("stage", stage.stage.clone());
            if let Some(code) = status.code() {
                info = info.with_context("exit_code", code.to_string());
            }
            warn!(stage = %stage.stage, status = %status, "runner reported failure");
            return Err(LaunchError::Dispatch(info));
        }

        Ok(DispatchOutcome {
            stage: stage.stage.clone(),
            jobs: stage.len(),
            command: argv,
            exit_code: status.code(),
            dry_run: false,
            invocations: Vec::new(),
        })
    }
}

/// Reports what a runner would do without spawning anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DryRun {
    /// Runner whose command line is reported.
    pub runner: GnuParallel,
}

impl Dispatcher for DryRun {
    fn command_line(&self, stage: &StagePlan) -> Vec<String> {
        self.runner.command_line(stage)
    }

    fn dispatch(&self, stage: &StagePlan) -> Result<DispatchOutcome, LaunchError> {
        let invocations = stage.invocations()?;
        debug!(stage = %stage.stage, jobs = invocations.len(), "dry run");
        Ok(DispatchOutcome {
            stage: stage.stage.clone(),
            jobs: invocations.len(),
            command: self.command_line(stage),
            exit_code: None,
            dry_run: true,
            invocations,
        })
    }
}
