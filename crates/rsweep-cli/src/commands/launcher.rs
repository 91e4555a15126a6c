use std::path::PathBuf;

use clap::Args;
use rsweep_core::LaunchError;
use rsweep_exp::{ExperimentPlan, LaunchSettings, LauncherSpec};

/// Launcher overrides shared by commands that resolve settings.
#[derive(Args, Debug, Default)]
pub struct LauncherArgs {
    /// Root directory for experiment outputs. Defaults to `$HOME/output`.
    #[arg(long, env = "EVAL_OUTPUT_ROOT")]
    pub output_root: Option<PathBuf>,
    /// Maximum number of concurrent jobs, forwarded to the runner.
    #[arg(long)]
    pub jobs: Option<usize>,
    /// GNU parallel binary.
    #[arg(long = "parallel-bin", env = "RSWEEP_PARALLEL")]
    pub parallel_bin: Option<String>,
    /// Interpreter that runs delegate tasks.
    #[arg(long, env = "RSWEEP_PYTHON")]
    pub python: Option<String>,
    /// Package prefix prepended to task names.
    #[arg(long)]
    pub module_prefix: Option<String>,
}

impl LauncherArgs {
    pub fn overrides(&self) -> LauncherSpec {
        LauncherSpec {
            output_root: self.output_root.clone(),
            python: self.python.clone(),
            module_prefix: self.module_prefix.clone(),
            parallel: self.parallel_bin.clone(),
            jobs: self.jobs,
        }
    }

    /// Settings for `plan`, or for no plan at all.
    pub fn settings(&self, plan: Option<&ExperimentPlan>) -> Result<LaunchSettings, LaunchError> {
        let pinned = plan.map(|plan| plan.launcher.clone()).unwrap_or_default();
        LaunchSettings::from_env(&self.overrides(), &pinned)
    }
}
