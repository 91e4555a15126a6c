use std::path::{Path, PathBuf};

use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{Deserialize, Serialize};

use crate::task::TaskCommand;

/// Environment variable naming the output root.
pub const OUTPUT_ROOT_ENV: &str = "EVAL_OUTPUT_ROOT";
/// Environment variable overriding the runner binary.
pub const PARALLEL_ENV: &str = "RSWEEP_PARALLEL";
/// Environment variable overriding the delegate interpreter.
pub const PYTHON_ENV: &str = "RSWEEP_PYTHON";
/// Runner used when nothing else is configured.
pub const DEFAULT_PARALLEL: &str = "parallel";

/// Launcher knobs that a plan file may pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LauncherSpec {
    /// Root of every experiment output tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_root: Option<PathBuf>,
    /// Interpreter for delegate tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python: Option<String>,
    /// Package prefix of delegate task modules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_prefix: Option<String>,
    /// GNU parallel binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel: Option<String>,
    /// Forwarded to the runner as `--jobs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl LauncherSpec {
    /// Layers `self` over `lower`: fields set here win.
    pub fn or(&self, lower: &LauncherSpec) -> LauncherSpec {
        LauncherSpec {
            output_root: self.output_root.clone().or_else(|| lower.output_root.clone()),
            python: self.python.clone().or_else(|| lower.python.clone()),
            module_prefix: self
                .module_prefix
                .clone()
                .or_else(|| lower.module_prefix.clone()),
            parallel: self.parallel.clone().or_else(|| lower.parallel.clone()),
            jobs: self.jobs.or(lower.jobs),
        }
    }
}

/// Fully resolved launcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchSettings {
    /// Root of every experiment output tree.
    pub output_root: PathBuf,
    /// Delegate command builder.
    pub task: TaskCommand,
    /// GNU parallel binary.
    pub parallel: String,
    /// Concurrency cap forwarded to the runner.
    pub jobs: Option<usize>,
}

impl LaunchSettings {
    /// Resolves settings with precedence `overrides` > environment > `plan` > defaults.
    ///
    /// `env` is consulted for [`OUTPUT_ROOT_ENV`], [`PARALLEL_ENV`],
    /// [`PYTHON_ENV`] and `HOME`.
    pub fn resolve<F>(
        overrides: &LauncherSpec,
        plan: &LauncherSpec,
        env: F,
    ) -> Result<Self, LaunchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        let from_env = LauncherSpec {
            output_root: var(OUTPUT_ROOT_ENV).map(PathBuf::from),
            python: var(PYTHON_ENV),
            module_prefix: None,
            parallel: var(PARALLEL_ENV),
            jobs: None,
        };
        let merged = overrides.or(&from_env).or(plan);
        let home = var("HOME").map(PathBuf::from);

        let output_root = match merged.output_root {
            Some(root) => expand_home(&root, home.as_deref())?,
            None => match &home {
                Some(home) => home.join("output"),
                None => {
                    return Err(LaunchError::Config(
                        ErrorInfo::new("output-root-unset", "cannot determine the output root")
                            .with_hint(format!("set {OUTPUT_ROOT_ENV} or pass --output-root")),
                    ))
                }
            },
        };
        if merged.jobs == Some(0) {
            return Err(LaunchError::Config(ErrorInfo::new(
                "jobs-zero",
                "--jobs must be at least 1",
            )));
        }
        let defaults = TaskCommand::default();
        Ok(Self {
            output_root,
            task: TaskCommand {
                python: merged.python.unwrap_or(defaults.python),
                module_prefix: merged.module_prefix.unwrap_or(defaults.module_prefix),
            },
            parallel: merged
                .parallel
                .unwrap_or_else(|| DEFAULT_PARALLEL.to_string()),
            jobs: merged.jobs,
        })
    }

    /// Resolves against the process environment.
    pub fn from_env(overrides: &LauncherSpec, plan: &LauncherSpec) -> Result<Self, LaunchError> {
        Self::resolve(overrides, plan, |key| std::env::var(key).ok())
    }
}

fn expand_home(path: &Path, home: Option<&Path>) -> Result<PathBuf, LaunchError> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    match home {
        Some(home) => Ok(home.join(rest)),
        None => Err(LaunchError::Config(
            ErrorInfo::new("home-unset", "cannot expand ~ without HOME")
                .with_context("path", path.display().to_string()),
        )),
    }
}
