use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{Deserialize, Serialize};

/// Default interpreter used to run delegate tasks.
pub const DEFAULT_PYTHON: &str = "python";
/// Package that hosts the delegate task modules.
pub const DEFAULT_MODULE_PREFIX: &str = "evaluating_rewards.scripts";
/// Sacred command that applies `key=value` config updates.
pub const DEFAULT_MODE: &str = "with";

/// Builds the command line that starts a named delegate task.
///
/// A task `expert_demos` in mode `with` becomes
/// `python -m evaluating_rewards.scripts.expert_demos with`. Task names that
/// already contain a `.` are treated as fully qualified modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCommand {
    /// Interpreter binary.
    pub python: String,
    /// Package prefix prepended to bare task names.
    pub module_prefix: String,
}

impl Default for TaskCommand {
    fn default() -> Self {
        Self {
            python: DEFAULT_PYTHON.to_string(),
            module_prefix: DEFAULT_MODULE_PREFIX.to_string(),
        }
    }
}

impl TaskCommand {
    /// Module path the interpreter is asked to run for `task`.
    pub fn module(&self, task: &str) -> Result<String, LaunchError> {
        let task = task.trim();
        if task.is_empty() {
            return Err(LaunchError::Config(ErrorInfo::new(
                "task-empty",
                "delegate task name is empty",
            )));
        }
        if task.contains('.') || self.module_prefix.is_empty() {
            return Ok(task.to_string());
        }
        Ok(format!("{}.{}", self.module_prefix.trim_end_matches('.'), task))
    }

    /// Full argv for `task` in `mode`. An empty mode is omitted.
    pub fn call(&self, task: &str, mode: &str) -> Result<Vec<String>, LaunchError> {
        if self.python.trim().is_empty() {
            return Err(LaunchError::Config(
                ErrorInfo::new("python-empty", "interpreter is empty")
                    .with_hint("set --python or RSWEEP_PYTHON"),
            ));
        }
        let mut argv = vec![self.python.clone(), "-m".to_string(), self.module(task)?];
        if !mode.trim().is_empty() {
            argv.push(mode.trim().to_string());
        }
        Ok(argv)
    }
}
