use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::{Deserialize, Serialize};

use crate::grid::{AxisSpec, ParameterGrid};
use crate::hash::stable_hash_string;
use crate::serde::{from_yaml_slice, to_yaml_string};
use crate::settings::LauncherSpec;
use crate::task::DEFAULT_MODE;
use crate::template::{is_identifier, Template};

/// Placeholders resolved from the launch context rather than the grid.
pub const CONTEXT_NAMES: [&str; 3] = ["root", "experiment", "stage"];

/// One fan-out of a delegate task over a parameter grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSpec {
    /// Stage name, used as a path component.
    pub name: String,
    /// Delegate task, e.g. `expert_demos`.
    pub task: String,
    /// Delegate command mode, `with` unless set.
    #[serde(default = "StageSpec::default_mode")]
    pub mode: String,
    /// Axes whose product defines the jobs.
    #[serde(default)]
    pub axes: Vec<AxisSpec>,
    /// Named arguments passed as `key=value`, in declaration order.
    #[serde(default)]
    pub args: IndexMap<String, Template>,
    /// Per-job output path relative to `<root>/<experiment>/<stage>`.
    pub output: Template,
    /// Argument receiving the resolved output directory. `null` disables it.
    #[serde(default = "StageSpec::default_output_arg")]
    pub output_arg: Option<String>,
}

impl StageSpec {
    fn default_mode() -> String {
        DEFAULT_MODE.to_string()
    }

    fn default_output_arg() -> Option<String> {
        Some("log_dir".to_string())
    }

    /// Builds the stage's parameter grid.
    pub fn grid(&self) -> Result<ParameterGrid, LaunchError> {
        ParameterGrid::from_specs(&self.axes)
    }
}

/// Experiment made of stages that run in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    /// Experiment name, used as a path component.
    pub experiment: String,
    /// Launcher settings pinned by the plan.
    #[serde(default)]
    pub launcher: LauncherSpec,
    /// Stages in launch order.
    pub stages: Vec<StageSpec>,
}

impl ExperimentPlan {
    /// Parses and validates a plan.
    pub fn from_yaml_str(text: &str) -> Result<Self, LaunchError> {
        let plan: ExperimentPlan = from_yaml_slice(text.as_bytes())?;
        plan.validate()?;
        Ok(plan)
    }

    /// Serializes the plan back to YAML.
    pub fn to_yaml_string(&self) -> Result<String, LaunchError> {
        to_yaml_string(self)
    }

    /// Deterministic hash of the plan contents.
    pub fn plan_hash(&self) -> Result<String, LaunchError> {
        stable_hash_string(self)
    }

    /// Stage with the given name.
    pub fn stage(&self, name: &str) -> Option<&StageSpec> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    /// Stage names in declaration order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name.as_str()).collect()
    }

    /// Checks names, grids and placeholder references of every stage.
    pub fn validate(&self) -> Result<(), LaunchError> {
        check_path_component("experiment", &self.experiment)?;
        if self.stages.is_empty() {
            return Err(LaunchError::Config(
                ErrorInfo::new("plan-no-stages", "plan declares no stages")
                    .with_context("experiment", self.experiment.clone()),
            ));
        }
        let mut seen = BTreeSet::new();
        for stage in &self.stages {
            check_path_component("stage", &stage.name)?;
            if !seen.insert(stage.name.as_str()) {
                return Err(LaunchError::Config(
                    ErrorInfo::new("stage-duplicate", "stage name used twice")
                        .with_context("stage", stage.name.clone()),
                ));
            }
            validate_stage(stage)?;
        }
        Ok(())
    }
}

fn validate_stage(stage: &StageSpec) -> Result<(), LaunchError> {
    let grid = stage.grid()?;
    let mut known = grid.bindings();
    for name in CONTEXT_NAMES {
        if known.iter().any(|bound| bound == name) {
            return Err(LaunchError::Config(
                ErrorInfo::new("axis-reserved-name", "axis shadows a context name")
                    .with_context("stage", stage.name.clone())
                    .with_context("axis", name),
            ));
        }
        known.push(name.to_string());
    }
    for (key, template) in &stage.args {
        if !is_identifier(key) {
            return Err(LaunchError::Config(
                ErrorInfo::new("arg-name", "argument names must be identifiers")
                    .with_context("stage", stage.name.clone())
                    .with_context("arg", key.clone()),
            ));
        }
        template.check_bound(&known)?;
    }
    if let Some(output_arg) = &stage.output_arg {
        if stage.args.contains_key(output_arg) {
            return Err(LaunchError::Config(
                ErrorInfo::new("arg-output-conflict", "argument collides with the output argument")
                    .with_context("stage", stage.name.clone())
                    .with_context("arg", output_arg.clone()),
            ));
        }
    }
    stage.output.check_bound(&known)?;
    // `{root}` renders to an absolute path, which would replace the stage root on join.
    if Path::new(stage.output.source()).is_absolute()
        || stage.output.placeholders().contains(&"root")
    {
        return Err(LaunchError::Config(
            ErrorInfo::new("output-absolute", "stage output must be relative")
                .with_context("stage", stage.name.clone())
                .with_hint("the output is placed under <root>/<experiment>/<stage>"),
        ));
    }
    Ok(())
}

fn check_path_component(kind: &str, value: &str) -> Result<(), LaunchError> {
    if value.is_empty() || !rsweep_core::is_sanitized(value) || value == "." || value == ".." {
        return Err(LaunchError::Config(
            ErrorInfo::new("name-invalid", format!("{kind} name is not a valid path component"))
                .with_context(kind, value),
        ));
    }
    Ok(())
}

/// Loads and validates a plan from a YAML file.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<ExperimentPlan, LaunchError> {
    let plan_path = path.as_ref();
    let bytes = fs::read(plan_path).map_err(|err| {
        LaunchError::Io(
            ErrorInfo::new("plan_read", err.to_string())
                .with_context("path", plan_path.display().to_string()),
        )
    })?;
    let plan: ExperimentPlan = from_yaml_slice(&bytes)?;
    plan.validate()?;
    Ok(plan)
}
