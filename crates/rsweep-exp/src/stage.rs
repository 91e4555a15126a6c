use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use rsweep_core::errors::{ErrorInfo, LaunchError};
use serde::Serialize;

use crate::grid::{GridPoint, ParameterGrid};
use crate::invocation::JobInvocation;
use crate::plan::{ExperimentPlan, StageSpec};
use crate::settings::LaunchSettings;
use crate::template::Template;

/// Directory under the output root that collects runner bookkeeping.
pub const RESULTS_DIR: &str = "parallel";

/// A stage with its context placeholders resolved, ready to dispatch.
///
/// Templates held here only reference grid bindings, which are substituted
/// per job by [`StagePlan::invocations`] or by the runner itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePlan {
    /// Experiment name.
    pub experiment: String,
    /// Stage name.
    pub stage: String,
    /// Grid the stage fans out over.
    pub grid: ParameterGrid,
    /// Delegate argv preceding the named arguments.
    pub command: Vec<String>,
    /// Named arguments, the output argument last when configured.
    pub args: IndexMap<String, Template>,
    /// Absolute per-job output directory.
    pub output_dir: Template,
    /// Where the runner keeps per-job stdout/stderr.
    pub results_dir: PathBuf,
}

impl StagePlan {
    /// Resolves `stage` of `plan` against `settings`.
    pub fn compile(
        plan: &ExperimentPlan,
        stage: &StageSpec,
        settings: &LaunchSettings,
    ) -> Result<Self, LaunchError> {
        let grid = stage.grid()?;
        let stage_root = settings
            .output_root
            .join(&plan.experiment)
            .join(&stage.name);
        let context = context_bindings(settings, &plan.experiment, &stage.name);

        let output_source = stage_root.join(stage.output.render_partial(&context).source());
        let output_dir = Template::parse(output_source.to_string_lossy().into_owned());

        let mut args = IndexMap::with_capacity(stage.args.len() + 1);
        for (key, template) in &stage.args {
            args.insert(key.clone(), template.render_partial(&context));
        }
        if let Some(output_arg) = &stage.output_arg {
            args.insert(output_arg.clone(), output_dir.clone());
        }

        let known = grid.bindings();
        for template in args.values() {
            template.check_bound(&known)?;
        }

        let command = settings.task.call(&stage.task, &stage.mode)?;
        let results_dir = settings
            .output_root
            .join(RESULTS_DIR)
            .join(&plan.experiment)
            .join(&stage.name);
        Ok(Self {
            experiment: plan.experiment.clone(),
            stage: stage.name.clone(),
            grid,
            command,
            args,
            output_dir,
            results_dir,
        })
    }

    /// Number of jobs the stage fans out to.
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    /// Always false for a compiled stage.
    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    /// Named arguments as `key=template`, the form handed to the runner.
    pub fn templated_assignments(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|(key, template)| format!("{key}={template}"))
            .collect()
    }

    /// Output directory of the job at `point`.
    pub fn output_dir_for(&self, point: &GridPoint) -> Result<PathBuf, LaunchError> {
        self.output_dir.render(point).map(PathBuf::from)
    }

    /// Materializes one invocation per grid point, in enumeration order.
    pub fn invocations(&self) -> Result<Vec<JobInvocation>, LaunchError> {
        let Some((program, fixed)) = self.command.split_first() else {
            return Err(LaunchError::Config(
                ErrorInfo::new("command-empty", "delegate command is empty")
                    .with_context("stage", self.stage.clone()),
            ));
        };
        self.grid
            .points()
            .into_iter()
            .map(|point| -> Result<JobInvocation, LaunchError> {
                let mut assignments = IndexMap::with_capacity(self.args.len());
                for (key, template) in &self.args {
                    assignments.insert(key.clone(), template.render(&point)?);
                }
                let mut args = fixed.to_vec();
                args.extend(
                    assignments
                        .iter()
                        .map(|(key, value)| format!("{key}={value}")),
                );
                Ok(JobInvocation {
                    index: point.index,
                    program: program.clone(),
                    args,
                    assignments,
                    output_dir: self.output_dir_for(&point)?,
                    point,
                })
            })
            .collect()
    }
}

/// Bindings for the context names (`root`, `experiment`, `stage`).
pub fn context_bindings(
    settings: &LaunchSettings,
    experiment: &str,
    stage: &str,
) -> BTreeMap<String, String> {
    let mut context = BTreeMap::new();
    context.insert(
        "root".to_string(),
        settings.output_root.to_string_lossy().into_owned(),
    );
    context.insert("experiment".to_string(), experiment.to_string());
    context.insert("stage".to_string(), stage.to_string());
    context
}

