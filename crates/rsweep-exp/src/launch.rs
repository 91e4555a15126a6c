use rsweep_core::errors::{ErrorInfo, LaunchError};
use rsweep_core::provenance::RunProvenance;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::manifest::{build_manifest, manifest_dir, write_manifest};
use crate::plan::ExperimentPlan;
use crate::settings::LaunchSettings;
use crate::stage::StagePlan;

/// Options controlling a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOpts {
    /// Run only the named stage.
    pub stage: Option<String>,
    /// Write a manifest per stage before dispatching it.
    pub write_manifest: bool,
}

impl Default for LaunchOpts {
    fn default() -> Self {
        Self {
            stage: None,
            write_manifest: true,
        }
    }
}

/// Summary of a launch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchReport {
    /// Unique id of this launch.
    pub run_id: String,
    /// Stable hash of the launched plan.
    pub plan_hash: String,
    /// One outcome per dispatched stage, in order.
    pub stages: Vec<DispatchOutcome>,
}

/// Compiles the selected stages of `plan` in declaration order.
pub fn compile_stages(
    plan: &ExperimentPlan,
    settings: &LaunchSettings,
    only: Option<&str>,
) -> Result<Vec<StagePlan>, LaunchError> {
    plan.validate()?;
    if let Some(name) = only {
        if plan.stage(name).is_none() {
            return Err(LaunchError::Config(
                ErrorInfo::new("stage-unknown", "plan has no stage with this name")
                    .with_context("stage", name)
                    .with_hint(format!("stages: {}", plan.stage_names().join(", "))),
            ));
        }
    }
    plan.stages
        .iter()
        .filter(|stage| only.map_or(true, |name| stage.name == name))
        .map(|stage| StagePlan::compile(plan, stage, settings))
        .collect()
}

/// Dispatches the selected stages one after another.
///
/// Every stage is compiled before the first one is dispatched. The first
/// failing stage ends the launch and its error is returned unchanged.
pub fn launch(
    plan: &ExperimentPlan,
    settings: &LaunchSettings,
    dispatcher: &dyn Dispatcher,
    opts: &LaunchOpts,
) -> Result<LaunchReport, LaunchError> {
    let stages = compile_stages(plan, settings, opts.stage.as_deref())?;
    let provenance = RunProvenance::now(plan.plan_hash()?);
    info!(
        experiment = %plan.experiment,
        run_id = %provenance.run_id,
        stages = stages.len(),
        "starting launch"
    );

    let mut outcomes = Vec::with_capacity(stages.len());
    for stage in &stages {
        if opts.write_manifest {
            let manifest = build_manifest(stage, &provenance, dispatcher.command_line(stage))?;
            let dir = manifest_dir(stage, &settings.output_root, &provenance.run_id);
            let path = write_manifest(&dir, &manifest)?;
            info!(stage = %stage.stage, path = %path.display(), "wrote launch manifest");
        }
        outcomes.push(dispatcher.dispatch(stage)?);
    }

    Ok(LaunchReport {
        run_id: provenance.run_id,
        plan_hash: provenance.plan_hash,
        stages: outcomes,
    })
}
