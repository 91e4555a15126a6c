use std::path::Path;

use rsweep_core::errors::{ErrorInfo, LaunchError};

use crate::plan::{load_plan, ExperimentPlan};

/// Built-in plans, by name.
const PRESETS: &[(&str, &str)] = &[
    (
        "expert_demos",
        include_str!("../../../plans/expert_demos.yaml"),
    ),
    ("eval_policy", include_str!("../../../plans/eval_policy.yaml")),
];

/// Names of the built-in plans, in launch order.
pub fn preset_names() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}

/// YAML source of a built-in plan.
pub fn preset_source(name: &str) -> Option<&'static str> {
    PRESETS
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, source)| *source)
}

/// Loads and validates a built-in plan.
pub fn load_preset(name: &str) -> Result<ExperimentPlan, LaunchError> {
    let source = preset_source(name).ok_or_else(|| {
        LaunchError::Config(
            ErrorInfo::new("preset-unknown", "no built-in plan with this name")
                .with_context("preset", name)
                .with_hint(format!("available: {}", preset_names().join(", "))),
        )
    })?;
    ExperimentPlan::from_yaml_str(source)
}

/// Loads `reference` as a plan file when one exists, otherwise as a preset name.
///
/// Directories never count, so an output tree such as `<root>/expert_demos/`
/// does not shadow the preset of the same name.
pub fn resolve_plan(reference: &str) -> Result<ExperimentPlan, LaunchError> {
    let path = Path::new(reference);
    if path.is_file() {
        load_plan(path)
    } else {
        load_preset(reference)
    }
}
