#![deny(missing_docs)]
//! Parameter grids, templates and job dispatch for rsweep experiment launches.

/// Runners that execute a compiled stage.
mod dispatch;
/// Axes and their Cartesian product.
mod grid;
/// Stable hashing of serializable values.
mod hash;
/// Materialized delegate command lines.
mod invocation;
/// Stage sequencing for a whole plan.
mod launch;
/// Provenance records written before dispatch.
mod manifest;
/// YAML experiment plans and their validation.
mod plan;
/// Built-in plans.
mod presets;
/// Canonical JSON and YAML codecs.
mod serde;
/// Launcher settings and their precedence.
mod settings;
/// Stages resolved against launcher settings.
mod stage;
/// Delegate task command construction.
mod task;
/// `{name}` templates.
mod template;

pub use dispatch::{DispatchOutcome, Dispatcher, DryRun, GnuParallel};
pub use grid::{
    Axis, AxisSpec, GridPoint, ParameterGrid, RangeSpec, ScalarValue, SANITIZED_SUFFIX,
};
pub use hash::stable_hash_string;
pub use invocation::{shell_join, shell_quote, JobInvocation};
pub use launch::{compile_stages, launch, LaunchOpts, LaunchReport};
pub use manifest::{build_manifest, manifest_dir, write_manifest, LaunchManifest, ManifestJob};
pub use plan::{load_plan, ExperimentPlan, StageSpec, CONTEXT_NAMES};
pub use presets::{load_preset, preset_names, preset_source, resolve_plan};
pub use settings::{
    LaunchSettings, LauncherSpec, DEFAULT_PARALLEL, OUTPUT_ROOT_ENV, PARALLEL_ENV, PYTHON_ENV,
};
pub use stage::{context_bindings, StagePlan, RESULTS_DIR};
pub use task::{TaskCommand, DEFAULT_MODE, DEFAULT_MODULE_PREFIX, DEFAULT_PYTHON};
pub use template::{is_identifier, Bindings, Template};

pub use crate::serde::{from_json_slice, from_yaml_slice, to_canonical_json_bytes, to_yaml_string};
