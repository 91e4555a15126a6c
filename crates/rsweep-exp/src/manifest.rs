use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rsweep_core::errors::{ErrorInfo, LaunchError};
use rsweep_core::provenance::{RunProvenance, SchemaVersion};
use serde::{Deserialize, Serialize};

use crate::invocation::shell_join;
use crate::serde::to_canonical_json_bytes;
use crate::stage::StagePlan;

fn io_error(code: &str, path: &Path, err: impl ToString) -> LaunchError {
    LaunchError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Per-job entry recorded in a [`LaunchManifest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestJob {
    /// Position of the job in enumeration order.
    pub index: usize,
    /// Values bound at the job's grid point.
    pub bindings: IndexMap<String, String>,
    /// Resolved output directory.
    pub output_dir: String,
    /// Shell-quoted delegate command line.
    pub command_line: String,
}

/// Provenance record written before a stage is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchManifest {
    /// Manifest schema version.
    pub schema_version: SchemaVersion,
    /// Who launched what, and when.
    pub provenance: RunProvenance,
    /// Experiment name.
    pub experiment: String,
    /// Stage name.
    pub stage: String,
    /// Runner command line, program first.
    pub runner_command: Vec<String>,
    /// Number of jobs in the stage.
    pub job_count: usize,
    /// Every job of the stage, in enumeration order.
    pub jobs: Vec<ManifestJob>,
}

/// Builds the manifest for `stage`, materializing every job.
pub fn build_manifest(
    stage: &StagePlan,
    provenance: &RunProvenance,
    runner_command: Vec<String>,
) -> Result<LaunchManifest, LaunchError> {
    let jobs: Vec<ManifestJob> = stage
        .invocations()?
        .into_iter()
        .map(|job| ManifestJob {
            index: job.index,
            command_line: shell_join(&job.argv()),
            output_dir: job.output_dir.to_string_lossy().into_owned(),
            bindings: job.point.bindings,
        })
        .collect();
    Ok(LaunchManifest {
        schema_version: SchemaVersion::default(),
        provenance: provenance.clone(),
        experiment: stage.experiment.clone(),
        stage: stage.stage.clone(),
        runner_command,
        job_count: jobs.len(),
        jobs,
    })
}

/// Directory a manifest for `stage` and `run_id` is written to.
pub fn manifest_dir(stage: &StagePlan, output_root: &Path, run_id: &str) -> PathBuf {
    output_root
        .join(&stage.experiment)
        .join(&stage.stage)
        .join("launch")
        .join(run_id)
}

/// Writes `manifest.json` and `jobs.csv` into `dir`, returning the manifest path.
pub fn write_manifest(dir: &Path, manifest: &LaunchManifest) -> Result<PathBuf, LaunchError> {
    fs::create_dir_all(dir).map_err(|err| io_error("manifest_dir", dir, err))?;
    let manifest_path = dir.join("manifest.json");
    let bytes = to_canonical_json_bytes(manifest)?;
    fs::write(&manifest_path, bytes).map_err(|err| io_error("manifest_write", &manifest_path, err))?;
    write_jobs_csv(&dir.join("jobs.csv"), manifest)?;
    Ok(manifest_path)
}

fn write_jobs_csv(path: &Path, manifest: &LaunchManifest) -> Result<(), LaunchError> {
    let mut writer = csv::Writer::from_path(path).map_err(|err| io_error("jobs_csv", path, err))?;
    let columns: Vec<String> = manifest
        .jobs
        .first()
        .map(|job| job.bindings.keys().cloned().collect())
        .unwrap_or_default();
    let mut header = vec!["index".to_string()];
    header.extend(columns.iter().cloned());
    header.push("output_dir".to_string());
    writer
        .write_record(&header)
        .map_err(|err| io_error("jobs_csv", path, err))?;
    for job in &manifest.jobs {
        let mut record = vec![job.index.to_string()];
        for column in &columns {
            record.push(job.bindings.get(column).cloned().unwrap_or_default());
        }
        record.push(job.output_dir.clone());
        writer
            .write_record(&record)
            .map_err(|err| io_error("jobs_csv", path, err))?;
    }
    writer.flush().map_err(|err| io_error("jobs_csv", path, err))
}
