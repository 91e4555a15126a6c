use std::error::Error;
use std::io;

use clap::{Args, ValueEnum};
use rsweep_core::LaunchError;
use rsweep_exp::{compile_stages, resolve_plan, to_canonical_json_bytes, JobInvocation};
use serde::Serialize;

use super::launcher::LauncherArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobsFormat {
    /// One shell command line per job.
    Text,
    Json,
    /// `stage,index,output_dir,command_line` rows.
    Csv,
}

#[derive(Args, Debug)]
pub struct JobsArgs {
    /// Plan file, or the name of a built-in plan.
    #[arg(long)]
    pub plan: String,
    /// List only this stage.
    #[arg(long)]
    pub stage: Option<String>,
    #[arg(long, value_enum, default_value_t = JobsFormat::Text)]
    pub format: JobsFormat,
    #[command(flatten)]
    pub launcher: LauncherArgs,
}

#[derive(Debug, Serialize)]
struct StageJobs {
    stage: String,
    jobs: Vec<JobInvocation>,
}

pub fn run(args: &JobsArgs) -> Result<(), Box<dyn Error>> {
    let plan = resolve_plan(&args.plan)?;
    let settings = args.launcher.settings(Some(&plan))?;
    let listing = compile_stages(&plan, &settings, args.stage.as_deref())?
        .into_iter()
        .map(|stage| -> Result<StageJobs, LaunchError> {
            Ok(StageJobs {
                jobs: stage.invocations()?,
                stage: stage.stage,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    match args.format {
        JobsFormat::Text => {
            for stage in &listing {
                for job in &stage.jobs {
                    println!("{}", job.command_line());
                }
            }
        }
        JobsFormat::Json => {
            let json = to_canonical_json_bytes(&listing)?;
            println!("{}", String::from_utf8(json)?);
        }
        JobsFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            writer.write_record(["stage", "index", "output_dir", "command_line"])?;
            for stage in &listing {
                for job in &stage.jobs {
                    writer.write_record([
                        stage.stage.clone(),
                        job.index.to_string(),
                        job.output_dir.to_string_lossy().into_owned(),
                        job.command_line(),
                    ])?;
                }
            }
            writer.flush()?;
        }
    }
    Ok(())
}
