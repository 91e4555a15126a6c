use std::error::Error;

use clap::Args;
use rsweep_exp::{launch, resolve_plan, shell_join, DryRun, GnuParallel, LaunchOpts};
use tracing::info;

use super::launcher::LauncherArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Plan file, or the name of a built-in plan.
    #[arg(long)]
    pub plan: String,
    /// Run only this stage.
    #[arg(long)]
    pub stage: Option<String>,
    #[command(flatten)]
    pub launcher: LauncherArgs,
    /// Print the runner command and jobs instead of spawning anything.
    #[arg(long)]
    pub dry_run: bool,
    /// Skip writing launch manifests.
    #[arg(long)]
    pub no_manifest: bool,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let plan = resolve_plan(&args.plan)?;
    let settings = args.launcher.settings(Some(&plan))?;
    let runner = GnuParallel::new(settings.parallel.clone(), settings.jobs);
    let opts = LaunchOpts {
        stage: args.stage.clone(),
        write_manifest: !args.no_manifest && !args.dry_run,
    };

    if args.dry_run {
        let report = launch(&plan, &settings, &DryRun { runner }, &opts)?;
        for outcome in &report.stages {
            println!("# {} ({} jobs)", outcome.stage, outcome.jobs);
            println!("{}", shell_join(&outcome.command));
            for job in &outcome.invocations {
                println!("{}", job.command_line());
            }
        }
        return Ok(());
    }

    let report = launch(&plan, &settings, &runner, &opts)?;
    let jobs: usize = report.stages.iter().map(|outcome| outcome.jobs).sum();
    info!(
        run_id = %report.run_id,
        stages = report.stages.len(),
        jobs,
        "launch finished"
    );
    Ok(())
}
