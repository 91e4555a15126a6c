use std::error::Error;
use std::process::Command;

use clap::Args;
use rsweep_exp::to_canonical_json_bytes;
use serde::Serialize;

use super::launcher::LauncherArgs;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Emit extended metadata including runner and interpreter versions.
    #[arg(long)]
    pub long: bool,
    #[command(flatten)]
    pub launcher: LauncherArgs,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    git_commit: String,
    runner: String,
    interpreter: String,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if !args.long {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let settings = args.launcher.settings(None)?;
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        git_commit: first_line("git", &["rev-parse", "HEAD"])
            .unwrap_or_else(|| "unknown".into()),
        runner: first_line(&settings.parallel, &["--version"])
            .unwrap_or_else(|| "unavailable".into()),
        interpreter: first_line(&settings.task.python, &["--version"])
            .unwrap_or_else(|| "unavailable".into()),
    };
    let json = to_canonical_json_bytes(&info)?;
    println!("{}", String::from_utf8(json)?);
    Ok(())
}

/// First line a program prints, from stdout or else stderr.
fn first_line(program: &str, args: &[&str]) -> Option<String> {
    let out = Command::new(program).args(args).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&out.stdout);
    let stderr = String::from_utf8_lossy(&out.stderr);
    stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
