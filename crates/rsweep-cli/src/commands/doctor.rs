use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use rsweep_exp::to_canonical_json_bytes;
use serde::Serialize;
use tracing::debug;

use super::launcher::LauncherArgs;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    #[command(flatten)]
    pub launcher: LauncherArgs,
    /// Emit only JSON without additional context.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: String,
    ok: bool,
    detail: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    status: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(args: &DoctorArgs) -> Result<(), Box<dyn Error>> {
    let settings = args.launcher.settings(None)?;
    let checks = vec![
        check_program("runner", &settings.parallel),
        check_program("interpreter", &settings.task.python),
        check_writable("output_root", &settings.output_root),
    ];
    let status = if checks.iter().all(|check| check.ok) {
        "ok"
    } else {
        "failed"
    };
    let report = DoctorReport {
        status: status.to_string(),
        checks,
    };
    let json = to_canonical_json_bytes(&report)?;
    let rendered = String::from_utf8(json)?;
    if args.quiet {
        println!("{}", rendered);
    } else {
        println!("rsweep doctor status: {}", report.status);
        println!("{}", rendered);
    }
    if report.status != "ok" {
        return Err("one or more checks failed".into());
    }
    Ok(())
}

fn check_program(name: &str, program: &str) -> DoctorCheck {
    match find_program(program) {
        Some(path) => DoctorCheck {
            name: name.into(),
            ok: true,
            detail: path.display().to_string(),
        },
        None => DoctorCheck {
            name: name.into(),
            ok: false,
            detail: format!("{program} not found on PATH"),
        },
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

fn check_writable(name: &str, root: &Path) -> DoctorCheck {
    let probe = root.join(".rsweep-doctor");
    let outcome = fs::create_dir_all(root)
        .and_then(|_| fs::write(&probe, b"ok"))
        .and_then(|_| fs::remove_file(&probe));
    match outcome {
        Ok(()) => DoctorCheck {
            name: name.into(),
            ok: true,
            detail: root.display().to_string(),
        },
        Err(err) => {
            debug!(root = %root.display(), %err, "output root probe failed");
            DoctorCheck {
                name: name.into(),
                ok: false,
                detail: format!("{}: {err}", root.display()),
            }
        }
    }
}
