use std::error::Error;

use clap::Args;
use rsweep_core::sanitize_all;

#[derive(Args, Debug)]
pub struct SanitizeArgs {
    /// Identifiers such as `evaluating_rewards/PointMassLine-v0`.
    #[arg(required = true)]
    pub identifiers: Vec<String>,
}

pub fn run(args: &SanitizeArgs) -> Result<(), Box<dyn Error>> {
    for pair in sanitize_all(args.identifiers.iter().cloned()) {
        println!("{}\t{}", pair.raw, pair.sanitized);
    }
    Ok(())
}
