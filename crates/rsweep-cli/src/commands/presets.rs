use std::error::Error;

use clap::Args;
use rsweep_core::LaunchError;
use rsweep_exp::{load_preset, preset_names, preset_source};

#[derive(Args, Debug)]
pub struct PresetsArgs {
    /// Print the YAML of this preset instead of the listing.
    #[arg(long)]
    pub show: Option<String>,
}

pub fn run(args: &PresetsArgs) -> Result<(), Box<dyn Error>> {
    if let Some(name) = &args.show {
        // Validates the name and reports the available presets.
        load_preset(name)?;
        if let Some(source) = preset_source(name) {
            print!("{source}");
        }
        return Ok(());
    }
    for name in preset_names() {
        let plan = load_preset(name)?;
        let stages = plan
            .stages
            .iter()
            .map(|stage| -> Result<String, LaunchError> {
                Ok(format!("{}({})", stage.name, stage.grid()?.len()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        println!("{name}\t{}", stages.join(" "));
    }
    Ok(())
}
