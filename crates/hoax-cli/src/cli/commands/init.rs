use crate::cli::args::{GlobalArgs, InitArgs};
use crate::exit_codes;
use hoax_core::config::write_sample_config;

pub fn run(global: &GlobalArgs, args: InitArgs) -> anyhow::Result<i32> {
    let path = &global.config;
    if path.exists() && !args.force {
        println!("Skipped {} (exists; use --force to overwrite)", path.display());
        return Ok(exit_codes::SUCCESS);
    }
    write_sample_config(path)?;
    println!("Created {}", path.display());
    Ok(exit_codes::SUCCESS)
}
