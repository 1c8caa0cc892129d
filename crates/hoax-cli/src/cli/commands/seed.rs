use super::open_store;
use crate::cli::args::GlobalArgs;
use crate::exit_codes;

pub fn run(global: &GlobalArgs) -> anyhow::Result<i32> {
    let (_, store) = open_store(global)?;
    let report = hoax_core::seed::seed_if_empty(&store)?;
    if report.stories_created == 0 {
        println!("Database already has stories; nothing seeded.");
    } else {
        println!(
            "Seeded {} stories and {} folders.",
            report.stories_created, report.folders_created
        );
    }
    Ok(exit_codes::SUCCESS)
}
