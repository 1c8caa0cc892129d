use super::{open_store, print_json};
use crate::cli::args::{GlobalArgs, OutputFormat, StatsArgs, StatsSub};
use crate::exit_codes;
use hoax_core::{FolderFilter, SessionId, StatsAggregator};

pub fn run(global: &GlobalArgs, args: StatsArgs) -> anyhow::Result<i32> {
    let (_, store) = open_store(global)?;
    let agg = StatsAggregator::new(&store);

    match args.cmd {
        StatsSub::Session {
            session_id,
            folder,
            format,
        } => {
            let session = SessionId::new(session_id)?;
            let stats = agg.session_stats(&session, FolderFilter::parse(folder.as_deref())?)?;
            match format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Text => println!(
                    "Session {}: {}/{} correct ({:.2}%)",
                    session, stats.correct, stats.total, stats.accuracy
                ),
            }
        }
        StatsSub::Stories { folder, format } => {
            let stats = agg.story_stats(FolderFilter::parse(folder.as_deref())?)?;
            match format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Text => {
                    println!("{:<6} {:>8} {:>8} {:>9}  EVENT", "ID", "ATTEMPTS", "CORRECT", "ACCURACY");
                    for s in &stats {
                        println!(
                            "{:<6} {:>8} {:>8} {:>8.2}%  {}",
                            s.story_id, s.total_attempts, s.correct, s.accuracy, s.event
                        );
                    }
                }
            }
        }
    }
    Ok(exit_codes::SUCCESS)
}
