use super::{open_store, print_json};
use crate::cli::args::{FolderArgs, FolderSub, GlobalArgs, OutputFormat};
use crate::exit_codes;

pub fn run(global: &GlobalArgs, args: FolderArgs) -> anyhow::Result<i32> {
    let (_, store) = open_store(global)?;

    match args.cmd {
        FolderSub::List { search, format } => {
            let folders = match search {
                Some(q) => store.search_folders(&q)?,
                None => store.list_folders()?,
            };
            match format {
                OutputFormat::Json => print_json(&folders)?,
                OutputFormat::Text => {
                    for f in &folders {
                        println!("{:>4}  {:<30} {} stories", f.id, f.name, f.story_count);
                    }
                }
            }
        }
        FolderSub::Add { name } => {
            let f = store.create_folder(&name)?;
            println!("Created folder {} ({})", f.id, f.name);
        }
        FolderSub::Rename { id, name } => {
            let f = store.rename_folder(id, &name)?;
            println!("Renamed folder {} to {}", f.id, f.name);
        }
        FolderSub::Delete { id } => {
            let moved = store.delete_folder(id)?;
            println!("Deleted folder {id}; moved {moved} stories to General");
        }
    }
    Ok(exit_codes::SUCCESS)
}
