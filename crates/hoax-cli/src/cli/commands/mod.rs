use super::args::*;
use anyhow::Context;
use hoax_core::config::{self, HoaxConfig};
use hoax_core::Store;

pub mod folder;
pub mod init;
pub mod play;
pub mod seed;
pub mod serve;
pub mod stats;
pub mod story;

use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let global = cli.global;
    match cli.cmd {
        Command::Serve(args) => serve::run(&global, args).await,
        Command::Init(args) => init::run(&global, args),
        Command::Seed => seed::run(&global),
        Command::Play(args) => play::run(&global, args),
        Command::Stats(args) => stats::run(&global, args),
        Command::Story(args) => story::run(&global, args),
        Command::Folder(args) => folder::run(&global, args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}

/// Config file (or defaults), with `--db` applied on top.
pub(crate) fn load_config(global: &GlobalArgs) -> anyhow::Result<HoaxConfig> {
    let mut cfg = config::load_or_default(&global.config)?;
    if let Some(db) = &global.db {
        cfg.database = db.clone();
    }
    Ok(cfg)
}

pub(crate) fn open_store(global: &GlobalArgs) -> anyhow::Result<(HoaxConfig, Store)> {
    let cfg = load_config(global)?;
    let store = Store::open(&cfg.database)
        .with_context(|| format!("failed to open database {}", cfg.database.display()))?;
    Ok((cfg, store))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
