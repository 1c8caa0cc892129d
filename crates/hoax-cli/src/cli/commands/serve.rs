use super::open_store;
use crate::cli::args::{GlobalArgs, ServeArgs};
use crate::exit_codes;
use anyhow::Context;
use chrono::Utc;
use hoax_core::game::expire_stale_rounds;
use hoax_server::Router;
use std::net::SocketAddr;

pub async fn run(global: &GlobalArgs, args: ServeArgs) -> anyhow::Result<i32> {
    let (cfg, store) = open_store(global)?;
    let round_ttl = cfg.round_ttl();
    let bind = args.bind.unwrap_or(cfg.bind);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address {bind:?}"))?;

    if cfg.seed_on_start && !args.no_seed {
        hoax_core::seed::seed_if_empty(&store)?;
    }

    if let Some(ttl) = round_ttl {
        let removed = expire_stale_rounds(&store, ttl, Utc::now())?;
        tracing::info!(removed, "expired stale rounds");
    }

    tracing::info!(
        database = %cfg.database.display(),
        cookie = %cfg.cookie_name,
        round_ttl_secs = cfg.round_ttl_secs,
        "starting server"
    );
    let router = Router::new(store, cfg.cookie_name).with_round_ttl(round_ttl);
    hoax_server::serve(addr, router).await?;
    Ok(exit_codes::SUCCESS)
}
