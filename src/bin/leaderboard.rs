//! Leaderboard HTTP server.
//!
//! Configuration comes from `BRAINBOX_*` environment variables; flags given
//! on the command line take precedence.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use brainbox::leaderboard::{open_repository, run_server, ServerConfig, StoreBackend};

#[derive(Parser, Debug)]
#[command(name = "brainbox-leaderboard", version, about = "Brain Box score API")]
struct Args {
    #[arg(long)]
    host: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// `sorted-set` or `blob`
    #[arg(long)]
    store: Option<StoreBackend>,
    /// Persist scores to this JSON file instead of memory
    #[arg(long)]
    data_path: Option<PathBuf>,
    #[arg(long)]
    allowed_origin: Option<String>,
    /// Largest accepted request body in bytes
    #[arg(long)]
    max_body: Option<usize>,
}

impl Args {
    fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(store) = self.store {
            config.backend = store;
        }
        if let Some(path) = self.data_path {
            config.data_path = Some(path);
        }
        if let Some(origin) = self.allowed_origin {
            config.allowed_origin = origin;
        }
        if let Some(max_body) = self.max_body {
            config.max_body = max_body;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();

    let config = Args::parse().apply(ServerConfig::from_env());
    log::info!(
        "store backend {:?}, data {}",
        config.backend,
        config
            .data_path
            .as_ref()
            .map_or("in memory".to_string(), |p| p.display().to_string())
    );
    let repo = open_repository(&config)?;

    run_server(config, repo, None, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await?;

    log::info!("leaderboard stopped");
    Ok(())
}
