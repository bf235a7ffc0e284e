#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use revassign_directory::MemoryStore;
use revassign_server::{ServerConfig, ServerError, run_server};

#[derive(Parser)]
#[command(name = "revassign")]
#[command(about = "Assign and reassign pull request reviewers within teams", long_about = None)]
struct Cli {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Milliseconds a single store call may take before the request fails
    #[arg(long, env = "STORE_TIMEOUT_MS", default_value_t = 2000)]
    store_timeout_ms: u64,

    /// Seed for reviewer draws, for reproducible runs
    #[arg(long, env = "REVIEWER_SEED")]
    seed: Option<u64>,

    /// JSON snapshot to load on start and rewrite after every change
    #[arg(long, env = "DATA_FILE", conflicts_with = "persist")]
    data_file: Option<PathBuf>,

    /// Keep the snapshot in the user data directory
    #[arg(long)]
    persist: bool,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ServerError> {
        let data_file = match (self.data_file, self.persist) {
            (Some(path), _) => Some(path),
            (None, true) => Some(MemoryStore::default_snapshot_path()?),
            (None, false) => None,
        };

        Ok(ServerConfig::new(self.host, self.port)
            .with_store_timeout(Duration::from_millis(self.store_timeout_ms))
            .with_reviewer_seed(self.seed)
            .with_data_file(data_file))
    }
}

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    env_logger::init();

    let config = Cli::parse().into_config()?;

    if config.reviewer_seed.is_some() {
        log::info!("Reviewer draws are seeded; assignments are reproducible");
    }

    run_server(config).await
}
