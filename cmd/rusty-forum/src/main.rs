//! # rusty-forum
//!
//! Host binary: loads settings, opens the configured store once, and runs a
//! single forum operation on behalf of `--caller`.

mod cli;

use std::sync::Arc;

use clap::Parser;
use configs::{LogFormat, LogSettings, Settings, StorageBackend, StorageSettings};
use domains::KeyValueStore;
use services::ForumService;
use storage_adapters::MemoryStore;
use tracing_subscriber::EnvFilter;

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn open_backend(storage: &StorageSettings) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    match storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("memory backend selected; nothing will outlive this process");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "db-sqlite")]
        StorageBackend::Sqlite => Ok(Arc::new(
            storage_adapters::SqliteStore::new(&storage.database_url).await?,
        )),
        #[cfg(not(feature = "db-sqlite"))]
        StorageBackend::Sqlite => anyhow::bail!("built without the db-sqlite feature"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    init_tracing(&settings.log);

    let service = ForumService::new(open_backend(&settings.storage).await?);
    let output = cli::dispatch(&service, args.caller.as_ref(), args.command).await?;
    println!("{output}");
    Ok(())
}
