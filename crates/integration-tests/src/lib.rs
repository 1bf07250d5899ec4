//! Shared fixtures for the workspace integration tests.

use std::sync::Arc;

use domains::{CallerId, Identifier, KeyValueStore};
use services::ForumService;
use storage_adapters::{MemoryStore, SqliteStore};

/// One service per available backend, each over an empty store.
pub async fn services_per_backend() -> anyhow::Result<Vec<(&'static str, ForumService)>> {
    let memory: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let sqlite: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new("sqlite::memory:").await?);
    Ok(vec![
        ("memory", ForumService::new(memory)),
        ("sqlite", ForumService::new(sqlite)),
    ])
}

pub fn caller(hex: &str) -> CallerId {
    hex.parse().expect("fixture caller ids are valid hex")
}

/// Creates a forum and a thread inside it, returning both ids.
pub async fn forum_with_thread(service: &ForumService) -> anyhow::Result<(Identifier, Identifier)> {
    let forum = service
        .create_forum("general".into(), "anything goes".into())
        .await?;
    let thread = service
        .create_thread("intro".into(), "say hi".into(), forum)
        .await?;
    Ok((forum, thread))
}
