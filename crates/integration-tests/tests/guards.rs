use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use domains::{KeyValueStore, Namespace, Result};
use integration_tests::{caller, forum_with_thread};
use services::{ForumService, MutationKind};
use storage_adapters::MemoryStore;
use tokio::sync::Notify;

/// Memory store whose writes park until the test lets them through.
#[derive(Default)]
struct GatedStore {
    inner: MemoryStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl KeyValueStore for GatedStore {
    async fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.get(ns, key).await
    }

    async fn insert(&self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.insert(ns, key, value).await
    }

    async fn remove(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.inner.remove(ns, key).await
    }

    async fn contains_key(&self, ns: Namespace, key: &[u8]) -> Result<bool> {
        self.inner.contains_key(ns, key).await
    }

    async fn items(&self, ns: Namespace) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        self.inner.items(ns).await
    }

    async fn is_empty(&self, ns: Namespace) -> Result<bool> {
        self.inner.is_empty(ns).await
    }
}

#[tokio::test]
async fn flag_is_raised_while_write_is_pending() {
    let gate = Arc::new(GatedStore::default());
    let service = Arc::new(ForumService::new(gate.clone()));

    let task = tokio::spawn({
        let service = service.clone();
        async move { service.create_forum("slow".into(), "gated".into()).await }
    });

    gate.entered.notified().await;
    assert!(service.in_flight(MutationKind::CreatingForum));
    assert!(!service.in_flight(MutationKind::CreatingThread));
    // queries are never blocked by an in-flight update
    assert!(service.get_forums().await.unwrap().is_empty());

    gate.release.notify_one();
    let id = task.await.unwrap().unwrap();

    assert!(!service.in_flight(MutationKind::CreatingForum));
    assert_eq!(service.get_forum(&id).await.unwrap().name, "slow");
}

#[tokio::test]
async fn queued_update_keeps_flag_raised() {
    let gate = Arc::new(GatedStore::default());
    let service = Arc::new(ForumService::new(gate.clone()));
    let spawn_create = |name: &'static str| {
        let service = service.clone();
        tokio::spawn(async move { service.create_forum(name.into(), "gated".into()).await })
    };

    let running = spawn_create("running");
    gate.entered.notified().await;
    let queued = spawn_create("queued");
    while service.mutation_flags().holders(MutationKind::CreatingForum) < 2 {
        tokio::task::yield_now().await;
    }

    // the running call finishes while the queued one waits on the lane
    gate.release.notify_one();
    running.await.unwrap().unwrap();
    gate.entered.notified().await;
    assert!(service.in_flight(MutationKind::CreatingForum));
    assert_eq!(service.mutation_flags().holders(MutationKind::CreatingForum), 1);

    gate.release.notify_one();
    queued.await.unwrap().unwrap();
    assert!(!service.in_flight(MutationKind::CreatingForum));
    assert_eq!(service.get_forums().await.unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_appends_are_not_lost() {
    let service = Arc::new(ForumService::new(Arc::new(MemoryStore::new())));
    let (_, thread) = forum_with_thread(&service).await.unwrap();

    let tasks: Vec<_> = (0..32u8)
        .map(|n| {
            let service = service.clone();
            tokio::spawn(async move {
                let author = caller(&format!("{n:02x}"));
                service
                    .create_message(&author, format!("post {n}"), "ipfs://x".into(), thread)
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap());
    }

    let messages = service.get_thread_messages(&thread).await.unwrap();
    assert_eq!(messages.len(), 32);
    assert_eq!(messages.iter().map(|m| m.id).collect::<HashSet<_>>(), ids);
    for kind in MutationKind::ALL {
        assert!(!service.in_flight(kind), "{kind} left raised");
    }
}

#[tokio::test]
async fn failures_leave_every_flag_lowered() {
    let service = ForumService::new(Arc::new(MemoryStore::new()));
    let ghost = caller("ff");

    let (_, thread) = forum_with_thread(&service).await.unwrap();
    assert!(service.change_avatar(&ghost, "ipfs://a".into()).await.is_err());
    assert!(service
        .create_message(&ghost, "x".into(), "https://nope".into(), thread)
        .await
        .is_err());
    service.register(&ghost, "g".into(), "ipfs://g".into()).await.unwrap();
    assert!(service.register(&ghost, "g".into(), "ipfs://g".into()).await.is_err());

    assert!(service.mutation_flags().snapshot().iter().all(|(_, set)| !set));
}
