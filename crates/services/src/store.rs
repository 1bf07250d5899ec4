//! # Persistent Store
//!
//! Typed views over a raw [`KeyValueStore`]. Values are JSON-encoded; keys
//! are their raw bytes, so enumeration order is byte order of the key.

use std::marker::PhantomData;
use std::sync::Arc;

use domains::{
    CallerId, DomainError, Forum, Identifier, KeyValueStore, Message, Namespace, Result, StoreKey,
    Thread, User,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// One keyed collection inside a shared backend.
pub struct StableMap<K, V> {
    ns: Namespace,
    backend: Arc<dyn KeyValueStore>,
    _entry: PhantomData<fn() -> (K, V)>,
}

impl<K, V> StableMap<K, V>
where
    K: StoreKey + Sync,
    V: Serialize + DeserializeOwned + Sync,
{
    pub fn new(ns: Namespace, backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            ns,
            backend,
            _entry: PhantomData,
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.ns
    }

    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        match self.backend.get(self.ns, &key.to_key_bytes()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Overwrites any existing entry under `key`.
    pub async fn insert(&self, key: &K, value: &V) -> Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.insert(self.ns, &key.to_key_bytes(), bytes).await
    }

    pub async fn remove(&self, key: &K) -> Result<Option<V>> {
        match self.backend.remove(self.ns, &key.to_key_bytes()).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn contains_key(&self, key: &K) -> Result<bool> {
        self.backend.contains_key(self.ns, &key.to_key_bytes()).await
    }

    pub async fn items(&self) -> Result<Vec<(K, V)>> {
        self.backend
            .items(self.ns)
            .await?
            .into_iter()
            .map(|(k, v)| Ok((K::from_key_bytes(&k)?, serde_json::from_slice(&v)?)))
            .collect::<std::result::Result<Vec<_>, DomainError>>()
    }

    pub async fn is_empty(&self) -> Result<bool> {
        self.backend.is_empty(self.ns).await
    }
}

/// The four collections that make up the forum's persisted state.
///
/// Constructed once at startup and handed to the service; the sole owner of
/// entity state.
pub struct ForumStore {
    pub forums: StableMap<Identifier, Forum>,
    pub threads: StableMap<Identifier, Thread>,
    /// Keyed by thread id, in insertion order
    pub messages: StableMap<Identifier, Vec<Message>>,
    pub users: StableMap<CallerId, User>,
}

impl ForumStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            forums: StableMap::new(Namespace::Forums, backend.clone()),
            threads: StableMap::new(Namespace::Threads, backend.clone()),
            messages: StableMap::new(Namespace::Messages, backend.clone()),
            users: StableMap::new(Namespace::Users, backend),
        }
    }
}
