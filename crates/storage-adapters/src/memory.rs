//! # In-memory store
//!
//! One `BTreeMap` per namespace behind a single `RwLock`. Entries live as
//! long as the process; used for tests and ephemeral deployments.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use domains::{DomainError, KeyValueStore, Namespace, Result};

type Collection = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Indexed by `Namespace::id()`
    collections: RwLock<[Collection; 4]>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, [Collection; 4]>> {
        self.collections
            .read()
            .map_err(|_| DomainError::unexpected("memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, [Collection; 4]>> {
        self.collections
            .write()
            .map_err(|_| DomainError::unexpected("memory store lock poisoned"))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.read()?[ns.id() as usize].get(key).cloned())
    }

    async fn insert(&self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.write()?[ns.id() as usize].insert(key.to_vec(), value);
        Ok(())
    }

    async fn remove(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.write()?[ns.id() as usize].remove(key))
    }

    async fn contains_key(&self, ns: Namespace, key: &[u8]) -> Result<bool> {
        Ok(self.read()?[ns.id() as usize].contains_key(key))
    }

    async fn items(&self, ns: Namespace) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        Ok(self.read()?[ns.id() as usize]
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    async fn is_empty(&self, ns: Namespace) -> Result<bool> {
        Ok(self.read()?[ns.id() as usize].is_empty())
    }
}
