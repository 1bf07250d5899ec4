//! # Core Traits (Ports)
//!
//! Any storage backend, identifier source or clock must implement these
//! traits to be plugged into the services layer.

use async_trait::async_trait;

use crate::errors::{DomainError, Result};
use crate::models::{CallerId, Identifier};

/// The four keyed collections, addressed by fixed small-integer ids.
///
/// The numeric ids are part of the persisted layout and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    Forums = 0,
    Threads = 1,
    /// Keyed by thread id; value is the ordered message sequence
    Messages = 2,
    /// Keyed by caller identity
    Users = 3,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Forums,
        Namespace::Threads,
        Namespace::Messages,
        Namespace::Users,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            Namespace::Forums => "forums",
            Namespace::Threads => "threads",
            Namespace::Messages => "messages",
            Namespace::Users => "users",
        }
    }
}

impl TryFrom<u8> for Namespace {
    type Error = DomainError;

    fn try_from(id: u8) -> Result<Self> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.id() == id)
            .ok_or_else(|| DomainError::unexpected(format!("unknown namespace id {id}")))
    }
}

/// Raw durable keyed storage.
///
/// Keys and values are opaque bytes; `items` must yield entries in ascending
/// byte order of the key. `insert` overwrites, so callers that must not
/// clobber an entry check `contains_key` first.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>>;
    async fn insert(&self, ns: Namespace, key: &[u8], value: Vec<u8>) -> Result<()>;
    /// Returns the removed value, if any.
    async fn remove(&self, ns: Namespace, key: &[u8]) -> Result<Option<Vec<u8>>>;
    async fn contains_key(&self, ns: Namespace, key: &[u8]) -> Result<bool>;
    async fn items(&self, ns: Namespace) -> Result<Vec<(Vec<u8>, Vec<u8>)>>;
    async fn is_empty(&self, ns: Namespace) -> Result<bool>;
}

/// Source of fresh entity identifiers.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdGenerator: Send + Sync {
    /// Uniqueness is probabilistic; callers check for collisions.
    fn generate(&self) -> Result<Identifier>;
}

/// Wall clock used to stamp messages.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> u64;
}

/// Byte encoding of a collection key. Byte order is key order.
pub trait StoreKey: Sized {
    fn to_key_bytes(&self) -> Vec<u8>;
    fn from_key_bytes(bytes: &[u8]) -> Result<Self>;
}

impl StoreKey for Identifier {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        Identifier::try_from(bytes).map_err(|e| DomainError::unexpected(e.message()))
    }
}

impl StoreKey for CallerId {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        CallerId::try_from(bytes).map_err(|e| DomainError::unexpected(e.message()))
    }
}
