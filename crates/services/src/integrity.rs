//! # Referential Integrity
//!
//! Checks run against current store state before any write. Each returns
//! early with the error the caller should surface; none of them mutate.

use domains::{CallerId, DomainError, Identifier, Result, StoreKey, User, IMAGE_URL_SCHEME};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::{ForumStore, StableMap};

/// A thread may only be created under an existing forum.
pub async fn require_forum(store: &ForumStore, forum_id: &Identifier) -> Result<()> {
    if store.forums.contains_key(forum_id).await? {
        Ok(())
    } else {
        Err(DomainError::validation("forum does not exist"))
    }
}

/// A message may only be posted into an existing thread.
pub async fn require_thread(store: &ForumStore, thread_id: &Identifier) -> Result<()> {
    if store.threads.contains_key(thread_id).await? {
        Ok(())
    } else {
        Err(DomainError::validation("thread does not exist"))
    }
}

/// The caller must already hold a profile.
pub async fn require_user(store: &ForumStore, caller: &CallerId) -> Result<User> {
    store
        .users
        .get(caller)
        .await?
        .ok_or_else(|| DomainError::not_found("User does not exist"))
}

/// The caller must not hold a profile yet.
pub async fn require_unregistered(store: &ForumStore, caller: &CallerId) -> Result<()> {
    if store.users.contains_key(caller).await? {
        Err(DomainError::conflict("User already exists"))
    } else {
        Ok(())
    }
}

pub fn check_image_url(image_url: &str) -> Result<()> {
    if image_url.starts_with(IMAGE_URL_SCHEME) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Image url must start with {IMAGE_URL_SCHEME}"
        )))
    }
}

/// A freshly generated key must not already be present; a collision aborts.
pub async fn require_vacant<K, V>(map: &StableMap<K, V>, key: &K) -> Result<()>
where
    K: StoreKey + Sync + std::fmt::Display,
    V: Serialize + DeserializeOwned + Sync,
{
    if map.contains_key(key).await? {
        Err(DomainError::conflict(format!(
            "identifier {key} already exists in {}",
            map.namespace().name()
        )))
    } else {
        Ok(())
    }
}
