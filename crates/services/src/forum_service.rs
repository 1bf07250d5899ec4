//! # ForumService
//!
//! The query and update surface over a [`ForumStore`].
//!
//! Update operations follow one shape: raise the guard flag for their kind,
//! take the write lane, validate against current state, generate an
//! identifier when creating, then perform exactly one store write. Any
//! failure before that write leaves the store untouched, and the guard is
//! lowered on every exit path. Queries read the store directly.

use std::sync::Arc;

use domains::{
    CallerId, Clock, DomainError, Forum, IdGenerator, Identifier, KeyValueStore, Message, Result,
    Role, Thread, User,
};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::clock::SystemClock;
use crate::guard::{MutationFlags, MutationKind};
use crate::ids::RandomIdGenerator;
use crate::integrity;
use crate::store::ForumStore;

pub struct ForumService {
    store: ForumStore,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    flags: MutationFlags,
    /// Serializes update operations; store ports may suspend mid-operation.
    write_lane: Mutex<()>,
}

impl ForumService {
    /// Builds a service over `backend` with OS randomness and wall-clock time.
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_parts(backend, Arc::new(RandomIdGenerator), Arc::new(SystemClock))
    }

    pub fn with_parts(
        backend: Arc<dyn KeyValueStore>,
        ids: Arc<dyn IdGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: ForumStore::new(backend),
            ids,
            clock,
            flags: MutationFlags::new(),
            write_lane: Mutex::new(()),
        }
    }

    /// Whether an update of `kind` is currently in progress.
    pub fn in_flight(&self, kind: MutationKind) -> bool {
        self.flags.is_set(kind)
    }

    pub fn mutation_flags(&self) -> &MutationFlags {
        &self.flags
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub async fn get_forums(&self) -> Result<Vec<(Identifier, Forum)>> {
        self.store.forums.items().await
    }

    pub async fn get_forum(&self, id: &Identifier) -> Result<Forum> {
        self.store
            .forums
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Forum does not exist"))
    }

    pub async fn get_threads(&self) -> Result<Vec<(Identifier, Thread)>> {
        self.store.threads.items().await
    }

    pub async fn get_thread(&self, id: &Identifier) -> Result<Thread> {
        self.store
            .threads
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Thread does not exist"))
    }

    /// Messages of one thread in creation order.
    ///
    /// An unknown thread and a thread nobody has posted in yet both report
    /// `NotFound`.
    pub async fn get_thread_messages(&self, thread_id: &Identifier) -> Result<Vec<Message>> {
        self.store
            .messages
            .get(thread_id)
            .await?
            .ok_or_else(|| DomainError::not_found("No messages in thread"))
    }

    pub async fn get_messages(&self) -> Result<Vec<(Identifier, Vec<Message>)>> {
        self.store.messages.items().await
    }

    pub async fn get_users(&self) -> Result<Vec<(CallerId, User)>> {
        self.store.users.items().await
    }

    pub async fn get_user(&self, id: &CallerId) -> Result<User> {
        self.store
            .users
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User with id={id} not found")))
    }

    // ── Updates ─────────────────────────────────────────────────────────────

    #[instrument(skip_all, err)]
    pub async fn create_forum(&self, name: String, description: String) -> Result<Identifier> {
        let _guard = self.flags.acquire(MutationKind::CreatingForum);
        let _lane = self.write_lane.lock().await;

        let id = self.ids.generate()?;
        integrity::require_vacant(&self.store.forums, &id).await?;

        let forum = Forum {
            id,
            name,
            description,
        };
        self.store.forums.insert(&id, &forum).await?;
        info!(%id, "forum created");
        Ok(id)
    }

    #[instrument(skip_all, fields(forum_id = %forum_id), err)]
    pub async fn create_thread(
        &self,
        name: String,
        description: String,
        forum_id: Identifier,
    ) -> Result<Identifier> {
        let _guard = self.flags.acquire(MutationKind::CreatingThread);
        let _lane = self.write_lane.lock().await;

        integrity::require_forum(&self.store, &forum_id).await?;
        let id = self.ids.generate()?;
        integrity::require_vacant(&self.store.threads, &id).await?;

        let thread = Thread {
            id,
            name,
            description,
            forum_id,
        };
        self.store.threads.insert(&id, &thread).await?;
        info!(%id, "thread created");
        Ok(id)
    }

    /// Appends a message authored by `caller` to the end of the thread.
    #[instrument(skip_all, fields(caller = %caller, thread_id = %thread_id), err)]
    pub async fn create_message(
        &self,
        caller: &CallerId,
        content: String,
        image_url: String,
        thread_id: Identifier,
    ) -> Result<Identifier> {
        let _guard = self.flags.acquire(MutationKind::CreatingMessage);
        let _lane = self.write_lane.lock().await;

        integrity::check_image_url(&image_url)?;
        integrity::require_thread(&self.store, &thread_id).await?;

        let mut sequence = self.store.messages.get(&thread_id).await?.unwrap_or_default();
        let id = self.ids.generate()?;
        if sequence.iter().any(|m| m.id == id) {
            return Err(DomainError::conflict(format!(
                "identifier {id} already exists in thread {thread_id}"
            )));
        }

        sequence.push(Message {
            id,
            content,
            timestamp: self.clock.now_secs(),
            image_url,
            user_id: caller.clone(),
            thread_id,
        });
        self.store.messages.insert(&thread_id, &sequence).await?;
        info!(%id, position = sequence.len(), "message created");
        Ok(id)
    }

    /// Creates the caller's profile. The very first registrant becomes admin.
    #[instrument(skip_all, fields(caller = %caller), err)]
    pub async fn register(&self, caller: &CallerId, name: String, avatar: String) -> Result<User> {
        let _guard = self.flags.acquire(MutationKind::RegisteringUser);
        let _lane = self.write_lane.lock().await;

        integrity::require_unregistered(&self.store, caller).await?;
        let role = if self.store.users.is_empty().await? {
            Role::Admin
        } else {
            Role::RegularUser
        };

        let user = User {
            id: caller.clone(),
            name,
            avatar,
            role,
        };
        self.store.users.insert(caller, &user).await?;
        info!(?role, "user registered");
        Ok(user)
    }

    /// Replaces the caller's avatar and nothing else.
    #[instrument(skip_all, fields(caller = %caller), err)]
    pub async fn change_avatar(&self, caller: &CallerId, avatar: String) -> Result<User> {
        let _guard = self.flags.acquire(MutationKind::ChangingAvatar);
        let _lane = self.write_lane.lock().await;

        let mut user = integrity::require_user(&self.store, caller).await?;
        user.avatar = avatar;
        self.store.users.insert(caller, &user).await?;
        info!("avatar updated");
        Ok(user)
    }
}
