//! # services
//!
//! Forum operations on top of the `domains` ports: typed collections,
//! identifier generation, integrity checks and in-flight mutation guards.

pub mod clock;
pub mod forum_service;
pub mod guard;
pub mod ids;
pub mod integrity;
pub mod receipt;
pub mod store;

pub use clock::SystemClock;
pub use forum_service::ForumService;
pub use guard::{MutationFlags, MutationGuard, MutationKind};
pub use ids::RandomIdGenerator;
pub use receipt::Receipt;
pub use store::{ForumStore, StableMap};
