//! # Mutation Guard
//!
//! One in-flight flag per kind of update operation. A flag is raised as soon
//! as an operation of that kind is entered and lowered by [`MutationGuard`]'s
//! `Drop`, so it comes down on every exit path: success, `?` early return,
//! or panic.
//!
//! Each flag counts its holders, so calls still queued behind the service's
//! write lane keep it raised after the running call finishes. The flags are
//! diagnostic state and never block a caller.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreatingForum,
    CreatingThread,
    CreatingMessage,
    RegisteringUser,
    ChangingAvatar,
}

impl MutationKind {
    pub const ALL: [MutationKind; 5] = [
        MutationKind::CreatingForum,
        MutationKind::CreatingThread,
        MutationKind::CreatingMessage,
        MutationKind::RegisteringUser,
        MutationKind::ChangingAvatar,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MutationKind::CreatingForum => "creatingForum",
            MutationKind::CreatingThread => "creatingThread",
            MutationKind::CreatingMessage => "creatingMessage",
            MutationKind::RegisteringUser => "registeringUser",
            MutationKind::ChangingAvatar => "changingAvatar",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default)]
pub struct MutationFlags {
    flags: [AtomicUsize; MutationKind::ALL.len()],
}

impl MutationFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag for `kind` until the returned guard is dropped.
    #[must_use = "the flag is lowered as soon as the guard is dropped"]
    pub fn acquire(&self, kind: MutationKind) -> MutationGuard<'_> {
        let already = self.flags[kind.slot()].fetch_add(1, Ordering::SeqCst);
        if already > 0 {
            warn!(mutation = kind.name(), already, "re-entrant mutation observed");
        }
        MutationGuard { flags: self, kind }
    }

    pub fn is_set(&self, kind: MutationKind) -> bool {
        self.holders(kind) > 0
    }

    /// Number of calls of `kind` currently entered, running or queued.
    pub fn holders(&self, kind: MutationKind) -> usize {
        self.flags[kind.slot()].load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<(MutationKind, bool)> {
        MutationKind::ALL
            .into_iter()
            .map(|kind| (kind, self.is_set(kind)))
            .collect()
    }
}

/// Scoped in-flight marker returned by [`MutationFlags::acquire`].
#[derive(Debug)]
pub struct MutationGuard<'a> {
    flags: &'a MutationFlags,
    kind: MutationKind,
}

impl MutationGuard<'_> {
    pub fn kind(&self) -> MutationKind {
        self.kind
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.flags.flags[self.kind.slot()].fetch_sub(1, Ordering::SeqCst);
    }
}
