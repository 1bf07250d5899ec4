//! Human-readable results of update operations, as handed back to callers.

use std::fmt;

use domains::{CallerId, Identifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    ForumCreated(Identifier),
    ThreadCreated(Identifier),
    MessageCreated(Identifier),
    UserCreated(CallerId),
    AvatarUpdated,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Receipt::ForumCreated(id) => write!(f, "Forum created - {id}"),
            Receipt::ThreadCreated(id) => write!(f, "Thread created - {id}"),
            Receipt::MessageCreated(id) => write!(f, "Message created - {id}"),
            Receipt::UserCreated(id) => write!(f, "User created - {id}"),
            Receipt::AvatarUpdated => f.write_str("Avatar updated"),
        }
    }
}
