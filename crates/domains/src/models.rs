//! # Domain Models
//!
//! These structs represent the core entities of the forum: forums, threads,
//! messages and user profiles. Forums, threads and messages are keyed by a
//! random 29-byte [`Identifier`]; users are keyed by the caller's identity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Size in bytes of every generated identifier.
pub const IDENTIFIER_LEN: usize = 29;

/// Maximum size in bytes of a caller identity token.
pub const MAX_CALLER_ID_LEN: usize = 29;

/// Image URLs attached to messages must use this scheme.
pub const IMAGE_URL_SCHEME: &str = "ipfs://";

/// Opaque primary key for forums, threads and messages.
///
/// Compared only for equality and byte order. The text form is lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier([u8; IDENTIFIER_LEN]);

impl Identifier {
    pub const fn from_bytes(bytes: [u8; IDENTIFIER_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFIER_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Identifier {
    type Error = DomainError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; IDENTIFIER_LEN] = bytes.try_into().map_err(|_| {
            DomainError::validation(format!(
                "identifier must be {IDENTIFIER_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl FromStr for Identifier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| DomainError::validation(format!("malformed identifier {s:?}: {e}")))?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<String> for Identifier {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({self})")
    }
}

/// The already-verified identity of whoever issued the current call.
///
/// Supplied by the host; this crate never authenticates it. Users are keyed
/// by this value and every message records it as the author.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerId(Vec<u8>);

impl CallerId {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for CallerId {
    type Error = DomainError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.is_empty() || bytes.len() > MAX_CALLER_ID_LEN {
            return Err(DomainError::validation(format!(
                "caller identity must be 1..={MAX_CALLER_ID_LEN} bytes, got {}",
                bytes.len()
            )));
        }
        Ok(Self(bytes.to_vec()))
    }
}

impl FromStr for CallerId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)
            .map_err(|e| DomainError::validation(format!("malformed caller identity {s:?}: {e}")))?;
        Self::try_from(bytes.as_slice())
    }
}

impl TryFrom<String> for CallerId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CallerId> for String {
    fn from(id: CallerId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl fmt::Debug for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallerId({self})")
    }
}

/// Privilege level of a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    RegularUser,
    Admin,
}

/// A registered profile. One per caller identity; only `avatar` ever changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: CallerId,
    pub name: String,
    /// Avatar URI, stored verbatim
    pub avatar: String,
    pub role: Role,
}

/// A top-level discussion category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forum {
    pub id: Identifier,
    pub name: String,
    pub description: String,
}

/// A discussion topic inside exactly one forum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: Identifier,
    pub name: String,
    pub description: String,
    pub forum_id: Identifier,
}

/// A single post inside a thread.
///
/// Stored in the per-thread sequence in creation order; `timestamp` is
/// informational and may disagree with that order under clock skew.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Identifier,
    pub content: String,
    /// Seconds since the Unix epoch
    pub timestamp: u64,
    pub image_url: String,
    pub user_id: CallerId,
    pub thread_id: Identifier,
}
