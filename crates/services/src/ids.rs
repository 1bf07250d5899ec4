//! # Identifier Generator
//!
//! Fresh 29-byte identifiers straight from the operating system CSPRNG.
//! 232 bits of entropy makes collisions improbable, not impossible; the
//! service checks for them before every insert.

use domains::{DomainError, IdGenerator, Identifier, Result, IDENTIFIER_LEN};

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> Result<Identifier> {
        let mut bytes = [0u8; IDENTIFIER_LEN];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| DomainError::unexpected(format!("entropy source failed: {e}")))?;
        Ok(Identifier::from_bytes(bytes))
    }
}
