//! Identity tags for addressing entities across a deserialization batch
//!
//! Entity handles are only meaningful inside the scene that issued them.
//! Anything that has to survive a save/load cycle refers to an entity by its
//! identity tag instead; the tag is resolved back to a live handle once the
//! whole batch has been reconstructed.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique, regenerable identifier for a serialisable entity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityTag(Uuid);

impl IdentityTag {
    /// Create a new random tag
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create from a raw 128-bit value (deterministic tags for tests and tooling)
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Parse from the hyphenated string form
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }

    /// Get the underlying UUID
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Replace this tag with a fresh random one
    pub fn regenerate(&mut self) {
        self.0 = Uuid::new_v4();
    }
}

impl Default for IdentityTag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityTag({})", self.0)
    }
}

impl fmt::Display for IdentityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IdentityTag {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
