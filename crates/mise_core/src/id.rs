//! Nodule identity.
//!
//! Nodules are opaque vertex handles carrying no payload. Generation is an
//! explicit, caller-supplied source rather than a process-wide counter, so
//! builds can be reproducible when the caller wants them to be.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Nodule identifier - identifies a graph vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nodule(Uuid);

impl Nodule {
    /// Create a new random Nodule
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID bytes
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Create from a 128-bit value
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Get as UUID
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for Nodule {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Nodule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nod_{}", self.0)
    }
}

/// Injective source of fresh nodules
pub trait NoduleSource {
    /// Produce a nodule distinct from every other this source has produced
    fn next_nodule(&mut self) -> Nodule;
}

/// Deterministic nodule source backed by a monotonic counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialNodules {
    next: u128,
}

impl SequentialNodules {
    /// Create a source starting at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoduleSource for SequentialNodules {
    fn next_nodule(&mut self) -> Nodule {
        let nodule = Nodule::from_u128(self.next);
        self.next += 1;
        nodule
    }
}

/// Nodule source producing random v4 identities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomNodules;

impl NoduleSource for RandomNodules {
    fn next_nodule(&mut self) -> Nodule {
        Nodule::new()
    }
}
