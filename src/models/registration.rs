//! Registration: a player entry in a category.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a registration (used in matches and lookups).
pub type RegistrationId = Uuid;

/// A player registered in a tournament category.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub name: String,
    /// Seeding rank (1 = top seed), unique within the category. None means unseeded.
    pub seed: Option<u32>,
}

impl Registration {
    /// Create an unseeded registration with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            seed: None,
        }
    }

    /// Create a seeded registration.
    pub fn seeded(name: impl Into<String>, seed: u32) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(name)
        }
    }

    pub fn is_seeded(&self) -> bool {
        matches!(self.seed, Some(s) if s > 0)
    }
}
