//! Entrant and EntrantPatch data structures.

use crate::models::tournament::TournamentError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an entrant (used in matchups and lookups).
pub type EntrantId = Uuid;

/// Allowed display name length, in characters, after trimming.
pub const ENTRANT_NAME_LEN: std::ops::RangeInclusive<usize> = 3..=25;

/// A participant in the tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: EntrantId,
    pub name: String,
    pub rating: u32,
}

impl Entrant {
    /// Create a new entrant with a fresh id. The name is trimmed but not validated.
    pub fn new(name: impl Into<String>, rating: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            rating,
        }
    }

    /// Check name length; uniqueness is the tournament's concern.
    pub fn validate(&self) -> Result<(), TournamentError> {
        validate_entrant_name(&self.name)
    }

    /// Apply a patch field by field. Fields left as `None` are untouched.
    pub fn apply(&mut self, patch: EntrantPatch) {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
    }
}

/// Request to register an entrant.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewEntrant {
    pub name: String,
    #[serde(default)]
    pub rating: u32,
}

/// The fields of an entrant that may be changed after registration.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct EntrantPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<u32>,
}

pub(crate) fn validate_entrant_name(name: &str) -> Result<(), TournamentError> {
    let len = name.trim().chars().count();
    if !ENTRANT_NAME_LEN.contains(&len) {
        return Err(TournamentError::InvalidInput(format!(
            "entrant name must be {} to {} characters long",
            ENTRANT_NAME_LEN.start(),
            ENTRANT_NAME_LEN.end()
        )));
    }
    Ok(())
}
