//! Round, Matchup and MatchResult.

use crate::models::entrant::EntrantId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a round.
pub type RoundId = Uuid;

/// Unique identifier for a matchup.
pub type MatchupId = Uuid;

/// Outcome of a matchup.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchResult {
    #[default]
    NoResult,
    FirstWins,
    SecondWins,
    Draw,
}

impl MatchResult {
    pub fn is_resolved(self) -> bool {
        self != MatchResult::NoResult
    }
}

/// A single contest between two entrants. Byes never become matchups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: MatchupId,
    pub round_id: RoundId,
    /// Entrant who moves first (white in chess).
    pub first: EntrantId,
    pub second: EntrantId,
    pub result: MatchResult,
}

impl Matchup {
    pub fn new(round_id: RoundId, first: EntrantId, second: EntrantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            round_id,
            first,
            second,
            result: MatchResult::NoResult,
        }
    }

    pub fn involves(&self, entrant: EntrantId) -> bool {
        self.first == entrant || self.second == entrant
    }
}

/// One scheduled set of simultaneous matchups.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    /// 1-based, in pairing order.
    pub number: u32,
    pub matchups: Vec<Matchup>,
}

impl Round {
    /// Build a round and its matchups from `(first, second)` pairs.
    pub fn new(number: u32, pairings: &[(EntrantId, EntrantId)]) -> Self {
        let id = Uuid::new_v4();
        let matchups = pairings
            .iter()
            .map(|&(first, second)| Matchup::new(id, first, second))
            .collect();
        Self {
            id,
            number,
            matchups,
        }
    }

    pub fn matchup_mut(&mut self, id: MatchupId) -> Option<&mut Matchup> {
        self.matchups.iter_mut().find(|m| m.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.matchups.iter().all(|m| m.result.is_resolved())
    }
}

/// A submitted result for one matchup of a round.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub matchup_id: MatchupId,
    pub result: MatchResult,
}
