//! Standings: scores recomputed from every recorded matchup result.

use crate::models::{
    Entrant, EntrantId, MatchResult, Resource, Tournament, TournamentError,
};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// A score, kept in half points so draws stay exact.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Points(u32);

impl Points {
    pub const ZERO: Points = Points(0);
    pub const DRAW: Points = Points(1);
    pub const WIN: Points = Points(2);

    pub fn from_half_points(half: u32) -> Self {
        Points(half)
    }

    pub fn half_points(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

impl Add for Points {
    type Output = Points;

    fn add(self, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Points {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 2 == 0 {
            write!(f, "{}", self.0 / 2)
        } else {
            write!(f, "{}.5", self.0 / 2)
        }
    }
}

impl Serialize for Points {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// One entrant's line in the table.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Standing {
    pub entrant_id: EntrantId,
    pub points: Points,
    pub played: u32,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

/// Scores of every registered entrant, in registration order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Standings {
    pub entries: Vec<Standing>,
}

impl Standings {
    pub fn get(&self, id: EntrantId) -> Option<&Standing> {
        self.entries.iter().find(|s| s.entrant_id == id)
    }

    pub fn points(&self, id: EntrantId) -> Option<Points> {
        self.get(id).map(|s| s.points)
    }

    /// Highest score first; entrants on equal points keep registration order.
    pub fn ranked(&self) -> Vec<&Standing> {
        let mut ranked: Vec<&Standing> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.points.cmp(&a.points));
        ranked
    }

    pub fn as_map(&self) -> HashMap<EntrantId, Points> {
        self.entries.iter().map(|s| (s.entrant_id, s.points)).collect()
    }
}

/// Winner of a tournament (or the current leader, if it is still running).
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Winner {
    pub entrant: Entrant,
    pub score: Points,
    /// Other entrants on the same score. The winner is the earliest registered of them all.
    pub tied_with: Vec<EntrantId>,
}

/// Score every registered entrant from scratch: win 1, draw 0.5 each, loss 0.
pub fn compute_standings(tournament: &Tournament) -> Result<Standings, TournamentError> {
    let mut entries: Vec<Standing> = tournament
        .entrants
        .iter()
        .map(|e| Standing {
            entrant_id: e.id,
            ..Standing::default()
        })
        .collect();
    let slot: HashMap<EntrantId, usize> = entries
        .iter()
        .enumerate()
        .map(|(i, s)| (s.entrant_id, i))
        .collect();
    let index_of = |id: EntrantId| {
        slot.get(&id)
            .copied()
            .ok_or(TournamentError::NotFound(Resource::Entrant(id)))
    };

    for m in tournament.matchups() {
        let first = index_of(m.first)?;
        let second = index_of(m.second)?;
        match m.result {
            MatchResult::NoResult => continue,
            MatchResult::FirstWins => {
                record_win(&mut entries, first, second);
            }
            MatchResult::SecondWins => {
                record_win(&mut entries, second, first);
            }
            MatchResult::Draw => {
                for i in [first, second] {
                    entries[i].points += Points::DRAW;
                    entries[i].draws += 1;
                }
            }
        }
        entries[first].played += 1;
        entries[second].played += 1;
    }

    Ok(Standings { entries })
}

fn record_win(entries: &mut [Standing], winner: usize, loser: usize) {
    entries[winner].points += Points::WIN;
    entries[winner].wins += 1;
    entries[loser].losses += 1;
}

/// The entrant with the most points. Ties go to the earliest registered entrant.
pub fn determine_winner(tournament: &Tournament) -> Result<Winner, TournamentError> {
    let standings = compute_standings(tournament)?;
    let no_entrants = || TournamentError::InvalidInput("tournament has no entrants".to_string());
    let best = standings
        .entries
        .iter()
        .map(|s| s.points)
        .max()
        .ok_or_else(no_entrants)?;

    let leaders: Vec<EntrantId> = standings
        .entries
        .iter()
        .filter(|s| s.points == best)
        .map(|s| s.entrant_id)
        .collect();
    let (&winner_id, rest) = leaders.split_first().ok_or_else(no_entrants)?;
    let tied_with = rest.to_vec();

    let entrant = tournament
        .entrant(winner_id)
        .cloned()
        .ok_or(TournamentError::NotFound(Resource::Entrant(winner_id)))?;
    if !tied_with.is_empty() {
        log::debug!(
            "Tournament {}: {} entrants tied on {}, earliest registered wins",
            tournament.id,
            tied_with.len() + 1,
            best
        );
    }
    Ok(Winner {
        entrant,
        score: best,
        tied_with,
    })
}
