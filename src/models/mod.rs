//! Data structures for a round-robin tournament: entrants, rounds, matchups, tournament status.

mod entrant;
mod round;
mod tournament;

pub use entrant::{Entrant, EntrantId, EntrantPatch, NewEntrant, ENTRANT_NAME_LEN};
pub use round::{MatchResult, Matchup, MatchupId, ResultEntry, Round, RoundId};
pub use tournament::{
    Format, NewTournament, Resource, TimeControl, Tournament, TournamentError, TournamentId,
    TournamentPatch, TournamentStatus, CAPACITY_RANGE, LABEL_LEN,
};

/// Key used to compare tournament and entrant names: trimmed, Unicode lower-cased.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
