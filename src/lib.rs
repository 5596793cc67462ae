//! Round-robin tournament organizer: library with models, business logic, an in-memory registry
//! and the JSON API served by the `web` binary.

pub mod api;
pub mod config;
pub mod logic;
pub mod models;
pub mod registry;

pub use config::{EngineConfig, ServerConfig};
pub use logic::{
    compute_standings, determine_winner, finish_tournament, generate_entrants, generate_pairings,
    record_results, round_count, start_tournament, Points, RoundPairings, Standing, Standings,
    Winner,
};
pub use models::{
    Entrant, EntrantId, EntrantPatch, Format, MatchResult, Matchup, MatchupId, NewEntrant,
    NewTournament, Resource, ResultEntry, Round, RoundId, TimeControl, Tournament,
    TournamentError, TournamentId, TournamentPatch, TournamentStatus,
};
pub use registry::{ListQuery, SortOrder, TournamentRegistry};
