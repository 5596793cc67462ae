//! Tournament business logic: pairing, lifecycle transitions, standings.

mod lifecycle;
pub mod pairing;
mod standings;

pub use lifecycle::{finish_tournament, generate_entrants, record_results, start_tournament};
pub use pairing::{generate as generate_pairings, round_count, RoundPairings};
pub use standings::{compute_standings, determine_winner, Points, Standing, Standings, Winner};
