//! Lifecycle: start (NotStarted -> Ongoing), record results, finish (Ongoing -> Finished),
//! and placeholder entrant generation.
//!
//! Every function either applies fully or returns an error with the tournament untouched.

use crate::config::EngineConfig;
use crate::logic::pairing;
use crate::models::{
    EntrantId, NewEntrant, Resource, ResultEntry, Round, Tournament, TournamentError,
    TournamentStatus,
};
use rand::Rng;
use std::collections::HashSet;

/// Start the tournament: pair every registered entrant and create all rounds at once.
///
/// Entrants are paired in registration order; `DoubleRoundRobin` adds the mirrored
/// second cycle. Rounds are numbered from 1 in pairing order and every matchup starts
/// with no result.
pub fn start_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::NotStarted {
        return Err(TournamentError::InvalidTransition {
            status: tournament.status,
            action: "start",
        });
    }
    let double_cycle = tournament.format.double_cycle().ok_or_else(|| {
        TournamentError::InvalidInput(format!(
            "{} pairing is not supported",
            tournament.format.label()
        ))
    })?;

    let schedule = pairing::generate(&tournament.entrant_ids(), double_cycle)?;
    let rounds: Vec<Round> = schedule
        .iter()
        .zip(1..)
        .map(|(pairings, number)| Round::new(number, pairings))
        .collect();

    log::info!(
        "Starting tournament {} ({}): {} entrants, {} rounds",
        tournament.id,
        tournament.name,
        tournament.entrants.len(),
        rounds.len()
    );
    tournament.rounds = rounds;
    tournament.status = TournamentStatus::Ongoing;
    Ok(())
}

/// Overwrite the results of matchups in one round. Returns how many distinct matchups
/// were updated.
///
/// Ids that are not matchups of this round are skipped. A matchup listed more than once
/// keeps its last result. Results cannot change once the tournament is finished.
pub fn record_results(
    tournament: &mut Tournament,
    round_number: u32,
    results: &[ResultEntry],
) -> Result<usize, TournamentError> {
    if tournament.status == TournamentStatus::Finished {
        return Err(TournamentError::InvalidTransition {
            status: tournament.status,
            action: "record results for",
        });
    }
    let id = tournament.id;
    let round = tournament
        .round_mut(round_number)
        .ok_or(TournamentError::NotFound(Resource::Round(round_number)))?;

    let mut updated = HashSet::new();
    for entry in results {
        match round.matchup_mut(entry.matchup_id) {
            Some(m) => {
                m.result = entry.result;
                updated.insert(m.id);
            }
            None => log::debug!(
                "Tournament {} round {}: ignoring unknown matchup {}",
                id,
                round_number,
                entry.matchup_id
            ),
        }
    }
    log::debug!(
        "Tournament {} round {}: recorded {} of {} submitted results",
        id,
        round_number,
        updated.len(),
        results.len()
    );
    Ok(updated.len())
}

/// Finish the tournament. Every matchup must have a result.
pub fn finish_tournament(tournament: &mut Tournament) -> Result<(), TournamentError> {
    if tournament.status != TournamentStatus::Ongoing {
        return Err(TournamentError::InvalidTransition {
            status: tournament.status,
            action: "finish",
        });
    }
    let unresolved = tournament.unresolved_matchups();
    if unresolved > 0 {
        return Err(TournamentError::IncompleteResults { unresolved });
    }
    tournament.status = TournamentStatus::Finished;
    log::info!("Finished tournament {} ({})", tournament.id, tournament.name);
    Ok(())
}

/// Fill the roster up to capacity with placeholder entrants. Returns the ids created.
///
/// Names are `config.placeholder_prefix` plus a sequence number, skipping names already
/// taken; ratings are drawn from `config.rating_range`. Does nothing when the roster is
/// already full. Not gated by status: entrants added after start are not paired.
pub fn generate_entrants<R: Rng + ?Sized>(
    tournament: &mut Tournament,
    config: &EngineConfig,
    rng: &mut R,
) -> Result<Vec<EntrantId>, TournamentError> {
    if config.rating_range.is_empty() {
        return Err(TournamentError::InvalidInput(format!(
            "empty placeholder rating range {:?}",
            config.rating_range
        )));
    }
    let registered = tournament.entrants.len();
    let mut created = Vec::with_capacity(tournament.capacity.saturating_sub(registered));
    let mut seq = registered + 1;
    while tournament.entrants.len() < tournament.capacity {
        let name = format!("{}{}", config.placeholder_prefix, seq);
        seq += 1;
        if tournament.entrant_name_taken(&name, None) {
            continue;
        }
        let rating = rng.gen_range(config.rating_range.clone());
        match tournament.add_entrant(NewEntrant { name, rating }) {
            Ok(id) => created.push(id),
            Err(e) => {
                tournament.entrants.truncate(registered);
                return Err(e);
            }
        }
    }
    if !created.is_empty() {
        log::info!(
            "Generated {} placeholder entrants for tournament {}",
            created.len(),
            tournament.id
        );
    }
    Ok(created)
}
