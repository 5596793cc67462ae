//! In-memory tournament registry: the store the web layer talks to.
//!
//! Each tournament sits behind its own `Mutex`, so lifecycle operations on one
//! tournament are serialized while different tournaments proceed in parallel. The
//! map of tournaments and the name index share one `RwLock`. Lock order is always
//! map, then tournament.

use crate::config::EngineConfig;
use crate::logic::{self, Standings, Winner};
use crate::models::{
    name_key, Entrant, EntrantId, EntrantPatch, Matchup, NewEntrant, NewTournament, Resource,
    ResultEntry, Tournament, TournamentError, TournamentId, TournamentPatch, TournamentStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Handle = Arc<Mutex<Tournament>>;

#[derive(Default)]
struct Inner {
    tournaments: HashMap<TournamentId, Handle>,
    /// Lower-cased tournament name -> id.
    names: HashMap<String, TournamentId>,
}

/// Order of [`TournamentRegistry::list`] by start date.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter and paging for [`TournamentRegistry::list`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub status: Option<TournamentStatus>,
}

fn default_limit() -> usize {
    10
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            sort: SortOrder::default(),
            status: None,
        }
    }
}

/// All tournaments, by id.
pub struct TournamentRegistry {
    config: EngineConfig,
    inner: RwLock<Inner>,
}

impl Default for TournamentRegistry {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

// Lifecycle functions leave a tournament untouched when they fail, so data behind a
// poisoned lock is still consistent and the guard is recovered.
fn lock(handle: &Handle) -> MutexGuard<'_, Tournament> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TournamentRegistry {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn handle(&self, id: TournamentId) -> Result<Handle, TournamentError> {
        self.read()
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(TournamentError::NotFound(Resource::Tournament(id)))
    }

    /// Run `f` with exclusive access to one tournament. The map lock is released first.
    fn with_tournament<T>(
        &self,
        id: TournamentId,
        f: impl FnOnce(&mut Tournament) -> Result<T, TournamentError>,
    ) -> Result<T, TournamentError> {
        let handle = self.handle(id)?;
        let mut t = lock(&handle);
        f(&mut t)
    }

    /// Create a tournament. Names are unique, case-insensitively.
    pub fn create(&self, req: NewTournament) -> Result<Tournament, TournamentError> {
        let tournament = Tournament::new(req)?;
        let key = name_key(&tournament.name);
        let mut inner = self.write();
        if inner.names.contains_key(&key) {
            return Err(TournamentError::AlreadyExists);
        }
        inner.names.insert(key, tournament.id);
        inner
            .tournaments
            .insert(tournament.id, Arc::new(Mutex::new(tournament.clone())));
        log::info!("Created tournament {} ({})", tournament.id, tournament.name);
        Ok(tournament)
    }

    pub fn get(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| Ok(t.clone()))
    }

    /// Apply a typed patch. A rename must not collide with another tournament.
    pub fn update(
        &self,
        id: TournamentId,
        patch: TournamentPatch,
    ) -> Result<Tournament, TournamentError> {
        let mut inner = self.write();
        let handle = inner
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(TournamentError::NotFound(Resource::Tournament(id)))?;
        let mut t = lock(&handle);

        let old_key = name_key(&t.name);
        let new_key = patch.name.as_deref().map(name_key);
        if let Some(key) = &new_key {
            if inner.names.get(key).is_some_and(|&other| other != id) {
                return Err(TournamentError::AlreadyExists);
            }
        }
        t.apply(patch)?;
        if let Some(key) = new_key {
            inner.names.remove(&old_key);
            inner.names.insert(key, id);
        }
        Ok(t.clone())
    }

    /// Remove a tournament together with its rounds, matchups and entrants.
    pub fn delete(&self, id: TournamentId) -> Result<(), TournamentError> {
        let mut inner = self.write();
        if inner.tournaments.remove(&id).is_none() {
            return Err(TournamentError::NotFound(Resource::Tournament(id)));
        }
        inner.names.retain(|_, v| *v != id);
        log::info!("Deleted tournament {}", id);
        Ok(())
    }

    /// Tournaments ordered by start date, optionally filtered by status, at most `query.limit`.
    pub fn list(&self, query: &ListQuery) -> Vec<Tournament> {
        let handles: Vec<Handle> = self.read().tournaments.values().cloned().collect();
        let mut found: Vec<Tournament> = handles
            .iter()
            .map(|h| lock(h).clone())
            .filter(|t| query.status.map_or(true, |s| t.status == s))
            .collect();
        found.sort_by(|a, b| {
            let by_date = a.start_date.cmp(&b.start_date).then_with(|| a.name.cmp(&b.name));
            match query.sort {
                SortOrder::Asc => by_date,
                SortOrder::Desc => by_date.reverse(),
            }
        });
        found.truncate(query.limit);
        found
    }

    /// Number of tournaments in each status. Every status is present, possibly with 0.
    pub fn status_counts(&self) -> HashMap<TournamentStatus, usize> {
        let handles: Vec<Handle> = self.read().tournaments.values().cloned().collect();
        let mut counts: HashMap<TournamentStatus, usize> = [
            TournamentStatus::NotStarted,
            TournamentStatus::Ongoing,
            TournamentStatus::Finished,
        ]
        .into_iter()
        .map(|s| (s, 0))
        .collect();
        for h in &handles {
            *counts.entry(lock(h).status).or_default() += 1;
        }
        counts
    }

    pub fn entrants(&self, id: TournamentId) -> Result<Vec<Entrant>, TournamentError> {
        self.with_tournament(id, |t| Ok(t.entrants.clone()))
    }

    pub fn add_entrant(
        &self,
        id: TournamentId,
        req: NewEntrant,
    ) -> Result<Entrant, TournamentError> {
        self.with_tournament(id, |t| {
            let entrant_id = t.add_entrant(req)?;
            t.entrant(entrant_id)
                .cloned()
                .ok_or(TournamentError::NotFound(Resource::Entrant(entrant_id)))
        })
    }

    pub fn update_entrant(
        &self,
        id: TournamentId,
        entrant_id: EntrantId,
        patch: EntrantPatch,
    ) -> Result<Entrant, TournamentError> {
        self.with_tournament(id, |t| t.update_entrant(entrant_id, patch).cloned())
    }

    /// Fill the roster up to capacity with placeholder entrants.
    pub fn generate_entrants(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| {
            logic::generate_entrants(t, &self.config, &mut rand::thread_rng())?;
            Ok(t.clone())
        })
    }

    pub fn start(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| {
            logic::start_tournament(t)?;
            Ok(t.clone())
        })
    }

    pub fn matchups(
        &self,
        id: TournamentId,
        round_number: u32,
    ) -> Result<Vec<Matchup>, TournamentError> {
        self.with_tournament(id, |t| {
            t.round(round_number)
                .map(|r| r.matchups.clone())
                .ok_or(TournamentError::NotFound(Resource::Round(round_number)))
        })
    }

    pub fn record_results(
        &self,
        id: TournamentId,
        round_number: u32,
        results: &[ResultEntry],
    ) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| {
            logic::record_results(t, round_number, results)?;
            Ok(t.clone())
        })
    }

    pub fn finish(&self, id: TournamentId) -> Result<Tournament, TournamentError> {
        self.with_tournament(id, |t| {
            logic::finish_tournament(t)?;
            Ok(t.clone())
        })
    }

    pub fn standings(&self, id: TournamentId) -> Result<Standings, TournamentError> {
        self.with_tournament(id, |t| logic::compute_standings(t))
    }

    pub fn winner(&self, id: TournamentId) -> Result<Winner, TournamentError> {
        self.with_tournament(id, |t| logic::determine_winner(t))
    }
}
