//! Tournament, its enumerations, and TournamentError.

use crate::models::entrant::{validate_entrant_name, Entrant, EntrantId, EntrantPatch, NewEntrant};
use crate::models::name_key;
use crate::models::round::{Matchup, MatchupId, Round};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Allowed declared capacity.
pub const CAPACITY_RANGE: std::ops::RangeInclusive<usize> = 2..=64;

/// Allowed tournament name and location length, in characters, after trimming.
pub const LABEL_LEN: std::ops::RangeInclusive<usize> = 3..=20;

/// Something a caller referred to that does not exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resource {
    Tournament(TournamentId),
    /// Round number within a tournament.
    Round(u32),
    Matchup(MatchupId),
    Entrant(EntrantId),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Tournament(id) => write!(f, "tournament {}", id),
            Resource::Round(n) => write!(f, "round {}", n),
            Resource::Matchup(id) => write!(f, "matchup {}", id),
            Resource::Entrant(id) => write!(f, "entrant {}", id),
        }
    }
}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The action is not allowed from the tournament's current status.
    InvalidTransition {
        status: TournamentStatus,
        action: &'static str,
    },
    /// Some matchups still have no result.
    IncompleteResults { unresolved: usize },
    /// Malformed input, rejected before anything was changed.
    InvalidInput(String),
    NotFound(Resource),
    /// A tournament (or an entrant within a tournament) with this name already exists.
    AlreadyExists,
    /// The declared capacity is already reached.
    TournamentFull { capacity: usize },
}

impl TournamentError {
    /// Stable machine-readable kind.
    pub fn code(&self) -> &'static str {
        match self {
            TournamentError::InvalidTransition { .. } => "invalid_transition",
            TournamentError::IncompleteResults { .. } => "incomplete_results",
            TournamentError::InvalidInput(_) => "invalid_input",
            TournamentError::NotFound(_) => "not_found",
            TournamentError::AlreadyExists => "already_exists",
            TournamentError::TournamentFull { .. } => "tournament_full",
        }
    }
}

impl fmt::Display for TournamentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TournamentError::InvalidTransition { status, action } => {
                write!(f, "Cannot {} a tournament that is {}", action, status)
            }
            TournamentError::IncompleteResults { unresolved } => {
                write!(f, "Not all games have a result ({} remaining)", unresolved)
            }
            TournamentError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            TournamentError::NotFound(what) => write!(f, "No such {}", what),
            TournamentError::AlreadyExists => write!(f, "A record with this name already exists"),
            TournamentError::TournamentFull { capacity } => {
                write!(f, "Maximum number of {} entrants has been reached", capacity)
            }
        }
    }
}

impl std::error::Error for TournamentError {}

/// Lifecycle status. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    NotStarted,
    Ongoing,
    Finished,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TournamentStatus::NotStarted => "not started",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Finished => "finished",
        })
    }
}

/// Time-control category. Serialized in snake_case; deserialized through [`FromStr`],
/// so display labels are accepted too.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TimeControl {
    Bullet,
    Blitz,
    Rapid,
    Classical,
}

impl TimeControl {
    pub const ALL: [TimeControl; 4] = [
        TimeControl::Bullet,
        TimeControl::Blitz,
        TimeControl::Rapid,
        TimeControl::Classical,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeControl::Bullet => "Bullet",
            TimeControl::Blitz => "Blitz",
            TimeControl::Rapid => "Rapid",
            TimeControl::Classical => "Classical",
        }
    }
}

impl FromStr for TimeControl {
    type Err = TournamentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TimeControl::ALL
            .into_iter()
            .find(|tc| tc.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| TournamentError::InvalidInput(format!("unknown time control: {}", s)))
    }
}

impl TryFrom<String> for TimeControl {
    type Error = TournamentError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Pairing format. Only the round-robin variants can be started.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Format {
    #[default]
    RoundRobin,
    DoubleRoundRobin,
    Swiss,
    Elimination,
    DoubleElimination,
}

impl Format {
    pub const ALL: [Format; 5] = [
        Format::RoundRobin,
        Format::DoubleRoundRobin,
        Format::Swiss,
        Format::Elimination,
        Format::DoubleElimination,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Format::RoundRobin => "Round-Robin",
            Format::DoubleRoundRobin => "Double-Round-Robin",
            Format::Swiss => "Swiss",
            Format::Elimination => "Elimination",
            Format::DoubleElimination => "Double-Elimination",
        }
    }

    /// `Some(double_cycle)` for formats this crate can pair, `None` otherwise.
    pub fn double_cycle(self) -> Option<bool> {
        match self {
            Format::RoundRobin => Some(false),
            Format::DoubleRoundRobin => Some(true),
            Format::Swiss | Format::Elimination | Format::DoubleElimination => None,
        }
    }
}

impl FromStr for Format {
    type Err = TournamentError;

    /// Accepts the display label ("Double-Round-Robin") or the wire name ("double_round_robin").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().replace('_', "-");
        Format::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(&s))
            .ok_or_else(|| TournamentError::InvalidInput(format!("unknown format: {}", s)))
    }
}

impl TryFrom<String> for Format {
    type Error = TournamentError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Request to create a tournament.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NewTournament {
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_control: TimeControl,
    #[serde(default)]
    pub format: Format,
    pub capacity: usize,
}

/// The fields of a tournament that may be changed after creation. Status is not one of them.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_control: Option<TimeControl>,
    #[serde(default)]
    pub format: Option<Format>,
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl TournamentPatch {
    /// Format and capacity shape the pairing, so they are frozen once the tournament starts.
    pub fn touches_structure(&self) -> bool {
        self.format.is_some() || self.capacity.is_some()
    }
}

/// A tournament: header fields, roster, and the rounds created at start.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub time_control: TimeControl,
    pub format: Format,
    /// Declared number of entrants.
    pub capacity: usize,
    pub status: TournamentStatus,
    /// Registration order; this is the order handed to the pairing generator.
    pub entrants: Vec<Entrant>,
    pub rounds: Vec<Round>,
}

impl Tournament {
    /// Validate the request and create a tournament with no entrants and no rounds.
    pub fn new(req: NewTournament) -> Result<Self, TournamentError> {
        let t = Self {
            id: Uuid::new_v4(),
            name: req.name.trim().to_string(),
            location: req.location.trim().to_string(),
            start_date: req.start_date,
            end_date: req.end_date,
            time_control: req.time_control,
            format: req.format,
            capacity: req.capacity,
            status: TournamentStatus::NotStarted,
            entrants: Vec::new(),
            rounds: Vec::new(),
        };
        t.validate()?;
        Ok(t)
    }

    /// Check the header invariants.
    pub fn validate(&self) -> Result<(), TournamentError> {
        self.check_header(self.entrants.len())
    }

    fn check_header(&self, registered: usize) -> Result<(), TournamentError> {
        validate_label("name", &self.name)?;
        validate_label("location", &self.location)?;
        if !CAPACITY_RANGE.contains(&self.capacity) {
            return Err(TournamentError::InvalidInput(format!(
                "capacity must be between {} and {}",
                CAPACITY_RANGE.start(),
                CAPACITY_RANGE.end()
            )));
        }
        if self.capacity < registered {
            return Err(TournamentError::InvalidInput(format!(
                "capacity {} is below the {} registered entrants",
                self.capacity, registered
            )));
        }
        if self.end_date < self.start_date {
            return Err(TournamentError::InvalidInput(
                "end date is before start date".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge a patch field by field. The merged header is validated before anything changes.
    pub fn apply(&mut self, patch: TournamentPatch) -> Result<(), TournamentError> {
        if patch.touches_structure() && self.status != TournamentStatus::NotStarted {
            return Err(TournamentError::InvalidTransition {
                status: self.status,
                action: "change the format or capacity of",
            });
        }
        let mut merged = self.header();
        if let Some(name) = patch.name {
            merged.name = name.trim().to_string();
        }
        if let Some(location) = patch.location {
            merged.location = location.trim().to_string();
        }
        if let Some(d) = patch.start_date {
            merged.start_date = d;
        }
        if let Some(d) = patch.end_date {
            merged.end_date = d;
        }
        if let Some(tc) = patch.time_control {
            merged.time_control = tc;
        }
        if let Some(format) = patch.format {
            merged.format = format;
        }
        if let Some(capacity) = patch.capacity {
            merged.capacity = capacity;
        }
        merged.check_header(self.entrants.len())?;

        merged.entrants = std::mem::take(&mut self.entrants);
        merged.rounds = std::mem::take(&mut self.rounds);
        *self = merged;
        Ok(())
    }

    /// Copy of the header fields with an empty roster and no rounds.
    fn header(&self) -> Self {
        Self {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            time_control: self.time_control,
            format: self.format,
            capacity: self.capacity,
            status: self.status,
            entrants: Vec::new(),
            rounds: Vec::new(),
        }
    }

    /// Entrant ids in registration order.
    pub fn entrant_ids(&self) -> Vec<EntrantId> {
        self.entrants.iter().map(|e| e.id).collect()
    }

    pub fn entrant(&self, id: EntrantId) -> Option<&Entrant> {
        self.entrants.iter().find(|e| e.id == id)
    }

    /// True if an entrant already uses this name (case-insensitive), ignoring `except`.
    pub fn entrant_name_taken(&self, name: &str, except: Option<EntrantId>) -> bool {
        let key = name_key(name);
        self.entrants
            .iter()
            .filter(|e| Some(e.id) != except)
            .any(|e| name_key(&e.name) == key)
    }

    /// Register an entrant. Not gated by status; entrants added after start are not paired.
    pub fn add_entrant(&mut self, req: NewEntrant) -> Result<EntrantId, TournamentError> {
        validate_entrant_name(&req.name)?;
        if self.entrants.len() >= self.capacity {
            return Err(TournamentError::TournamentFull {
                capacity: self.capacity,
            });
        }
        if self.entrant_name_taken(&req.name, None) {
            return Err(TournamentError::AlreadyExists);
        }
        if self.status != TournamentStatus::NotStarted {
            log::warn!(
                "Entrant {:?} added to tournament {} after start; they will not be paired",
                req.name.trim(),
                self.id
            );
        }
        let entrant = Entrant::new(req.name, req.rating);
        let id = entrant.id;
        self.entrants.push(entrant);
        Ok(id)
    }

    /// Update an entrant's name and/or rating.
    pub fn update_entrant(
        &mut self,
        id: EntrantId,
        patch: EntrantPatch,
    ) -> Result<&Entrant, TournamentError> {
        if let Some(name) = &patch.name {
            validate_entrant_name(name)?;
            if self.entrant_name_taken(name, Some(id)) {
                return Err(TournamentError::AlreadyExists);
            }
        }
        let entrant = self
            .entrants
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(TournamentError::NotFound(Resource::Entrant(id)))?;
        entrant.apply(patch);
        Ok(&*entrant)
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    pub fn round_mut(&mut self, number: u32) -> Option<&mut Round> {
        self.rounds.iter_mut().find(|r| r.number == number)
    }

    /// All matchups, round by round.
    pub fn matchups(&self) -> impl Iterator<Item = &Matchup> {
        self.rounds.iter().flat_map(|r| r.matchups.iter())
    }

    /// Number of matchups that still have no result.
    pub fn unresolved_matchups(&self) -> usize {
        self.matchups().filter(|m| !m.result.is_resolved()).count()
    }

    /// Entrant id -> ids of the matchups they play, in round order. Built on demand.
    pub fn matchup_index(&self) -> HashMap<EntrantId, Vec<MatchupId>> {
        let mut index: HashMap<EntrantId, Vec<MatchupId>> =
            self.entrants.iter().map(|e| (e.id, Vec::new())).collect();
        for m in self.matchups() {
            index.entry(m.first).or_default().push(m.id);
            index.entry(m.second).or_default().push(m.id);
        }
        index
    }

    /// Registered entrants with no matchup in the given round, or `None` if there is no such round.
    pub fn byes(&self, round_number: u32) -> Option<Vec<EntrantId>> {
        let round = self.round(round_number)?;
        Some(
            self.entrants
                .iter()
                .map(|e| e.id)
                .filter(|&id| !round.matchups.iter().any(|m| m.involves(id)))
                .collect(),
        )
    }
}

fn validate_label(field: &str, value: &str) -> Result<(), TournamentError> {
    let len = value.trim().chars().count();
    if !LABEL_LEN.contains(&len) {
        return Err(TournamentError::InvalidInput(format!(
            "tournament {} must be {} to {} characters long",
            field,
            LABEL_LEN.start(),
            LABEL_LEN.end()
        )));
    }
    Ok(())
}
