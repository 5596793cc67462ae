//! Integration tests for the in-memory registry: CRUD, listing, full lifecycle, concurrency.

use chrono::NaiveDate;
use round_robin_tournament::{
    EngineConfig, EntrantPatch, Format, ListQuery, MatchResult, NewEntrant, NewTournament,
    Resource, ResultEntry, SortOrder, TimeControl, TournamentError, TournamentId, TournamentPatch,
    TournamentRegistry, TournamentStatus,
};

fn request(name: &str, day: u32, capacity: usize) -> NewTournament {
    NewTournament {
        name: name.to_string(),
        location: "Coimbra".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 9, day).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 9, day + 1).unwrap(),
        time_control: TimeControl::Blitz,
        format: Format::RoundRobin,
        capacity,
    }
}

fn play_everything(registry: &TournamentRegistry, id: TournamentId, result: MatchResult) {
    let t = registry.get(id).unwrap();
    for round in &t.rounds {
        let results: Vec<ResultEntry> = round
            .matchups
            .iter()
            .map(|m| ResultEntry {
                matchup_id: m.id,
                result,
            })
            .collect();
        registry.record_results(id, round.number, &results).unwrap();
    }
}

#[test]
fn create_and_get() {
    let registry = TournamentRegistry::default();
    let created = registry.create(request("Autumn Open", 1, 8)).unwrap();
    assert_eq!(created.status, TournamentStatus::NotStarted);
    assert!(created.rounds.is_empty() && created.entrants.is_empty());

    let fetched = registry.get(created.id).unwrap();
    assert_eq!(fetched.name, "Autumn Open");
    assert_eq!(fetched.capacity, 8);
}

#[test]
fn create_validates_request() {
    let registry = TournamentRegistry::default();
    for capacity in [0, 1, 65] {
        assert!(matches!(
            registry.create(request("Bad Capacity", 1, capacity)),
            Err(TournamentError::InvalidInput(_))
        ));
    }
    assert!(matches!(
        registry.create(request("AB", 1, 4)),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(matches!(
        registry.create(request("A name far too long to fit", 1, 4)),
        Err(TournamentError::InvalidInput(_))
    ));

    let mut backwards = request("Backwards", 10, 4);
    backwards.end_date = NaiveDate::from_ymd_opt(2026, 9, 9).unwrap();
    assert!(matches!(
        registry.create(backwards),
        Err(TournamentError::InvalidInput(_))
    ));
    assert!(registry.list(&ListQuery::default()).is_empty());
}

#[test]
fn names_are_unique_case_insensitively() {
    let registry = TournamentRegistry::default();
    registry.create(request("Autumn Open", 1, 4)).unwrap();
    assert_eq!(
        registry.create(request("  autumn OPEN", 2, 4)).unwrap_err(),
        TournamentError::AlreadyExists
    );
    registry.create(request("Émile Memorial", 3, 4)).unwrap();
    assert_eq!(
        registry.create(request("émile memorial", 4, 4)).unwrap_err(),
        TournamentError::AlreadyExists
    );
}

#[test]
fn unknown_tournament_is_not_found() {
    let registry = TournamentRegistry::default();
    let id = uuid::Uuid::new_v4();
    let expected = TournamentError::NotFound(Resource::Tournament(id));
    assert_eq!(registry.get(id).unwrap_err(), expected);
    assert_eq!(registry.start(id).unwrap_err(), expected);
    assert_eq!(registry.finish(id).unwrap_err(), expected);
    assert_eq!(registry.winner(id).unwrap_err(), expected);
    assert_eq!(registry.delete(id).unwrap_err(), expected);
    assert_eq!(
        registry.update(id, TournamentPatch::default()).unwrap_err(),
        expected
    );
}

#[test]
fn update_renames_and_frees_old_name() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 4)).unwrap();
    registry.create(request("Winter Cup", 2, 4)).unwrap();

    let clash = TournamentPatch {
        name: Some("WINTER CUP".to_string()),
        ..TournamentPatch::default()
    };
    assert_eq!(
        registry.update(t.id, clash).unwrap_err(),
        TournamentError::AlreadyExists
    );

    let renamed = registry
        .update(
            t.id,
            TournamentPatch {
                name: Some("Harvest Open".to_string()),
                location: Some("Aveiro".to_string()),
                ..TournamentPatch::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Harvest Open");
    assert_eq!(renamed.location, "Aveiro");
    assert_eq!(renamed.time_control, TimeControl::Blitz);

    registry.create(request("Autumn Open", 3, 4)).unwrap();
}

#[test]
fn rejected_patch_changes_nothing() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 5, 4)).unwrap();

    let patch = TournamentPatch {
        location: Some("Setubal".to_string()),
        end_date: NaiveDate::from_ymd_opt(2026, 9, 1),
        ..TournamentPatch::default()
    };
    assert!(matches!(
        registry.update(t.id, patch),
        Err(TournamentError::InvalidInput(_))
    ));
    assert_eq!(registry.get(t.id).unwrap().location, "Coimbra");
}

#[test]
fn structure_is_frozen_after_start() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 4)).unwrap();
    registry.generate_entrants(t.id).unwrap();
    registry
        .update(
            t.id,
            TournamentPatch {
                format: Some(Format::DoubleRoundRobin),
                ..TournamentPatch::default()
            },
        )
        .unwrap();
    registry.start(t.id).unwrap();

    for patch in [
        TournamentPatch {
            format: Some(Format::RoundRobin),
            ..TournamentPatch::default()
        },
        TournamentPatch {
            capacity: Some(6),
            ..TournamentPatch::default()
        },
    ] {
        assert!(matches!(
            registry.update(t.id, patch),
            Err(TournamentError::InvalidTransition {
                status: TournamentStatus::Ongoing,
                ..
            })
        ));
    }

    let moved = registry
        .update(
            t.id,
            TournamentPatch {
                location: Some("Evora".to_string()),
                ..TournamentPatch::default()
            },
        )
        .unwrap();
    assert_eq!(moved.location, "Evora");
    assert_eq!(moved.rounds.len(), 6);
}

#[test]
fn delete_removes_tournament_and_name() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 4)).unwrap();
    registry.generate_entrants(t.id).unwrap();
    registry.start(t.id).unwrap();

    registry.delete(t.id).unwrap();
    assert!(matches!(
        registry.get(t.id),
        Err(TournamentError::NotFound(Resource::Tournament(_)))
    ));
    registry.create(request("Autumn Open", 1, 4)).unwrap();
}

#[test]
fn list_sorts_filters_and_limits() {
    let registry = TournamentRegistry::default();
    let early = registry.create(request("Early Bird", 1, 2)).unwrap();
    let middle = registry.create(request("Midweek Rapid", 10, 2)).unwrap();
    let late = registry.create(request("Late Night", 20, 2)).unwrap();
    registry.generate_entrants(middle.id).unwrap();
    registry.start(middle.id).unwrap();

    let names = |query: ListQuery| -> Vec<String> {
        registry.list(&query).into_iter().map(|t| t.name).collect()
    };
    assert_eq!(
        names(ListQuery::default()),
        vec!["Late Night", "Midweek Rapid", "Early Bird"]
    );
    assert_eq!(
        names(ListQuery {
            sort: SortOrder::Asc,
            limit: 2,
            status: None,
        }),
        vec!["Early Bird", "Midweek Rapid"]
    );
    assert_eq!(
        names(ListQuery {
            status: Some(TournamentStatus::NotStarted),
            ..ListQuery::default()
        }),
        vec![late.name.clone(), early.name.clone()]
    );

    let counts = registry.status_counts();
    assert_eq!(counts[&TournamentStatus::NotStarted], 2);
    assert_eq!(counts[&TournamentStatus::Ongoing], 1);
    assert_eq!(counts[&TournamentStatus::Finished], 0);
}

#[test]
fn entrant_crud() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 3)).unwrap();
    let alice = registry
        .add_entrant(
            t.id,
            NewEntrant {
                name: "Alice".to_string(),
                rating: 1900,
            },
        )
        .unwrap();
    registry
        .add_entrant(
            t.id,
            NewEntrant {
                name: "Bob".to_string(),
                rating: 1700,
            },
        )
        .unwrap();

    let updated = registry
        .update_entrant(
            t.id,
            alice.id,
            EntrantPatch {
                rating: Some(2000),
                ..EntrantPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.rating, 2000);

    assert_eq!(
        registry
            .update_entrant(
                t.id,
                alice.id,
                EntrantPatch {
                    name: Some("bob".to_string()),
                    ..EntrantPatch::default()
                },
            )
            .unwrap_err(),
        TournamentError::AlreadyExists
    );
    let ghost = uuid::Uuid::new_v4();
    assert_eq!(
        registry
            .update_entrant(t.id, ghost, EntrantPatch::default())
            .unwrap_err(),
        TournamentError::NotFound(Resource::Entrant(ghost))
    );

    let t = registry.generate_entrants(t.id).unwrap();
    assert_eq!(t.entrants.len(), 3);
    assert_eq!(registry.entrants(t.id).unwrap()[0].rating, 2000);
}

#[test]
fn full_tournament_through_registry() {
    let registry = TournamentRegistry::new(EngineConfig {
        rating_range: 1200..=1300,
        ..EngineConfig::default()
    });
    let t = registry.create(request("Autumn Open", 1, 6)).unwrap();
    let t = registry.generate_entrants(t.id).unwrap();
    assert!(t.entrants.iter().all(|e| (1200..=1300).contains(&e.rating)));

    let t = registry.start(t.id).unwrap();
    assert_eq!(t.status, TournamentStatus::Ongoing);
    assert_eq!(t.rounds.len(), 5);
    assert_eq!(registry.matchups(t.id, 1).unwrap().len(), 3);
    assert_eq!(
        registry.matchups(t.id, 6).unwrap_err(),
        TournamentError::NotFound(Resource::Round(6))
    );

    assert!(matches!(
        registry.finish(t.id),
        Err(TournamentError::IncompleteResults { unresolved: 15 })
    ));

    play_everything(&registry, t.id, MatchResult::FirstWins);
    let finished = registry.finish(t.id).unwrap();
    assert_eq!(finished.status, TournamentStatus::Finished);

    let standings = registry.standings(t.id).unwrap();
    let total: u32 = standings.entries.iter().map(|s| s.points.half_points()).sum();
    assert_eq!(total, 2 * 15);
    assert!(standings.entries.iter().all(|s| s.played == 5));

    let winner = registry.winner(t.id).unwrap();
    let best = standings.ranked()[0].points;
    assert_eq!(winner.score, best);
}

#[test]
fn concurrent_starts_create_one_schedule() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 8)).unwrap();
    registry.generate_entrants(t.id).unwrap();

    let outcomes: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| registry.start(t.id))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(outcomes.iter().filter_map(|o| o.as_ref().err()).all(|e| matches!(
        e,
        TournamentError::InvalidTransition {
            status: TournamentStatus::Ongoing,
            ..
        }
    )));
    assert_eq!(registry.get(t.id).unwrap().rounds.len(), 7);
}

#[test]
fn finish_sees_every_concurrent_result() {
    let registry = TournamentRegistry::default();
    let t = registry.create(request("Autumn Open", 1, 6)).unwrap();
    registry.generate_entrants(t.id).unwrap();
    let t = registry.start(t.id).unwrap();

    std::thread::scope(|s| {
        for round in &t.rounds {
            let registry = &registry;
            s.spawn(move || {
                let results: Vec<ResultEntry> = round
                    .matchups
                    .iter()
                    .map(|m| ResultEntry {
                        matchup_id: m.id,
                        result: MatchResult::Draw,
                    })
                    .collect();
                registry.record_results(t.id, round.number, &results).unwrap();
            });
        }
    });

    registry.finish(t.id).unwrap();
    let standings = registry.standings(t.id).unwrap();
    assert!(standings.entries.iter().all(|s| s.draws == 5));
}

#[test]
fn tournaments_are_independent() {
    let registry = TournamentRegistry::default();
    let ids: Vec<_> = ["Alpha Open", "Beta Open", "Gamma Open", "Delta Open"]
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let t = registry.create(request(name, i as u32 + 1, 2 + i)).unwrap();
            registry.generate_entrants(t.id).unwrap();
            t.id
        })
        .collect();

    std::thread::scope(|s| {
        for &id in &ids {
            let registry = &registry;
            s.spawn(move || {
                registry.start(id).unwrap();
                play_everything(registry, id, MatchResult::SecondWins);
                registry.finish(id).unwrap();
            });
        }
    });

    let counts = registry.status_counts();
    assert_eq!(counts[&TournamentStatus::Finished], 4);
}
