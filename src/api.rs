//! JSON REST API over the in-memory tournament registry.
//!
//! Every rejection, including bodies, paths and queries that fail to parse, is answered
//! with `{ "error": <message>, "code": <kind> }`.

use crate::models::{
    EntrantId, EntrantPatch, NewEntrant, NewTournament, ResultEntry, TournamentError,
    TournamentId, TournamentPatch,
};
use crate::registry::{ListQuery, TournamentRegistry};
use actix_web::{
    delete,
    error::InternalError,
    get, post, put,
    web::{self, Data, Json, Path, Query},
    HttpResponse, Responder,
};
use serde::{Deserialize, Serialize};
use std::fmt;

type AppState = Data<TournamentRegistry>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct RoundResultsBody {
    results: Vec<ResultEntry>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and entrant id.
#[derive(Deserialize)]
struct EntrantPath {
    id: TournamentId,
    entrant_id: EntrantId,
}

/// Path segments: tournament id and 1-based round number.
#[derive(Deserialize)]
struct RoundPath {
    id: TournamentId,
    round_number: u32,
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let mut builder = match e {
        TournamentError::NotFound(_) => HttpResponse::NotFound(),
        TournamentError::InvalidInput(_) => HttpResponse::BadRequest(),
        TournamentError::InvalidTransition { .. }
        | TournamentError::IncompleteResults { .. }
        | TournamentError::AlreadyExists
        | TournamentError::TournamentFull { .. } => HttpResponse::Conflict(),
    };
    builder.json(serde_json::json!({ "error": e.to_string(), "code": e.code() }))
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            log::debug!("Rejected request: {}", e);
            error_response(&e)
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "round-robin-tournament",
    })
}

/// Create a new tournament (returns it with id).
#[post("/api/tournaments")]
async fn api_create_tournament(state: AppState, body: Json<NewTournament>) -> HttpResponse {
    match state.create(body.into_inner()) {
        Ok(t) => HttpResponse::Created().json(t),
        Err(e) => error_response(&e),
    }
}

/// List tournaments: ?limit=10&sort=desc&status=ongoing
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, query: Query<ListQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.list(&query))
}

/// Number of tournaments per status.
#[get("/api/tournaments/stats")]
async fn api_tournament_stats(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(state.status_counts())
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.get(path.id))
}

/// Update header fields (format and capacity only before start).
#[put("/api/tournaments/{id}")]
async fn api_update_tournament(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<TournamentPatch>,
) -> HttpResponse {
    respond(state.update(path.id, body.into_inner()))
}

#[delete("/api/tournaments/{id}")]
async fn api_delete_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match state.delete(path.id) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => error_response(&e),
    }
}

#[post("/api/tournaments/{id}/entrants")]
async fn api_add_entrant(
    state: AppState,
    path: Path<TournamentPath>,
    body: Json<NewEntrant>,
) -> HttpResponse {
    respond(state.add_entrant(path.id, body.into_inner()))
}

#[put("/api/tournaments/{id}/entrants/{entrant_id}")]
async fn api_update_entrant(
    state: AppState,
    path: Path<EntrantPath>,
    body: Json<EntrantPatch>,
) -> HttpResponse {
    respond(state.update_entrant(path.id, path.entrant_id, body.into_inner()))
}

/// Fill the roster up to capacity with placeholder entrants.
#[post("/api/tournaments/{id}/entrants/generate")]
async fn api_generate_entrants(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.generate_entrants(path.id))
}

/// Start the tournament (NotStarted -> Ongoing) and create every round.
#[post("/api/tournaments/{id}/start")]
async fn api_start_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.start(path.id))
}

#[get("/api/tournaments/{id}/rounds/{round_number}/matchups")]
async fn api_round_matchups(state: AppState, path: Path<RoundPath>) -> HttpResponse {
    respond(state.matchups(path.id, path.round_number))
}

/// Record results for matchups of one round. Unknown matchup ids are ignored.
#[put("/api/tournaments/{id}/rounds/{round_number}/results")]
async fn api_record_results(
    state: AppState,
    path: Path<RoundPath>,
    body: Json<RoundResultsBody>,
) -> HttpResponse {
    respond(state.record_results(path.id, path.round_number, &body.results))
}

/// Finish the tournament (Ongoing -> Finished); every matchup needs a result.
#[post("/api/tournaments/{id}/finish")]
async fn api_finish_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.finish(path.id))
}

#[get("/api/tournaments/{id}/standings")]
async fn api_standings(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.standings(path.id))
}

#[get("/api/tournaments/{id}/winner")]
async fn api_winner(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.winner(path.id))
}

/// Turn an extractor failure into an `invalid_input` response.
fn reject_input<E: fmt::Debug + fmt::Display + 'static>(err: E) -> actix_web::Error {
    let response = error_response(&TournamentError::InvalidInput(err.to_string()));
    log::debug!("Rejected malformed request: {}", err);
    InternalError::from_response(err, response).into()
}

/// Register the extractor error handlers and every `/api` route.
/// The caller provides the registry as `Data<TournamentRegistry>`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| reject_input(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _req| reject_input(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| reject_input(err)))
        .service(api_health)
        .service(api_create_tournament)
        .service(api_list_tournaments)
        // before /{id} so "stats" is not taken for an id
        .service(api_tournament_stats)
        .service(api_get_tournament)
        .service(api_update_tournament)
        .service(api_delete_tournament)
        .service(api_add_entrant)
        .service(api_generate_entrants)
        .service(api_update_entrant)
        .service(api_start_tournament)
        .service(api_round_matchups)
        .service(api_record_results)
        .service(api_finish_tournament)
        .service(api_standings)
        .service(api_winner);
}
