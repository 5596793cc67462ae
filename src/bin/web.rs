//! Single binary web server: JSON REST API over the in-memory tournament registry.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, and RATING_MIN / RATING_MAX for generated entrants.

use actix_web::{web::Data, App, HttpServer};
use round_robin_tournament::{api, ServerConfig, TournamentRegistry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(TournamentRegistry::new(config.engine.clone()));

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
