//! REST server for MusikMadness tournaments.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT,
//! INACTIVITY_TIMEOUT_HOURS, CLEANUP_INTERVAL_MINUTES.

use actix_web::{web::Data, App, HttpServer};
use musik_madness::api::{self, TournamentStore};
use musik_madness::config::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!("Starting server at http://{}:{}", config.host, config.port);

    let state = Data::new(TournamentStore::default());

    // Background task: periodically remove tournaments nobody has touched recently
    let state_cleanup = state.clone();
    let (interval, timeout) = (config.cleanup_interval, config.inactivity_timeout);
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(interval);
        loop {
            ticker.tick().await;
            match state_cleanup.remove_inactive(timeout) {
                Ok(0) => {}
                Ok(removed) => log::info!(
                    "Cleaned up {} inactive tournament(s) (no activity for {:?})",
                    removed,
                    timeout
                ),
                Err(e) => log::warn!("Cleanup skipped: {}", e),
            }
        }
    });

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::configure))
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
}
