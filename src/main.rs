//! Main entry point for the backend server.
//!
//! Initializes the actor system, configures application state, and launches the HTTP server
//! with the WebSocket endpoint.

use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use log::info;

use config::server::ServerConfig;
use server::state::AppState;
use store::MemoryStore;

pub mod config;
mod server;
mod game;
mod store;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env();

    // Start presence, game sessions, matchmaking and the room command worker.
    let state = web::Data::new(AppState::start(Arc::new(MemoryStore::new())));

    info!("[Server] Listening on {}:{}", config.host, config.port);

    // Start the HTTP server with the WebSocket endpoint.
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*"))
            )
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
