// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the addresses of the engine actors and the room command queue.
//! Cloned into every WebSocket session.

use actix::{Actor, Addr};

use crate::server::command_queue::CommandSerializer;
use crate::server::game_session::GameSessionManager;
use crate::server::matchmaking::{MatchTiming, MatchmakingServer};
use crate::server::presence::PresenceServer;
use crate::store::SharedStore;

/// Shared application state, injected into HTTP/WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection registry and room membership.
    pub presence: Addr<PresenceServer>,
    /// Queues and invitations.
    pub matchmaking: Addr<MatchmakingServer>,
    /// Running game sessions.
    pub game_sessions: Addr<GameSessionManager>,
    pub commands: CommandSerializer,
}

impl AppState {
    /// Start every engine actor on the current arbiter.
    pub fn start(store: SharedStore) -> Self {
        Self::start_with(store, MatchTiming::default())
    }

    pub fn start_with(store: SharedStore, timing: MatchTiming) -> Self {
        let presence = PresenceServer::new(store.clone()).start();
        let game_sessions = GameSessionManager::new(presence.clone(), store.clone()).start();
        let matchmaking = MatchmakingServer::new(game_sessions.clone(), presence.clone(), store)
            .with_timing(timing)
            .start();
        let commands = CommandSerializer::start(presence.clone(), game_sessions.clone());
        AppState {
            presence,
            matchmaking,
            game_sessions,
            commands,
        }
    }
}
