// src/server/mod.rs

//! Server layer root module.
//!
//! This module organizes the main backend server components, including:
//! - Application state and HTTP/WebSocket routing
//! - Presence: who is connected, and which rooms they listen on
//! - Matchmaking: rule queues and direct invitations
//! - Game session orchestration (tick loop, results, spectators)
//! - The serialized subscribe/unsubscribe queue

pub mod state;
pub mod router;
pub mod types;
pub mod error;
pub mod events;
pub mod ws_error;
pub mod presence;
pub mod matchmaking;
pub mod game_session;
pub mod command_queue;
pub mod gateway;

#[cfg(test)]
pub mod test_support;
