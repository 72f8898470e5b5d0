/// Main configuration module.
/// 
/// Re-exports submodules for game, matchmaking, room command queue and process configuration.
pub mod matchmaking;
pub mod game;
pub mod command_queue;
pub mod server;
