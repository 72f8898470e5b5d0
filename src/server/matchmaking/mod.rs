/// Matchmaking module: rule queues, one-to-one invitations and session hand-off.

pub mod server;
pub mod messages;
pub mod types;
pub mod queues;
pub mod invitations;
pub mod guards;

pub use server::{MatchTiming, MatchmakingServer};
