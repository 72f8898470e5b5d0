//! Storage collaborators of the session engine.
//!
//! The engine never owns durable data: user status, aggregates and match
//! history are reached through the [`UserStore`] and [`GameStore`] traits.
//! [`memory::MemoryStore`] implements both for stand-alone runs and tests.

pub mod memory;

use std::sync::Arc;
use std::time::SystemTime;

use serde::{Serialize, Deserialize};

use crate::config::matchmaking::BADGE_MILESTONES;
use crate::game::types::{Role, Rule};
use crate::server::types::{SessionId, UserId};

pub use memory::MemoryStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    #[error("Unknown room: {0}")]
    UnknownRoom(SessionId),
}

/// Presence status published to the rest of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Online,
    Offline,
    Gaming,
}

/// Milestone badges awarded on total win count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    Win3,
    Win5,
    Win10,
}

impl Badge {
    /// Badge earned by reaching exactly `wins` victories, if any.
    pub fn for_wins(wins: u32) -> Option<Badge> {
        match BADGE_MILESTONES.iter().position(|&m| m == wins)? {
            0 => Some(Badge::Win3),
            1 => Some(Badge::Win5),
            _ => Some(Badge::Win10),
        }
    }
}

/// Outcome of a finished session, handed to the match-history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub session_id: SessionId,
    pub rule: Rule,
    pub red: UserId,
    pub blue: UserId,
    pub red_score: u32,
    pub blue_score: u32,
    pub winner: Role,
    pub finished_at: SystemTime,
}

impl MatchResult {
    pub fn winner_id(&self) -> &UserId {
        match self.winner {
            Role::Red => &self.red,
            Role::Blue => &self.blue,
        }
    }

    pub fn loser_id(&self) -> &UserId {
        match self.winner {
            Role::Red => &self.blue,
            Role::Blue => &self.red,
        }
    }
}

/// User records: status and win/loss aggregates.
pub trait UserStore: Send + Sync {
    fn exists(&self, user: &str) -> StoreResult<bool>;

    fn update_status(&self, user: &str, status: UserStatus) -> StoreResult<()>;

    /// The "is this user already in a game" predicate.
    fn is_gaming(&self, user: &str) -> StoreResult<bool>;

    /// Returns the new win total.
    fn record_win(&self, user: &str) -> StoreResult<u32>;

    /// Returns the new loss total.
    fn record_loss(&self, user: &str) -> StoreResult<u32>;

    /// Returns the new rating.
    fn adjust_rating(&self, user: &str, delta: i32) -> StoreResult<i32>;

    fn award_badge(&self, user: &str, badge: Badge) -> StoreResult<()>;
}

/// Game room records and match history.
pub trait GameStore: Send + Sync {
    /// Persist a minimal room record and return its id.
    fn create_room(&self, rule: Rule) -> StoreResult<SessionId>;

    fn delete_room(&self, id: SessionId) -> StoreResult<()>;

    fn save_result(&self, result: &MatchResult) -> StoreResult<()>;
}

pub trait Store: UserStore + GameStore {}

impl<T: UserStore + GameStore> Store for T {}

/// Handle shared by every actor that needs storage.
pub type SharedStore = Arc<dyn Store>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn badges_only_on_exact_milestones() {
        assert_eq!(Badge::for_wins(2), None);
        assert_eq!(Badge::for_wins(3), Some(Badge::Win3));
        assert_eq!(Badge::for_wins(4), None);
        assert_eq!(Badge::for_wins(5), Some(Badge::Win5));
        assert_eq!(Badge::for_wins(10), Some(Badge::Win10));
        assert_eq!(Badge::for_wins(11), None);
    }
}
