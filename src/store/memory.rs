//! In-memory implementation of the storage traits.
//!
//! Users are created on first status update (i.e. on first login), which
//! stands in for the account table of a real deployment.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use super::{Badge, GameStore, MatchResult, StoreError, StoreResult, UserStatus, UserStore};
use crate::game::types::Rule;
use crate::server::types::{SessionId, UserId};

pub const DEFAULT_RATING: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub status: UserStatus,
    pub wins: u32,
    pub losses: u32,
    pub rating: i32,
    pub badges: BTreeSet<Badge>,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            status: UserStatus::Offline,
            wins: 0,
            losses: 0,
            rating: DEFAULT_RATING,
            badges: BTreeSet::new(),
        }
    }
}

#[derive(Debug)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, UserRecord>>,
    rooms: RwLock<HashMap<SessionId, Rule>>,
    history: RwLock<Vec<MatchResult>>,
    next_room_id: AtomicU64,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            rooms: RwLock::new(HashMap::new()),
            history: RwLock::new(Vec::new()),
            next_room_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Store pre-populated with offline accounts.
    #[cfg(test)]
    pub fn with_users<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        if let Ok(mut users) = store.users.write() {
            for name in names {
                users.insert(name.to_string(), UserRecord::default());
            }
        }
        store
    }

    /// Simulate an outage: every call fails with [`StoreError::Unavailable`] until re-enabled.
    #[cfg(test)]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    #[cfg(test)]
    pub fn user(&self, name: &str) -> Option<UserRecord> {
        self.users.read().ok()?.get(name).cloned()
    }

    #[cfg(test)]
    pub fn history(&self) -> Vec<MatchResult> {
        self.history.read().map(|h| h.clone()).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn room_rule(&self, id: SessionId) -> Option<Rule> {
        self.rooms.read().ok()?.get(&id).copied()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store disabled".to_string()))
        }
    }

    fn poisoned() -> StoreError {
        StoreError::Unavailable("lock poisoned".to_string())
    }

    fn with_user<T>(&self, name: &str, f: impl FnOnce(&mut UserRecord) -> T) -> StoreResult<T> {
        self.check_available()?;
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        let record = users
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownUser(name.to_string()))?;
        Ok(f(record))
    }
}

impl UserStore for MemoryStore {
    fn exists(&self, user: &str) -> StoreResult<bool> {
        self.check_available()?;
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.contains_key(user))
    }

    fn update_status(&self, user: &str, status: UserStatus) -> StoreResult<()> {
        self.check_available()?;
        let mut users = self.users.write().map_err(|_| Self::poisoned())?;
        users.entry(user.to_string()).or_default().status = status;
        Ok(())
    }

    fn is_gaming(&self, user: &str) -> StoreResult<bool> {
        self.check_available()?;
        let users = self.users.read().map_err(|_| Self::poisoned())?;
        Ok(users.get(user).is_some_and(|u| u.status == UserStatus::Gaming))
    }

    fn record_win(&self, user: &str) -> StoreResult<u32> {
        self.with_user(user, |u| {
            u.wins += 1;
            u.wins
        })
    }

    fn record_loss(&self, user: &str) -> StoreResult<u32> {
        self.with_user(user, |u| {
            u.losses += 1;
            u.losses
        })
    }

    fn adjust_rating(&self, user: &str, delta: i32) -> StoreResult<i32> {
        self.with_user(user, |u| {
            u.rating += delta;
            u.rating
        })
    }

    fn award_badge(&self, user: &str, badge: Badge) -> StoreResult<()> {
        self.with_user(user, |u| {
            u.badges.insert(badge);
        })
    }
}

impl GameStore for MemoryStore {
    fn create_room(&self, rule: Rule) -> StoreResult<SessionId> {
        self.check_available()?;
        let id = SessionId(self.next_room_id.fetch_add(1, Ordering::SeqCst));
        self.rooms.write().map_err(|_| Self::poisoned())?.insert(id, rule);
        Ok(id)
    }

    fn delete_room(&self, id: SessionId) -> StoreResult<()> {
        self.check_available()?;
        self.rooms
            .write()
            .map_err(|_| Self::poisoned())?
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::UnknownRoom(id))
    }

    fn save_result(&self, result: &MatchResult) -> StoreResult<()> {
        self.check_available()?;
        self.history.write().map_err(|_| Self::poisoned())?.push(result.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_creates_user() {
        let store = MemoryStore::new();
        assert!(!store.exists("alice").unwrap());
        store.update_status("alice", UserStatus::Gaming).unwrap();
        assert!(store.exists("alice").unwrap());
        assert!(store.is_gaming("alice").unwrap());
    }

    #[test]
    fn aggregates_require_a_known_user() {
        let store = MemoryStore::new();
        assert_eq!(store.record_win("ghost"), Err(StoreError::UnknownUser("ghost".into())));
    }

    #[test]
    fn room_ids_are_sequential_and_deletable() {
        let store = MemoryStore::new();
        let first = store.create_room(Rule::Rank).unwrap();
        let second = store.create_room(Rule::Arcade).unwrap();
        assert_eq!(second.0, first.0 + 1);
        assert_eq!(store.room_rule(second), Some(Rule::Arcade));
        store.delete_room(first).unwrap();
        assert_eq!(store.delete_room(first), Err(StoreError::UnknownRoom(first)));
    }

    #[test]
    fn outage_fails_every_call() {
        let store = MemoryStore::with_users(["alice"]);
        store.set_available(false);
        assert!(matches!(store.exists("alice"), Err(StoreError::Unavailable(_))));
        assert!(matches!(store.create_room(Rule::Normal), Err(StoreError::Unavailable(_))));
        store.set_available(true);
        assert_eq!(store.record_win("alice"), Ok(1));
    }
}
