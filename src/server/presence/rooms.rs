//! Logical room membership: which users listen on which channel.

use std::collections::{BTreeSet, HashMap};

use crate::server::types::{RoomId, UserId};

#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomId, BTreeSet<UserId>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the user was already a member.
    pub fn join(&mut self, room: RoomId, user_id: &str) -> bool {
        self.rooms.entry(room).or_default().insert(user_id.to_string())
    }

    /// Returns false if the user was not a member.
    pub fn leave(&mut self, room: &RoomId, user_id: &str) -> bool {
        let Some(members) = self.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(user_id);
        if members.is_empty() {
            self.rooms.remove(room);
        }
        removed
    }

    /// Remove every user from every room (disconnect).
    pub fn leave_all(&mut self, user_id: &str) {
        self.rooms.retain(|_, members| {
            members.remove(user_id);
            !members.is_empty()
        });
    }

    /// Tear the room down, returning its former members.
    pub fn drop_room(&mut self, room: &RoomId) -> Vec<UserId> {
        self.rooms
            .remove(room)
            .map(|members| members.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn members(&self, room: &RoomId) -> Vec<UserId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_member(&self, room: &RoomId, user_id: &str) -> bool {
        self.rooms.get(room).is_some_and(|members| members.contains(user_id))
    }
}
