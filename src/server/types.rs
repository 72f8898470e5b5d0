//! Identifiers shared by every server component.

use std::fmt;

use serde::{Serialize, Deserialize};
use uuid::Uuid;

/// Logical identity of a user (their unique username).
pub type UserId = String;

/// Identifier of a game session, allocated by the game store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one websocket connection. A reconnecting user gets a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A logical broadcast channel connections can join and leave.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RoomId {
    ChatRoom(u64),
    GameRoom(SessionId),
    /// Direct-message channel between two users; the pair is stored sorted.
    Dm(UserId, UserId),
    ChatInvitation,
    GameInvitation,
    ChatRoomList,
    GameRoomList,
    DmList,
    FriendList,
}

impl RoomId {
    pub fn dm(a: &str, b: &str) -> Self {
        if a <= b {
            RoomId::Dm(a.to_string(), b.to_string())
        } else {
            RoomId::Dm(b.to_string(), a.to_string())
        }
    }

    pub fn game(id: SessionId) -> Self {
        RoomId::GameRoom(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::ChatRoom(id) => write!(f, "chatRoom#{}", id),
            RoomId::GameRoom(id) => write!(f, "gameRoom#{}", id),
            RoomId::Dm(a, b) => write!(f, "dm#{}:{}", a, b),
            RoomId::ChatInvitation => write!(f, "chatInvitation"),
            RoomId::GameInvitation => write!(f, "gameInvitation"),
            RoomId::ChatRoomList => write!(f, "chatRoomList"),
            RoomId::GameRoomList => write!(f, "gameRoomList"),
            RoomId::DmList => write!(f, "dmList"),
            RoomId::FriendList => write!(f, "friendList"),
        }
    }
}
