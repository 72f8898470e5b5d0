//! Inbound websocket frames.
//!
//! Frames are `{"event": <name>, "data": {...}}`. The event name is read first
//! so a malformed payload can still be answered with the right `*Result`.

use serde::Deserialize;
use serde_json::Value;

use crate::game::types::{Direction, Role, Rule};
use crate::server::error::EngineError;
use crate::server::events::ResultKind;
use crate::server::types::{RoomId, SessionId, UserId};

#[derive(Deserialize, Debug)]
struct RawFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Target of a subscribe/unsubscribe command.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub room_id: Option<u64>,
    #[serde(default)]
    pub username: Option<UserId>,
}

impl RoomRequest {
    /// Resolve the request to a room, from `user_id`'s point of view.
    pub fn resolve(&self, user_id: &str) -> Result<RoomId, EngineError> {
        let room_id = || {
            self.room_id
                .ok_or_else(|| EngineError::validation(format!("{} requires a roomId", self.kind)))
        };
        match self.kind.as_str() {
            "chatRoom" => Ok(RoomId::ChatRoom(room_id()?)),
            "gameRoom" => Ok(RoomId::game(SessionId(room_id()?))),
            "dm" => match self.username.as_deref() {
                Some(other) if !other.is_empty() => Ok(RoomId::dm(user_id, other)),
                _ => Err(EngineError::validation("dm requires a username")),
            },
            "chatInvitation" => Ok(RoomId::ChatInvitation),
            "gameInvitation" => Ok(RoomId::GameInvitation),
            "chatRoomList" => Ok(RoomId::ChatRoomList),
            "gameRoomList" => Ok(RoomId::GameRoomList),
            "dmList" => Ok(RoomId::DmList),
            "friendList" => Ok(RoomId::FriendList),
            other => Err(EngineError::validation(format!("Unknown room type: {}", other))),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    SearchGame { rule: Rule },
    CancelSearch { rule: Rule },
    InviteGame { username: UserId, rule: Rule },
    AcceptGame { username: UserId },
    DeclineGame { username: UserId },
    JoinGameRoom { room_id: SessionId },
    ExitGameRoom { room_id: SessionId },
    Up { room_id: SessionId, role: Role },
    Down { room_id: SessionId, role: Role },
    Subscribe(RoomRequest),
    Unsubscribe(RoomRequest),
    Ping,
}

impl ClientCommand {
    pub fn paddle(&self) -> Option<(SessionId, Role, Direction)> {
        match *self {
            ClientCommand::Up { room_id, role } => Some((room_id, role, Direction::Up)),
            ClientCommand::Down { room_id, role } => Some((room_id, role, Direction::Down)),
            _ => None,
        }
    }
}

/// A frame that could not be turned into a command.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    /// Known command, bad payload: answered with that command's `*Result`.
    Invalid { kind: ResultKind, error: EngineError },
    /// Unparsable frame, unknown event, or a bad fire-and-forget command.
    Unknown(String),
}

/// Which `*Result` answers the named event, if it has one.
fn result_kind(event: &str) -> Option<ResultKind> {
    match event {
        "searchGame" => Some(ResultKind::SearchGame),
        "cancelSearch" => Some(ResultKind::CancelSearch),
        "inviteGame" => Some(ResultKind::InviteGame),
        "acceptGame" => Some(ResultKind::AcceptGame),
        "declineGame" => Some(ResultKind::DeclineGame),
        "joinGameRoom" => Some(ResultKind::JoinGameRoom),
        "exitGameRoom" => Some(ResultKind::ExitGameRoom),
        "subscribe" => Some(ResultKind::Subscribe),
        "unsubscribe" => Some(ResultKind::Unsubscribe),
        _ => None,
    }
}

pub fn parse_frame(text: &str) -> Result<ClientCommand, FrameError> {
    let raw: RawFrame =
        serde_json::from_str(text).map_err(|e| FrameError::Unknown(format!("Invalid frame: {}", e)))?;
    if raw.event == "ping" {
        return Ok(ClientCommand::Ping);
    }
    let event = raw.event.clone();
    let frame = serde_json::json!({ "event": raw.event, "data": raw.data });
    serde_json::from_value::<ClientCommand>(frame).map_err(|e| match result_kind(&event) {
        Some(kind) => FrameError::Invalid {
            kind,
            error: EngineError::validation(format!("Invalid {} payload: {}", event, e)),
        },
        None => FrameError::Unknown(format!("Invalid {} message: {}", event, e)),
    })
}
