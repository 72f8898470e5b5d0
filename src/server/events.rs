//! Outbound events pushed to a connection.
//!
//! Serialized as `{"event": "<name>", "data": {...}}`.

use actix::prelude::*;
use serde::Serialize;

use crate::game::state::PongState;
use crate::game::types::{Role, Rule};
use crate::server::types::{SessionId, UserId};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Approved,
    Searching,
    Match,
    Waiting,
    Accept,
    Decline,
    Warning,
    Error,
}

/// Body shared by every `*Result` event.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub status: ResultStatus,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl CommandResult {
    pub fn new(status: ResultStatus) -> Self {
        Self {
            status,
            kind: None,
            username: None,
            room_id: None,
            detail: None,
        }
    }

    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn username(mut self, username: impl Into<UserId>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn room(mut self, room_id: u64) -> Self {
        self.room_id = Some(room_id);
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Full state of a running session, broadcast every tick.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameStatus {
    pub room_id: SessionId,
    pub playing: bool,
    pub red_user: UserId,
    pub blue_user: UserId,
    #[serde(flatten)]
    pub state: PongState,
}

/// One entry of the game-room list.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameRoomSummary {
    pub room_id: SessionId,
    pub rule: Rule,
    pub red: UserId,
    pub blue: UserId,
}

/// One entry of the spectator list.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct SpectatorEntry {
    pub username: UserId,
}

/// Payload of the multiplexed `message` event.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameMessage {
    Game { status: GameStatus },
    Win { room_id: SessionId },
    Lose { room_id: SessionId },
    Finish { room_id: SessionId, winner: Role },
    Spectator { list: Vec<SpectatorEntry> },
    GameRoomList { list: Vec<GameRoomSummary> },
    GameInvitation { from: UserId },
}

// Message serveur -> client
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    SearchGameResult(CommandResult),
    CancelSearchResult(CommandResult),
    InviteGameResult(CommandResult),
    AcceptGameResult(CommandResult),
    DeclineGameResult(CommandResult),
    JoinGameRoomResult(CommandResult),
    ExitGameRoomResult(CommandResult),
    SubscribeResult(CommandResult),
    UnsubscribeResult(CommandResult),
    Message(GameMessage),
    Error { code: String, message: String },
}

impl ServerEvent {
    pub fn message(msg: GameMessage) -> Self {
        Self::Message(msg)
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::Error { code: code.to_string(), message: message.to_string() }
    }

    /// Result body if this is a `*Result` event.
    #[cfg(test)]
    pub fn result(&self) -> Option<&CommandResult> {
        match self {
            Self::SearchGameResult(r)
            | Self::CancelSearchResult(r)
            | Self::InviteGameResult(r)
            | Self::AcceptGameResult(r)
            | Self::DeclineGameResult(r)
            | Self::JoinGameRoomResult(r)
            | Self::ExitGameRoomResult(r)
            | Self::SubscribeResult(r)
            | Self::UnsubscribeResult(r) => Some(r),
            Self::Message(_) | Self::Error { .. } => None,
        }
    }
}

/// Which `*Result` event answers a given command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    SearchGame,
    CancelSearch,
    InviteGame,
    AcceptGame,
    DeclineGame,
    JoinGameRoom,
    ExitGameRoom,
    Subscribe,
    Unsubscribe,
}

impl ResultKind {
    pub fn event(self, result: CommandResult) -> ServerEvent {
        match self {
            ResultKind::SearchGame => ServerEvent::SearchGameResult(result),
            ResultKind::CancelSearch => ServerEvent::CancelSearchResult(result),
            ResultKind::InviteGame => ServerEvent::InviteGameResult(result),
            ResultKind::AcceptGame => ServerEvent::AcceptGameResult(result),
            ResultKind::DeclineGame => ServerEvent::DeclineGameResult(result),
            ResultKind::JoinGameRoom => ServerEvent::JoinGameRoomResult(result),
            ResultKind::ExitGameRoom => ServerEvent::ExitGameRoomResult(result),
            ResultKind::Subscribe => ServerEvent::SubscribeResult(result),
            ResultKind::Unsubscribe => ServerEvent::UnsubscribeResult(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_event_wire_format() {
        let event = ServerEvent::SearchGameResult(CommandResult::new(ResultStatus::Match).room(4));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value, json!({"event": "searchGameResult", "data": {"status": "match", "roomId": 4}}));
    }

    #[test]
    fn message_event_is_tagged_by_type() {
        let event = ServerEvent::message(GameMessage::Finish { room_id: SessionId(2), winner: Role::Red });
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({"event": "message", "data": {"type": "finish", "roomId": 2, "winner": "red"}})
        );
    }

    #[test]
    fn spectator_list_carries_usernames() {
        let msg = GameMessage::Spectator { list: vec![SpectatorEntry { username: "carol".into() }] };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value, json!({"type": "spectator", "list": [{"username": "carol"}]}));
    }

    #[test]
    fn room_list_entries_use_camel_case() {
        let msg = GameMessage::GameRoomList {
            list: vec![GameRoomSummary {
                room_id: SessionId(1),
                rule: Rule::Arcade,
                red: "alice".into(),
                blue: "bob".into(),
            }],
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "gameRoomList");
        assert_eq!(value["list"][0]["roomId"], 1);
        assert_eq!(value["list"][0]["rule"], "arcade");
    }
}
