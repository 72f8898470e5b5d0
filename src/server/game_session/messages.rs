use actix::prelude::*;

use crate::game::types::{Direction, Role, Rule};
use crate::server::error::EngineError;
use crate::server::events::GameRoomSummary;
use crate::server::types::{SessionId, UserId};

/// Message: open a session for two matched users. First user plays red.
#[derive(Message, Debug)]
#[rtype(result = "Result<SessionId, EngineError>")]
pub struct CreateSession {
    pub rule: Rule,
    pub red: UserId,
    pub blue: UserId,
}

/// Message: a user opens a session's room (participant or spectator).
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct JoinGameRoom {
    pub session_id: SessionId,
    pub user_id: UserId,
}

/// Message: a user leaves a session's room. A participant leaving forfeits.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct ExitGameRoom {
    pub session_id: SessionId,
    pub user_id: UserId,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct MovePaddle {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub role: Role,
    pub direction: Direction,
}

/// Message: a session actor reached `Finished`; the manager tears the room down.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct SessionFinished {
    pub session_id: SessionId,
}

/// Message: snapshot of the game-room list.
#[derive(Message, Debug)]
#[rtype(result = "Vec<GameRoomSummary>")]
pub struct ListSessions;

// Session-level messages, routed by the manager.

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct AddSpectator {
    pub user_id: UserId,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Leave {
    pub user_id: UserId,
}

#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct Move {
    pub user_id: UserId,
    pub role: Role,
    pub direction: Direction,
}
