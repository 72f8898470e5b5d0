use actix::prelude::*;

use crate::game::types::Rule;
use crate::server::error::EngineError;
use crate::server::types::{ConnectionId, UserId};

/// Message: enqueue a user for a rule.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct SearchGame {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub rule: Rule,
}

/// Message: leave a rule's queue.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct CancelSearch {
    pub user_id: UserId,
    pub rule: Rule,
}

/// Message: challenge another user directly.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct InviteGame {
    pub from: UserId,
    pub to: UserId,
    pub rule: Rule,
}

/// Message: `responder` accepts the invitation sent by `from`.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct AcceptGame {
    pub from: UserId,
    pub responder: UserId,
}

/// Message: `responder` declines the invitation sent by `from`.
#[derive(Message, Debug)]
#[rtype(result = "Result<(), EngineError>")]
pub struct DeclineGame {
    pub from: UserId,
    pub responder: UserId,
}

/// Message: the user's registered connection closed.
#[derive(Message, Debug)]
#[rtype(result = "()")]
pub struct UserDisconnected {
    pub user_id: UserId,
}
