use actix::SpawnHandle;
use std::time::Instant;

use crate::game::types::Rule;
use crate::server::types::{ConnectionId, UserId};

/// A user waiting for an opponent under one rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueueEntry {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
    pub enqueued_at: Instant,
}

impl QueueEntry {
    pub fn new(user_id: impl Into<UserId>, connection_id: ConnectionId) -> Self {
        Self {
            user_id: user_id.into(),
            connection_id,
            enqueued_at: Instant::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvitationStatus {
    Waiting,
    Accepted,
    Declined,
}

/// A direct challenge from one user to another.
#[derive(Debug)]
pub struct Invitation {
    pub from: UserId,
    pub to: UserId,
    pub rule: Rule,
    pub status: InvitationStatus,
    /// Countdown ticks elapsed without an answer.
    pub elapsed: u32,
    pub timer: Option<SpawnHandle>,
}

impl Invitation {
    pub fn new(from: impl Into<UserId>, to: impl Into<UserId>, rule: Rule) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rule,
            status: InvitationStatus::Waiting,
            elapsed: 0,
            timer: None,
        }
    }
}
