use actix::prelude::*;

use super::registry::{AlreadyLoggedIn, Connection};
use crate::server::events::ServerEvent;
use crate::server::types::{ConnectionId, RoomId, UserId};

/// Message: a freshly authenticated connection claims its user identity.
#[derive(Message)]
#[rtype(result = "Result<(), AlreadyLoggedIn>")]
pub struct Register {
    pub connection: Connection,
}

/// Message: a connection closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Unregister {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
}

#[derive(Message)]
#[rtype(result = "Option<Connection>")]
pub struct LookupConnection {
    pub user_id: UserId,
}

#[derive(Message)]
#[rtype(result = "Option<UserId>")]
pub struct LookupUser {
    pub connection_id: ConnectionId,
}

/// Message: push an event to one user's current connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct SendToUser {
    pub user_id: UserId,
    pub event: ServerEvent,
}

/// Message: push an event to a user only if they listen on `room`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct NotifyIfMember {
    pub room: RoomId,
    pub user_id: UserId,
    pub event: ServerEvent,
}

#[derive(Message)]
#[rtype(result = "bool")]
pub struct JoinRoom {
    pub user_id: UserId,
    pub room: RoomId,
}

#[derive(Message)]
#[rtype(result = "bool")]
pub struct LeaveRoom {
    pub user_id: UserId,
    pub room: RoomId,
}

/// Message: remove every member of a room (session teardown).
#[derive(Message)]
#[rtype(result = "()")]
pub struct DropRoom {
    pub room: RoomId,
}

/// Message: broadcast an event to every member of a room.
#[derive(Message)]
#[rtype(result = "()")]
pub struct EmitToRoom {
    pub room: RoomId,
    pub event: ServerEvent,
}

#[derive(Message)]
#[rtype(result = "Vec<UserId>")]
pub struct FetchMembers {
    pub room: RoomId,
}

/// Message: put users back to `online` once their session ended.
/// Users who disconnected in the meantime are set `offline`.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MarkOnline {
    pub user_ids: Vec<UserId>,
}
