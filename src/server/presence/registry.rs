//! Identity ↔ connection map.
//!
//! Enforces a single live connection per user: a second registration for the
//! same user is refused, never silently replacing the first.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use actix::Recipient;

use crate::server::error::EngineError;
use crate::server::events::ServerEvent;
use crate::server::types::{ConnectionId, UserId};

/// A live, authenticated connection.
#[derive(Clone)]
pub struct Connection {
    pub user_id: UserId,
    pub id: ConnectionId,
    pub recipient: Recipient<ServerEvent>,
    pub joined_at: Instant,
}

impl Connection {
    pub fn new(user_id: impl Into<UserId>, recipient: Recipient<ServerEvent>) -> Self {
        Self {
            user_id: user_id.into(),
            id: ConnectionId::new(),
            recipient,
            joined_at: Instant::now(),
        }
    }

    pub fn send(&self, event: ServerEvent) {
        self.recipient.do_send(event);
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("user_id", &self.user_id)
            .field("id", &self.id)
            .field("joined_at", &self.joined_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("User {0} is already logged in")]
pub struct AlreadyLoggedIn(pub UserId);

impl From<AlreadyLoggedIn> for EngineError {
    fn from(err: AlreadyLoggedIn) -> Self {
        EngineError::rejected(err.to_string())
    }
}

#[derive(Default)]
pub struct PresenceRegistry {
    by_user: HashMap<UserId, Connection>,
    by_connection: HashMap<ConnectionId, UserId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, connection: Connection) -> Result<(), AlreadyLoggedIn> {
        if self.by_user.contains_key(&connection.user_id) {
            return Err(AlreadyLoggedIn(connection.user_id));
        }
        self.by_connection.insert(connection.id, connection.user_id.clone());
        self.by_user.insert(connection.user_id.clone(), connection);
        Ok(())
    }

    /// Remove the user's entry, but only if `connection_id` is the registered one.
    /// A refused duplicate closing its socket must not log the original out.
    pub fn unregister(&mut self, user_id: &str, connection_id: ConnectionId) -> Option<Connection> {
        match self.by_user.get(user_id) {
            Some(conn) if conn.id == connection_id => {
                self.by_connection.remove(&connection_id);
                self.by_user.remove(user_id)
            }
            _ => None,
        }
    }

    pub fn lookup_connection(&self, user_id: &str) -> Option<&Connection> {
        self.by_user.get(user_id)
    }

    pub fn lookup_user(&self, connection_id: ConnectionId) -> Option<&UserId> {
        self.by_connection.get(&connection_id)
    }

    pub fn is_online(&self, user_id: &str) -> bool {
        self.by_user.contains_key(user_id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}
