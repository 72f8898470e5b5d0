/// Presence server actor.
///
/// Single owner of the user ↔ connection map and of room membership. Every
/// outbound event is resolved to a connection at send time, so a user who just
/// reconnected always receives events on the new socket.

use actix::prelude::*;
use log::{debug, info, warn};

use super::messages::{
    DropRoom, EmitToRoom, FetchMembers, JoinRoom, LeaveRoom, LookupConnection, LookupUser,
    MarkOnline, NotifyIfMember, Register, SendToUser, Unregister,
};
use super::registry::{AlreadyLoggedIn, PresenceRegistry};
use super::rooms::RoomTable;
use crate::server::events::ServerEvent;
use crate::store::{SharedStore, UserStatus};

pub struct PresenceServer {
    registry: PresenceRegistry,
    rooms: RoomTable,
    store: SharedStore,
}

impl PresenceServer {
    pub fn new(store: SharedStore) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            rooms: RoomTable::new(),
            store,
        }
    }

    fn send_to(&self, user_id: &str, event: ServerEvent) {
        match self.registry.lookup_connection(user_id) {
            Some(conn) => conn.send(event),
            None => debug!("[Presence] Dropping event for offline user {}", user_id),
        }
    }

    fn set_status(&self, user_id: &str, status: UserStatus) {
        if let Err(e) = self.store.update_status(user_id, status) {
            warn!("[Presence] Could not set {} {:?}: {}", user_id, status, e);
        }
    }

    /// A running session owns the `gaming` status until it releases the user.
    fn is_gaming(&self, user_id: &str) -> bool {
        self.store.is_gaming(user_id).unwrap_or_else(|e| {
            warn!("[Presence] Could not read the status of {}: {}", user_id, e);
            false
        })
    }
}

impl Actor for PresenceServer {
    type Context = Context<Self>;
}

impl Handler<Register> for PresenceServer {
    type Result = Result<(), AlreadyLoggedIn>;

    /// Handles a connection claiming its identity.
    fn handle(&mut self, msg: Register, _ctx: &mut Self::Context) -> Self::Result {
        let user_id = msg.connection.user_id.clone();
        let connection_id = msg.connection.id;
        if let Err(e) = self.registry.register(msg.connection) {
            warn!("[Presence] Refused duplicate login for {}", user_id);
            return Err(e);
        }
        if self.is_gaming(&user_id) {
            info!("[Presence] {} reconnected during a game (connection={})", user_id, connection_id);
        } else {
            self.set_status(&user_id, UserStatus::Online);
            info!("[Presence] {} connected (connection={})", user_id, connection_id);
        }
        Ok(())
    }
}

impl Handler<Unregister> for PresenceServer {
    type Result = ();

    /// Handles a connection closing. Ignored unless it is the registered one.
    fn handle(&mut self, msg: Unregister, _ctx: &mut Self::Context) -> Self::Result {
        if self.registry.unregister(&msg.user_id, msg.connection_id).is_none() {
            debug!("[Presence] Ignoring unregister of stale connection {} for {}", msg.connection_id, msg.user_id);
            return;
        }
        self.rooms.leave_all(&msg.user_id);
        if !self.is_gaming(&msg.user_id) {
            self.set_status(&msg.user_id, UserStatus::Offline);
        }
        info!("[Presence] {} disconnected", msg.user_id);
    }
}

impl Handler<LookupConnection> for PresenceServer {
    type Result = MessageResult<LookupConnection>;

    fn handle(&mut self, msg: LookupConnection, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.registry.lookup_connection(&msg.user_id).cloned())
    }
}

impl Handler<LookupUser> for PresenceServer {
    type Result = MessageResult<LookupUser>;

    fn handle(&mut self, msg: LookupUser, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.registry.lookup_user(msg.connection_id).cloned())
    }
}

impl Handler<SendToUser> for PresenceServer {
    type Result = ();

    fn handle(&mut self, msg: SendToUser, _ctx: &mut Self::Context) -> Self::Result {
        self.send_to(&msg.user_id, msg.event);
    }
}

impl Handler<NotifyIfMember> for PresenceServer {
    type Result = ();

    fn handle(&mut self, msg: NotifyIfMember, _ctx: &mut Self::Context) -> Self::Result {
        if self.rooms.is_member(&msg.room, &msg.user_id) {
            self.send_to(&msg.user_id, msg.event);
        }
    }
}

impl Handler<JoinRoom> for PresenceServer {
    type Result = bool;

    fn handle(&mut self, msg: JoinRoom, _ctx: &mut Self::Context) -> Self::Result {
        if !self.registry.is_online(&msg.user_id) {
            debug!("[Presence] {} is offline, not joining {}", msg.user_id, msg.room);
            return false;
        }
        debug!("[Presence] {} joined {}", msg.user_id, msg.room);
        self.rooms.join(msg.room, &msg.user_id)
    }
}

impl Handler<LeaveRoom> for PresenceServer {
    type Result = bool;

    fn handle(&mut self, msg: LeaveRoom, _ctx: &mut Self::Context) -> Self::Result {
        debug!("[Presence] {} left {}", msg.user_id, msg.room);
        self.rooms.leave(&msg.room, &msg.user_id)
    }
}

impl Handler<DropRoom> for PresenceServer {
    type Result = ();

    fn handle(&mut self, msg: DropRoom, _ctx: &mut Self::Context) -> Self::Result {
        let members = self.rooms.drop_room(&msg.room);
        debug!("[Presence] Dropped {} ({} members)", msg.room, members.len());
    }
}

impl Handler<EmitToRoom> for PresenceServer {
    type Result = ();

    fn handle(&mut self, msg: EmitToRoom, _ctx: &mut Self::Context) -> Self::Result {
        for user_id in self.rooms.members(&msg.room) {
            self.send_to(&user_id, msg.event.clone());
        }
    }
}

impl Handler<FetchMembers> for PresenceServer {
    type Result = MessageResult<FetchMembers>;

    fn handle(&mut self, msg: FetchMembers, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.rooms.members(&msg.room))
    }
}

impl Handler<MarkOnline> for PresenceServer {
    type Result = ();

    fn handle(&mut self, msg: MarkOnline, _ctx: &mut Self::Context) -> Self::Result {
        for user_id in &msg.user_ids {
            let status = if self.registry.is_online(user_id) { UserStatus::Online } else { UserStatus::Offline };
            self.set_status(user_id, status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::server::events::{GameMessage, ServerEvent};
    use crate::server::presence::registry::Connection;
    use crate::server::test_support::{collector, settle};
    use crate::server::types::RoomId;
    use crate::store::{MemoryStore, UserStore};

    #[actix::test]
    async fn register_marks_user_online_and_refuses_duplicates() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store.clone()).start();
        let (rx1, _) = collector();
        let (rx2, _) = collector();

        assert!(presence.send(Register { connection: Connection::new("alice", rx1) }).await.unwrap().is_ok());
        let second = presence.send(Register { connection: Connection::new("alice", rx2) }).await.unwrap();

        assert_eq!(second, Err(AlreadyLoggedIn("alice".into())));
        assert_eq!(store.user("alice").map(|u| u.status), Some(UserStatus::Online));
        assert!(!store.is_gaming("alice").unwrap());
    }

    #[actix::test]
    async fn emit_resolves_current_connection() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store).start();
        let (old_rx, old_events) = collector();
        let (new_rx, new_events) = collector();

        let old = Connection::new("alice", old_rx);
        let old_id = old.id;
        presence.send(Register { connection: old }).await.unwrap().unwrap();
        presence.send(Unregister { user_id: "alice".into(), connection_id: old_id }).await.unwrap();
        presence.send(Register { connection: Connection::new("alice", new_rx) }).await.unwrap().unwrap();
        presence.send(JoinRoom { user_id: "alice".into(), room: RoomId::GameRoomList }).await.unwrap();

        let event = ServerEvent::message(GameMessage::Spectator { list: vec![] });
        presence.send(EmitToRoom { room: RoomId::GameRoomList, event }).await.unwrap();
        settle().await;

        assert!(old_events.lock().unwrap().is_empty());
        assert_eq!(new_events.lock().unwrap().len(), 1);
    }

    #[actix::test]
    async fn disconnect_leaves_rooms() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store.clone()).start();
        let (rx, _) = collector();
        let conn = Connection::new("bob", rx);
        let conn_id = conn.id;
        presence.send(Register { connection: conn }).await.unwrap().unwrap();
        presence.send(JoinRoom { user_id: "bob".into(), room: RoomId::GameInvitation }).await.unwrap();

        presence.send(Unregister { user_id: "bob".into(), connection_id: conn_id }).await.unwrap();

        let members = presence.send(FetchMembers { room: RoomId::GameInvitation }).await.unwrap();
        assert!(members.is_empty());
        assert!(presence.send(LookupUser { connection_id: conn_id }).await.unwrap().is_none());
        assert_eq!(store.user("bob").map(|u| u.status), Some(UserStatus::Offline));
    }

    #[actix::test]
    async fn mark_online_skips_disconnected_users() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store.clone()).start();
        let (rx, _) = collector();
        presence.send(Register { connection: Connection::new("alice", rx) }).await.unwrap().unwrap();
        store.update_status("alice", UserStatus::Gaming).unwrap();
        store.update_status("bob", UserStatus::Gaming).unwrap();

        presence.send(MarkOnline { user_ids: vec!["alice".into(), "bob".into()] }).await.unwrap();

        assert_eq!(store.user("alice").map(|u| u.status), Some(UserStatus::Online));
        assert_eq!(store.user("bob").map(|u| u.status), Some(UserStatus::Offline));
    }

    #[actix::test]
    async fn reconnecting_player_stays_in_game() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store.clone()).start();
        let (first_rx, _) = collector();
        let (second_rx, _) = collector();
        let first = Connection::new("alice", first_rx);
        let first_id = first.id;
        presence.send(Register { connection: first }).await.unwrap().unwrap();
        store.update_status("alice", UserStatus::Gaming).unwrap();

        presence.send(Unregister { user_id: "alice".into(), connection_id: first_id }).await.unwrap();
        assert!(store.is_gaming("alice").unwrap());

        presence.send(Register { connection: Connection::new("alice", second_rx) }).await.unwrap().unwrap();
        assert!(store.is_gaming("alice").unwrap());

        presence.send(MarkOnline { user_ids: vec!["alice".into()] }).await.unwrap();
        assert_eq!(store.user("alice").map(|u| u.status), Some(UserStatus::Online));
    }

    #[actix::test]
    async fn notify_if_member_skips_non_members() {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store).start();
        let (rx, events) = collector();
        presence.send(Register { connection: Connection::new("carol", rx) }).await.unwrap().unwrap();

        let invite = ServerEvent::message(GameMessage::GameInvitation { from: "dave".into() });
        presence
            .send(NotifyIfMember { room: RoomId::GameInvitation, user_id: "carol".into(), event: invite.clone() })
            .await
            .unwrap();
        presence.send(JoinRoom { user_id: "carol".into(), room: RoomId::GameInvitation }).await.unwrap();
        presence
            .send(NotifyIfMember { room: RoomId::GameInvitation, user_id: "carol".into(), event: invite.clone() })
            .await
            .unwrap();
        settle().await;

        assert_eq!(events.lock().unwrap().as_slice(), &[invite]);
    }
}
