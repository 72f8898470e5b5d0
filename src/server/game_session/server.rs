/// Game session manager actor.
///
/// Owns the session directory: creates sessions for matched users, routes
/// in-game commands to the right session actor, tears rooms down when a session
/// finishes and keeps the `gameRoomList` channel up to date.

use actix::prelude::*;
use std::collections::BTreeMap;
use log::{debug, info, warn};

use super::messages::{
    AddSpectator, CreateSession, ExitGameRoom, JoinGameRoom, Leave, ListSessions, Move, MovePaddle,
    SessionFinished,
};
use super::session::GameSession;
use crate::server::error::EngineError;
use crate::server::events::{GameMessage, GameRoomSummary, ServerEvent};
use crate::server::presence::PresenceServer;
use crate::server::presence::messages::{DropRoom, EmitToRoom, JoinRoom, MarkOnline};
use crate::server::types::{RoomId, SessionId};
use crate::store::{SharedStore, UserStatus};

struct SessionEntry {
    addr: Addr<GameSession>,
    summary: GameRoomSummary,
}

pub struct GameSessionManager {
    sessions: BTreeMap<SessionId, SessionEntry>,
    presence: Addr<PresenceServer>,
    store: SharedStore,
}

impl GameSessionManager {
    pub fn new(presence: Addr<PresenceServer>, store: SharedStore) -> Self {
        Self {
            sessions: BTreeMap::new(),
            presence,
            store,
        }
    }

    fn room_list(&self) -> Vec<GameRoomSummary> {
        self.sessions.values().map(|entry| entry.summary.clone()).collect()
    }

    /// Push the current room list to every `gameRoomList` subscriber.
    fn broadcast_room_list(&self) {
        let event = ServerEvent::message(GameMessage::GameRoomList { list: self.room_list() });
        self.presence.do_send(EmitToRoom { room: RoomId::GameRoomList, event });
    }

    fn lookup(&self, session_id: SessionId) -> Result<&SessionEntry, EngineError> {
        self.sessions
            .get(&session_id)
            .ok_or_else(|| EngineError::stale(format!("room {} does not exist", session_id)))
    }

    fn create_session(&mut self, msg: CreateSession, ctx: &mut Context<Self>) -> Result<SessionId, EngineError> {
        let session_id = self.store.create_room(msg.rule)?;

        for user in [&msg.red, &msg.blue] {
            if let Err(e) = self.store.update_status(user, UserStatus::Gaming) {
                warn!("[GameSession] Could not mark {} in game, abandoning room {}: {}", user, session_id, e);
                if let Err(e) = self.store.delete_room(session_id) {
                    warn!("[GameSession] Could not delete room {}: {}", session_id, e);
                }
                self.presence.do_send(MarkOnline { user_ids: vec![msg.red.clone(), msg.blue.clone()] });
                return Err(e.into());
            }
        }

        for user in [&msg.red, &msg.blue] {
            self.presence.do_send(JoinRoom { user_id: user.clone(), room: RoomId::game(session_id) });
        }

        let addr = GameSession::new(
            session_id,
            msg.rule,
            msg.red.clone(),
            msg.blue.clone(),
            ctx.address().recipient(),
            self.presence.clone(),
            self.store.clone(),
        )
        .start();

        info!(
            "[GameSession] Created {} room {}: {} (red) vs {} (blue)",
            msg.rule.as_str(),
            session_id,
            msg.red,
            msg.blue
        );
        let summary = GameRoomSummary { room_id: session_id, rule: msg.rule, red: msg.red, blue: msg.blue };
        self.sessions.insert(session_id, SessionEntry { addr, summary });
        self.broadcast_room_list();
        Ok(session_id)
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

impl Handler<CreateSession> for GameSessionManager {
    type Result = Result<SessionId, EngineError>;

    fn handle(&mut self, msg: CreateSession, ctx: &mut Self::Context) -> Self::Result {
        self.create_session(msg, ctx)
    }
}

impl Handler<JoinGameRoom> for GameSessionManager {
    type Result = Result<(), EngineError>;

    fn handle(&mut self, msg: JoinGameRoom, _ctx: &mut Self::Context) -> Self::Result {
        let entry = self.lookup(msg.session_id)?;
        entry.addr.do_send(AddSpectator { user_id: msg.user_id });
        Ok(())
    }
}

impl Handler<ExitGameRoom> for GameSessionManager {
    type Result = Result<(), EngineError>;

    fn handle(&mut self, msg: ExitGameRoom, _ctx: &mut Self::Context) -> Self::Result {
        let entry = self.lookup(msg.session_id)?;
        entry.addr.do_send(Leave { user_id: msg.user_id });
        Ok(())
    }
}

impl Handler<MovePaddle> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: MovePaddle, _ctx: &mut Self::Context) -> Self::Result {
        match self.lookup(msg.session_id) {
            Ok(entry) => entry.addr.do_send(Move {
                user_id: msg.user_id,
                role: msg.role,
                direction: msg.direction,
            }),
            Err(e) => debug!("[GameSession] Ignoring paddle move from {}: {}", msg.user_id, e),
        }
    }
}

impl Handler<SessionFinished> for GameSessionManager {
    type Result = ();

    /// Handles the end of a session: drop the room and free both participants.
    fn handle(&mut self, msg: SessionFinished, _ctx: &mut Self::Context) -> Self::Result {
        let Some(entry) = self.sessions.remove(&msg.session_id) else {
            debug!("[GameSession] Room {} already torn down", msg.session_id);
            return;
        };
        self.presence.do_send(DropRoom { room: RoomId::game(msg.session_id) });
        if let Err(e) = self.store.delete_room(msg.session_id) {
            warn!("[GameSession] Could not delete room {}: {}", msg.session_id, e);
        }
        self.presence.do_send(MarkOnline { user_ids: vec![entry.summary.red, entry.summary.blue] });
        self.broadcast_room_list();
    }
}

impl Handler<ListSessions> for GameSessionManager {
    type Result = MessageResult<ListSessions>;

    fn handle(&mut self, _msg: ListSessions, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.room_list())
    }
}
