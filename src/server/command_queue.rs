//! Room command serializer.
//!
//! Subscribe/unsubscribe commands from every connection go through one bounded
//! FIFO channel drained by a single worker, so room membership is mutated by
//! exactly one command at a time, in arrival order.

use actix::Addr;
use log::{debug, error, info};
use tokio::sync::mpsc;

use crate::config::command_queue::COMMAND_QUEUE_CAPACITY;
use crate::server::error::EngineError;
use crate::server::events::{CommandResult, GameMessage, ResultKind, ResultStatus, ServerEvent};
use crate::server::game_session::GameSessionManager;
use crate::server::game_session::messages::ListSessions;
use crate::server::presence::PresenceServer;
use crate::server::presence::messages::{JoinRoom, LeaveRoom, SendToUser};
use crate::server::types::{RoomId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAction {
    Subscribe,
    Unsubscribe,
}

impl RoomAction {
    fn result_kind(self) -> ResultKind {
        match self {
            RoomAction::Subscribe => ResultKind::Subscribe,
            RoomAction::Unsubscribe => ResultKind::Unsubscribe,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoomCommand {
    pub user_id: UserId,
    pub action: RoomAction,
    /// Channel type as sent by the client, echoed in the acknowledgement.
    pub kind: String,
    pub room: Option<RoomId>,
    pub room_id: Option<u64>,
    /// Rejected upstream: acknowledged as an error without being applied.
    pub failed: bool,
}

impl RoomCommand {
    pub fn new(user_id: impl Into<UserId>, action: RoomAction, kind: impl Into<String>, room: RoomId) -> Self {
        let room_id = match &room {
            RoomId::ChatRoom(id) => Some(*id),
            RoomId::GameRoom(id) => Some(id.0),
            _ => None,
        };
        Self {
            user_id: user_id.into(),
            action,
            kind: kind.into(),
            room: Some(room),
            room_id,
            failed: false,
        }
    }

    pub fn rejected(
        user_id: impl Into<UserId>,
        action: RoomAction,
        kind: impl Into<String>,
        room_id: Option<u64>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            action,
            kind: kind.into(),
            room: None,
            room_id,
            failed: true,
        }
    }

    fn ack(&self, status: ResultStatus) -> CommandResult {
        let result = CommandResult::new(status).kind(self.kind.clone());
        match self.room_id {
            Some(id) => result.room(id),
            None => result,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Room command queue is full")]
    Full,
    #[error("Room command worker has stopped")]
    Closed,
}

/// Handle used by connections to enqueue room commands. Cheap to clone.
#[derive(Clone)]
pub struct CommandSerializer {
    tx: mpsc::Sender<RoomCommand>,
}

impl CommandSerializer {
    /// Spawn the worker on the current arbiter and return the submission handle.
    pub fn start(presence: Addr<PresenceServer>, game_sessions: Addr<GameSessionManager>) -> Self {
        Self::with_capacity(COMMAND_QUEUE_CAPACITY, presence, game_sessions)
    }

    pub fn with_capacity(
        capacity: usize,
        presence: Addr<PresenceServer>,
        game_sessions: Addr<GameSessionManager>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        actix::spawn(run_worker(rx, RoomWorker { presence, game_sessions }));
        info!("[CommandQueue] Worker started (capacity {})", capacity);
        Self { tx }
    }

    /// Enqueue without waiting.
    pub fn submit(&self, command: RoomCommand) -> Result<(), SubmitError> {
        self.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => SubmitError::Full,
            mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
        })
    }
}

struct RoomWorker {
    presence: Addr<PresenceServer>,
    game_sessions: Addr<GameSessionManager>,
}

impl RoomWorker {
    async fn apply(&self, command: &RoomCommand) -> Result<(), EngineError> {
        let room = command
            .room
            .clone()
            .ok_or_else(|| EngineError::validation("Unknown room"))?;
        match command.action {
            RoomAction::Subscribe => {
                let joined = self
                    .presence
                    .send(JoinRoom { user_id: command.user_id.clone(), room: room.clone() })
                    .await?;
                if !joined {
                    debug!("[CommandQueue] {} already listens on {}", command.user_id, room);
                }
                if room == RoomId::GameRoomList {
                    let list = self.game_sessions.send(ListSessions).await?;
                    self.presence.do_send(SendToUser {
                        user_id: command.user_id.clone(),
                        event: ServerEvent::message(GameMessage::GameRoomList { list }),
                    });
                }
            }
            RoomAction::Unsubscribe => {
                self.presence
                    .send(LeaveRoom { user_id: command.user_id.clone(), room })
                    .await?;
            }
        }
        Ok(())
    }

    fn acknowledge(&self, command: &RoomCommand, result: CommandResult) {
        self.presence.do_send(SendToUser {
            user_id: command.user_id.clone(),
            event: command.action.result_kind().event(result),
        });
    }
}

async fn run_worker(mut rx: mpsc::Receiver<RoomCommand>, worker: RoomWorker) {
    while let Some(command) = rx.recv().await {
        if command.failed {
            debug!("[CommandQueue] Skipping rejected {:?} from {}", command.action, command.user_id);
            worker.acknowledge(&command, command.ack(ResultStatus::Error));
            continue;
        }
        match worker.apply(&command).await {
            Ok(()) => worker.acknowledge(&command, command.ack(ResultStatus::Approved)),
            Err(e) => {
                error!("[CommandQueue] {:?} {} for {} failed: {}", command.action, command.kind, command.user_id, e);
                worker.acknowledge(&command, command.ack(e.status()).detail(e.public_detail()));
            }
        }
    }
    info!("[CommandQueue] Worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use std::sync::Arc;

    use crate::server::presence::messages::{FetchMembers, Register};
    use crate::server::presence::registry::Connection;
    use crate::server::test_support::{collector, drain, settle};
    use crate::store::MemoryStore;

    fn start() -> (Addr<PresenceServer>, Addr<GameSessionManager>) {
        let store = Arc::new(MemoryStore::new());
        let presence = PresenceServer::new(store.clone()).start();
        let sessions = GameSessionManager::new(presence.clone(), store).start();
        (presence, sessions)
    }

    #[actix::test]
    async fn acknowledges_in_submission_order_and_skips_rejected() {
        let (presence, sessions) = start();
        let (rx, events) = collector();
        presence.send(Register { connection: Connection::new("alice", rx) }).await.unwrap().unwrap();
        let commands = CommandSerializer::start(presence.clone(), sessions);

        let sub = RoomAction::Subscribe;
        commands.submit(RoomCommand::new("alice", sub, "gameRoomList", RoomId::GameRoomList)).unwrap();
        commands.submit(RoomCommand::new("alice", sub, "gameInvitation", RoomId::GameInvitation)).unwrap();
        commands.submit(RoomCommand::rejected("alice", sub, "chatRoom", Some(3))).unwrap();
        commands
            .submit(RoomCommand::new("alice", RoomAction::Unsubscribe, "gameInvitation", RoomId::GameInvitation))
            .unwrap();
        settle().await;

        let acks: Vec<(ResultKind, ResultStatus, Option<String>)> = drain(&events)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::SubscribeResult(r) => Some((ResultKind::Subscribe, r.status, r.kind)),
                ServerEvent::UnsubscribeResult(r) => Some((ResultKind::Unsubscribe, r.status, r.kind)),
                _ => None,
            })
            .collect();
        assert_eq!(
            acks,
            vec![
                (ResultKind::Subscribe, ResultStatus::Approved, Some("gameRoomList".to_string())),
                (ResultKind::Subscribe, ResultStatus::Approved, Some("gameInvitation".to_string())),
                (ResultKind::Subscribe, ResultStatus::Error, Some("chatRoom".to_string())),
                (ResultKind::Unsubscribe, ResultStatus::Approved, Some("gameInvitation".to_string())),
            ]
        );
        assert_eq!(presence.send(FetchMembers { room: RoomId::GameRoomList }).await.unwrap(), vec!["alice".to_string()]);
        assert!(presence.send(FetchMembers { room: RoomId::GameInvitation }).await.unwrap().is_empty());
        assert!(presence.send(FetchMembers { room: RoomId::ChatRoom(3) }).await.unwrap().is_empty());
    }

    #[actix::test]
    async fn room_list_subscription_sends_current_list_first() {
        let (presence, sessions) = start();
        let (rx, events) = collector();
        presence.send(Register { connection: Connection::new("bob", rx) }).await.unwrap().unwrap();
        let commands = CommandSerializer::start(presence, sessions);

        commands
            .submit(RoomCommand::new("bob", RoomAction::Subscribe, "gameRoomList", RoomId::GameRoomList))
            .unwrap();
        settle().await;

        let events = drain(&events);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ServerEvent::message(GameMessage::GameRoomList { list: vec![] }));
        assert!(matches!(&events[1], ServerEvent::SubscribeResult(r) if r.status == ResultStatus::Approved));
    }

    #[actix::test]
    async fn full_queue_refuses_submission() {
        let (presence, sessions) = start();
        let commands = CommandSerializer::with_capacity(1, presence, sessions);
        let command = RoomCommand::new("carol", RoomAction::Subscribe, "dmList", RoomId::DmList);

        // The worker has not been polled yet: the second command finds the channel full.
        commands.submit(command.clone()).unwrap();
        assert_eq!(commands.submit(command), Err(SubmitError::Full));
    }

    #[test]
    fn game_room_commands_echo_their_id() {
        let command = RoomCommand::new(
            "dave",
            RoomAction::Subscribe,
            "gameRoom",
            RoomId::game(crate::server::types::SessionId(12)),
        );
        assert_eq!(command.room_id, Some(12));
        assert_eq!(command.ack(ResultStatus::Approved).room_id, Some(12));
    }
}
