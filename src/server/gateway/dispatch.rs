//! Routes parsed commands to the component that owns them and builds the
//! caller's immediate answer, if the command has one.

use actix::MailboxError;
use log::{debug, error, warn};

use super::inbound::{ClientCommand, RoomRequest};
use crate::server::command_queue::{RoomAction, RoomCommand};
use crate::server::error::EngineError;
use crate::server::events::{CommandResult, ResultKind, ResultStatus, ServerEvent};
use crate::server::game_session::messages::{ExitGameRoom, JoinGameRoom, MovePaddle};
use crate::server::matchmaking::messages::{AcceptGame, CancelSearch, DeclineGame, InviteGame, SearchGame};
use crate::server::state::AppState;
use crate::server::types::{ConnectionId, UserId};
use crate::server::ws_error::error_result;

/// The authenticated connection a command came from.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: UserId,
    pub connection_id: ConnectionId,
}

pub async fn execute(app: AppState, caller: Caller, command: ClientCommand) -> Option<ServerEvent> {
    let approved = CommandResult::new(ResultStatus::Approved);
    let user_id = caller.user_id.clone();

    if let Some((session_id, role, direction)) = command.paddle() {
        app.game_sessions.do_send(MovePaddle { session_id, user_id, role, direction });
        return None;
    }

    match command {
        ClientCommand::SearchGame { rule } => {
            let res = app
                .matchmaking
                .send(SearchGame { user_id, connection_id: caller.connection_id, rule })
                .await;
            answer(ResultKind::SearchGame, res, None)
        }
        ClientCommand::CancelSearch { rule } => {
            let res = app.matchmaking.send(CancelSearch { user_id, rule }).await;
            answer(ResultKind::CancelSearch, res, Some(approved))
        }
        ClientCommand::InviteGame { username, rule } => {
            let res = app.matchmaking.send(InviteGame { from: user_id, to: username, rule }).await;
            answer(ResultKind::InviteGame, res, None)
        }
        ClientCommand::AcceptGame { username } => {
            let res = app.matchmaking.send(AcceptGame { from: username, responder: user_id }).await;
            answer(ResultKind::AcceptGame, res, None)
        }
        ClientCommand::DeclineGame { username } => {
            let ok = approved.username(username.clone());
            let res = app.matchmaking.send(DeclineGame { from: username, responder: user_id }).await;
            answer(ResultKind::DeclineGame, res, Some(ok))
        }
        ClientCommand::JoinGameRoom { room_id } => {
            let res = app.game_sessions.send(JoinGameRoom { session_id: room_id, user_id }).await;
            answer(ResultKind::JoinGameRoom, res, Some(approved.room(room_id.0)))
        }
        ClientCommand::ExitGameRoom { room_id } => {
            let res = app.game_sessions.send(ExitGameRoom { session_id: room_id, user_id }).await;
            answer(ResultKind::ExitGameRoom, res, Some(approved.room(room_id.0)))
        }
        ClientCommand::Subscribe(request) => submit(&app, &caller, RoomAction::Subscribe, request),
        ClientCommand::Unsubscribe(request) => submit(&app, &caller, RoomAction::Unsubscribe, request),
        ClientCommand::Up { .. } | ClientCommand::Down { .. } | ClientCommand::Ping => None,
    }
}

/// Turn a component's reply into the caller's answer.
fn answer(
    kind: ResultKind,
    res: Result<Result<(), EngineError>, MailboxError>,
    ok: Option<CommandResult>,
) -> Option<ServerEvent> {
    match res.map_err(EngineError::from).and_then(|r| r) {
        Ok(()) => ok.map(|result| kind.event(result)),
        Err(e) if e.is_stale() => {
            debug!("[Gateway] {:?} ignored: {}", kind, e);
            None
        }
        Err(e) => {
            if matches!(e, EngineError::Infrastructure { .. }) {
                error!("[Gateway] {:?} failed: {}", kind, e);
            } else {
                debug!("[Gateway] {:?} refused: {}", kind, e);
            }
            Some(error_result(kind, &e))
        }
    }
}

/// Queue a room command. Requests that do not resolve to a room still go
/// through the queue, flagged as failed, so acknowledgements keep their order.
fn submit(app: &AppState, caller: &Caller, action: RoomAction, request: RoomRequest) -> Option<ServerEvent> {
    let command = match request.resolve(&caller.user_id) {
        Ok(room) => RoomCommand::new(caller.user_id.clone(), action, request.kind.clone(), room),
        Err(e) => {
            debug!("[Gateway] {:?} from {} rejected: {}", action, caller.user_id, e);
            RoomCommand::rejected(caller.user_id.clone(), action, request.kind.clone(), request.room_id)
        }
    };
    let kind = match action {
        RoomAction::Subscribe => ResultKind::Subscribe,
        RoomAction::Unsubscribe => ResultKind::Unsubscribe,
    };
    match app.commands.submit(command) {
        Ok(()) => None,
        Err(e) => {
            warn!("[Gateway] Could not queue {:?} from {}: {}", action, caller.user_id, e);
            Some(kind.event(CommandResult::new(ResultStatus::Error).kind(request.kind).detail(e.to_string())))
        }
    }
}
