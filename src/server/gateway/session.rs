/// WebSocket session handler.
///
/// This actor manages a single user's connection: it claims the user's identity
/// in the presence registry on start, turns inbound frames into commands for
/// the engine, and serializes every `ServerEvent` pushed to it back to the client.
use actix::prelude::*;
use actix_web::{http::StatusCode, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{debug, error, info, warn};
use std::borrow::Cow;

use super::dispatch::{self, Caller};
use super::inbound::{parse_frame, FrameError};
use crate::server::error::EngineError;
use crate::server::events::ServerEvent;
use crate::server::matchmaking::messages::UserDisconnected;
use crate::server::presence::messages::{Register, Unregister};
use crate::server::presence::registry::Connection;
use crate::server::state::AppState;
use crate::server::types::{ConnectionId, UserId};
use crate::server::ws_error::{already_logged_in_event, error_result, http_error_response, invalid_message_event};

pub struct WsSession {
    pub user_id: UserId,
    /// Set once the presence registry accepted this connection.
    pub connection_id: Option<ConnectionId>,
    pub app: AppState,
}

impl WsSession {
    pub fn new(user_id: UserId, app: AppState) -> Self {
        Self { user_id, connection_id: None, app }
    }

    fn write(&self, event: &ServerEvent, ctx: &mut ws::WebsocketContext<Self>) {
        match serde_json::to_string(event) {
            Ok(text) => ctx.text(text),
            Err(e) => {
                // Serialization error: notify client and close connection.
                error!("[Gateway] Failed to serialize event for {}: {}", self.user_id, e);
                ctx.text(r#"{"event":"error","data":{"code":"INTERNAL","message":"Internal server error"}}"#);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Error,
                    description: Some("Internal server error".into()),
                }));
                ctx.stop();
            }
        }
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(connection_id) = self.connection_id else {
            return;
        };
        let command = match parse_frame(text) {
            Ok(command) => command,
            Err(FrameError::Invalid { kind, error }) => {
                debug!("[Gateway] {} sent an invalid {:?}: {}", self.user_id, kind, error);
                self.write(&error_result(kind, &error), ctx);
                return;
            }
            Err(FrameError::Unknown(reason)) => {
                debug!("[Gateway] {} sent an unusable frame: {}", self.user_id, reason);
                self.write(&invalid_message_event(&reason), ctx);
                return;
            }
        };

        let caller = Caller { user_id: self.user_id.clone(), connection_id };
        let fut = dispatch::execute(self.app.clone(), caller, command);
        ctx.spawn(fut.into_actor(self).map(|reply, act, ctx| {
            if let Some(event) = reply {
                act.write(&event, ctx);
            }
        }));
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    /// Called when the session starts. Claims the user's identity; no frame is
    /// processed until the registry answered.
    fn started(&mut self, ctx: &mut Self::Context) {
        let connection = Connection::new(self.user_id.clone(), ctx.address().recipient());
        let connection_id = connection.id;
        let register = self.app.presence.send(Register { connection });
        ctx.wait(register.into_actor(self).map(move |res, act, ctx| match res {
            Ok(Ok(())) => {
                act.connection_id = Some(connection_id);
                info!("[Gateway] {} connected", act.user_id);
            }
            Ok(Err(refused)) => {
                let err: EngineError = refused.into();
                warn!("[Gateway] Closing duplicate connection: {}", err);
                act.write(&already_logged_in_event(), ctx);
                ctx.close(Some(ws::CloseReason {
                    code: ws::CloseCode::Policy,
                    description: Some(err.public_detail()),
                }));
                ctx.stop();
            }
            Err(e) => {
                error!("[Gateway] Presence registry unreachable for {}: {}", act.user_id, e);
                ctx.stop();
            }
        }));
    }

    /// Called when the session stops. Releases the identity and every queue entry.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let Some(connection_id) = self.connection_id.take() else {
            return;
        };
        self.app.presence.do_send(Unregister { user_id: self.user_id.clone(), connection_id });
        self.app.matchmaking.do_send(UserDisconnected { user_id: self.user_id.clone() });
        info!("[Gateway] {} disconnected", self.user_id);
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    /// Handles incoming WebSocket messages from the client.
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => self.handle_text(&text, ctx),
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[Gateway] Protocol error from {}: {}", self.user_id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for WsSession {
    type Result = ();

    /// Handles events pushed by the engine to this connection.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        self.write(&msg, ctx);
    }
}

/// Decoded `username` query parameter, if present and non-empty.
fn username_from_query(query: &str) -> Option<UserId> {
    query.split('&').find_map(|kv| {
        let mut split = kv.splitn(2, '=');
        match (split.next(), split.next()) {
            (Some("username"), Some(name)) => {
                let name = urlencoding::decode(name)
                    .unwrap_or(Cow::Borrowed(""))
                    .trim()
                    .to_string();
                (!name.is_empty()).then_some(name)
            }
            _ => None,
        }
    })
}

/// WebSocket endpoint.
///
/// Expects the query parameter `username`, standing in for a verified identity.
pub async fn ws_connect(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let Some(username) = username_from_query(req.query_string()) else {
        return Ok(http_error_response("MISSING_USERNAME", "Missing username", StatusCode::BAD_REQUEST));
    };
    ws::start(WsSession::new(username, data.get_ref().clone()), &req, stream)
}
