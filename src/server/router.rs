//! HTTP and WebSocket routing configuration.
//!
//! A single WebSocket endpoint carries every command and event.

use actix_web::web;
use crate::server::gateway::ws_connect;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/ws")
            .to(ws_connect)
    );
}
