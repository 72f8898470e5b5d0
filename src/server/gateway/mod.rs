//! Websocket gateway: one actor per connection, inbound frame parsing and
//! command routing.

pub mod inbound;
pub mod dispatch;
pub mod session;

pub use session::ws_connect;
