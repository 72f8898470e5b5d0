/// Presence module: one live connection per user and the logical room table.

pub mod server;
pub mod registry;
pub mod rooms;
pub mod messages;

pub use server::PresenceServer;
