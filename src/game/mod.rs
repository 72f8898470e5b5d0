//! Paddle-and-ball simulation, free of any actor or network concern.

pub mod types;
pub mod state;

pub mod entities;
pub mod systems;
