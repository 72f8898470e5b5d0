pub mod movement;
pub mod collision;

pub use movement::*;
pub use collision::*;
