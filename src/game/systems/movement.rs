//! Paddle movement system.
//!
//! This module handles moving a paddle along the track.

use crate::config::game::{PADDLE_STEP, TRACK_HEIGHT};
use crate::game::types::{Direction, Paddle};

/// Move the paddle one step in the given direction, clamped to the track.
/// Returns true if the paddle actually moved.
pub fn move_paddle(paddle: &mut Paddle, direction: Direction) -> bool {
    let max_y = TRACK_HEIGHT - paddle.height;
    let target = match direction {
        Direction::Up => paddle.y - PADDLE_STEP,
        Direction::Down => paddle.y + PADDLE_STEP,
    }
    .clamp(0, max_y);

    let moved = target != paddle.y;
    paddle.y = target;
    moved
}
