//! Ball collision system.
//!
//! Advances a ball by one tick and resolves wall bounces, paddle bounces and goals.

use crate::config::game::{FIELD_BOTTOM, FIELD_RIGHT};
use crate::game::types::{Ball, Paddle, Role};

/// Advance the ball by its velocity, then look one step ahead:
/// the top/bottom walls invert `dy`, a goal line either bounces off the
/// defending paddle or yields the scoring side.
pub fn advance_ball(ball: &mut Ball, red: &Paddle, blue: &Paddle) -> Option<Role> {
    ball.x += ball.dx;
    ball.y += ball.dy;

    let next_y = ball.y + ball.dy;
    if next_y < ball.radius || next_y > FIELD_BOTTOM {
        ball.dy = -ball.dy;
    }

    let next_x = ball.x + ball.dx;
    if next_x < ball.radius {
        if red.covers(ball.y) {
            ball.dx = -ball.dx;
        } else {
            return Some(Role::Blue);
        }
    } else if next_x > FIELD_RIGHT {
        if blue.covers(ball.y) {
            ball.dx = -ball.dx;
        } else {
            return Some(Role::Red);
        }
    }
    None
}
