//! Ball entity logic.
//!
//! This module handles serving a ball from the centre spot with a random velocity.

use rand::Rng;

use crate::config::game::{MAX_SPEED_X, MAX_SPEED_Y, MIN_SPEED_X, MIN_SPEED_Y};
use crate::game::types::Ball;

/// Serve a ball from the centre with a random direction on both axes.
pub fn serve_ball<R: Rng + ?Sized>(rng: &mut R) -> Ball {
    let toward = if rng.random_bool(0.5) { 1 } else { -1 };
    serve_ball_towards(rng, toward)
}

/// Serve a ball whose horizontal direction has the sign of `toward`.
/// The vertical direction stays random.
pub fn serve_ball_towards<R: Rng + ?Sized>(rng: &mut R, toward: i32) -> Ball {
    let dx = rng.random_range(MIN_SPEED_X..=MAX_SPEED_X);
    let dy = rng.random_range(MIN_SPEED_Y..=MAX_SPEED_Y);
    let dx = if toward < 0 { -dx } else { dx };
    let dy = if rng.random_bool(0.5) { dy } else { -dy };
    Ball::at_start(dx, dy)
}
