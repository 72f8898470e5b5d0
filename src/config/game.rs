/// Game configuration constants.
/// 
/// This module defines the session tick rate, the winning score and the
/// field geometry shared by every paddle-and-ball session.
pub const TICK_INTERVAL_MS: u64 = 30; // Duration of one physics tick in milliseconds.

/// Score a side must reach to win the session.
pub const WIN_SCORE: u32 = 5;

/// Height of the playable track; paddles move inside [0, TRACK_HEIGHT - PADDLE_HEIGHT].
pub const TRACK_HEIGHT: i32 = 360;

/// Radius of a ball, also used as the top and left bound of the field.
pub const BALL_RADIUS: i32 = 10;

/// Lowest y a ball may reach before bouncing back.
pub const FIELD_BOTTOM: i32 = 350;

/// x coordinate of the blue goal line.
pub const FIELD_RIGHT: i32 = 530;

/// Initial ball position.
pub const BALL_START_X: i32 = 270;
pub const BALL_START_Y: i32 = 180;

pub const PADDLE_WIDTH: i32 = 10;
pub const PADDLE_HEIGHT: i32 = 80;
pub const PADDLE_START_Y: i32 = 140;
pub const RED_PADDLE_X: i32 = 0;
pub const BLUE_PADDLE_X: i32 = 530;

/// Distance a paddle travels per `up`/`down` command.
pub const PADDLE_STEP: i32 = 10;

/// Bounds (inclusive) of the horizontal speed of a freshly served ball.
pub const MIN_SPEED_X: i32 = 7;
pub const MAX_SPEED_X: i32 = 12;

/// Bounds (inclusive) of the vertical speed of a freshly served ball.
pub const MIN_SPEED_Y: i32 = 3;
pub const MAX_SPEED_Y: i32 = 6;
