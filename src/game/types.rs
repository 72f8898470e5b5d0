use serde::{Serialize, Deserialize};

use crate::config::game::{
    BALL_RADIUS, BALL_START_X, BALL_START_Y, BLUE_PADDLE_X, PADDLE_HEIGHT, PADDLE_START_Y,
    PADDLE_WIDTH, RED_PADDLE_X,
};

/// Match mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rule {
    /// Rated match.
    Rank,
    /// Casual match.
    Normal,
    /// Casual match with a second ball.
    Arcade,
}

impl Rule {
    pub const ALL: [Rule; 3] = [Rule::Rank, Rule::Normal, Rule::Arcade];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Rank => "rank",
            Rule::Normal => "normal",
            Rule::Arcade => "arcade",
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Rule::Rank)
    }

    pub fn has_second_ball(&self) -> bool {
        matches!(self, Rule::Arcade)
    }
}

/// Side a participant plays on. Red defends the left goal, blue the right one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Red,
    Blue,
}

impl Role {
    pub fn opponent(&self) -> Role {
        match self {
            Role::Red => Role::Blue,
            Role::Blue => Role::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Red => "red",
            Role::Blue => "blue",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    pub radius: i32,
}

impl Ball {
    /// A ball at the centre spot with the given velocity.
    pub fn at_start(dx: i32, dy: i32) -> Self {
        Self {
            x: BALL_START_X,
            y: BALL_START_Y,
            dx,
            dy,
            radius: BALL_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paddle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Paddle {
    pub fn initial(role: Role) -> Self {
        let x = match role {
            Role::Red => RED_PADDLE_X,
            Role::Blue => BLUE_PADDLE_X,
        };
        Self {
            x,
            y: PADDLE_START_Y,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }

    /// True when `y` lies strictly inside the paddle's vertical span.
    pub fn covers(&self, y: i32) -> bool {
        self.y < y && y < self.y + self.height
    }
}

/// Which ball of the session a goal was scored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallSlot {
    Primary,
    Extra,
}

/// A goal produced by one physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goal {
    pub scorer: Role,
    pub ball: BallSlot,
}
