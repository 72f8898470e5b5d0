use serde::{Serialize, Deserialize};
use rand::Rng;

use crate::config::game::WIN_SCORE;
use crate::game::entities::{serve_ball, serve_ball_towards};
use crate::game::systems::{advance_ball, move_paddle};
use crate::game::types::{Ball, BallSlot, Direction, Goal, Paddle, Role, Rule};

/// Authoritative physics state of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PongState {
    pub rule: Rule,
    pub ball: Ball,
    /// Second ball, only present for the arcade rule.
    pub extra_ball: Option<Ball>,
    pub red_paddle: Paddle,
    pub blue_paddle: Paddle,
    pub red_score: u32,
    pub blue_score: u32,
    pub tick: u64,
}

impl PongState {
    /// Fresh rally: paddles centred, ball (or balls) served from the middle.
    pub fn new<R: Rng + ?Sized>(rule: Rule, rng: &mut R) -> Self {
        let ball = serve_ball(rng);
        // The second ball leaves towards the other goal.
        let extra_ball = rule
            .has_second_ball()
            .then(|| serve_ball_towards(rng, -ball.dx.signum()));

        PongState {
            rule,
            ball,
            extra_ball,
            red_paddle: Paddle::initial(Role::Red),
            blue_paddle: Paddle::initial(Role::Blue),
            red_score: 0,
            blue_score: 0,
            tick: 0,
        }
    }

    /// Advance every ball by one tick. Returns the goals that counted.
    ///
    /// Once a side has reached the winning score, further goals in the same
    /// tick are ignored so the final score never exceeds it.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Goal> {
        let mut goals = Vec::new();

        if let Some(scorer) = advance_ball(&mut self.ball, &self.red_paddle, &self.blue_paddle) {
            if self.award(scorer) {
                self.ball = serve_ball(rng);
                self.reset_paddles();
                goals.push(Goal { scorer, ball: BallSlot::Primary });
            }
        }

        let extra_scorer = match self.extra_ball.as_mut() {
            Some(ball) => advance_ball(ball, &self.red_paddle, &self.blue_paddle),
            None => None,
        };
        if let Some(scorer) = extra_scorer {
            if self.award(scorer) {
                self.extra_ball = Some(serve_ball(rng));
                self.reset_paddles();
                goals.push(Goal { scorer, ball: BallSlot::Extra });
            }
        }

        self.tick += 1;
        goals
    }

    /// Move one side's paddle. Returns true if it moved.
    pub fn move_paddle(&mut self, role: Role, direction: Direction) -> bool {
        let paddle = match role {
            Role::Red => &mut self.red_paddle,
            Role::Blue => &mut self.blue_paddle,
        };
        move_paddle(paddle, direction)
    }

    /// Give `role` the winning score, used when the opponent walks out.
    pub fn force_win(&mut self, role: Role) {
        match role {
            Role::Red => self.red_score = WIN_SCORE,
            Role::Blue => self.blue_score = WIN_SCORE,
        }
    }

    /// Winner once either side has reached the winning score. Red is checked first.
    pub fn winner(&self) -> Option<Role> {
        if self.red_score >= WIN_SCORE {
            Some(Role::Red)
        } else if self.blue_score >= WIN_SCORE {
            Some(Role::Blue)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn score(&self, role: Role) -> u32 {
        match role {
            Role::Red => self.red_score,
            Role::Blue => self.blue_score,
        }
    }

    fn award(&mut self, scorer: Role) -> bool {
        if self.winner().is_some() {
            return false;
        }
        match scorer {
            Role::Red => self.red_score += 1,
            Role::Blue => self.blue_score += 1,
        }
        true
    }

    fn reset_paddles(&mut self) {
        self.red_paddle = Paddle::initial(Role::Red);
        self.blue_paddle = Paddle::initial(Role::Blue);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::game::{BALL_START_X, BALL_START_Y, PADDLE_START_Y};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn only_arcade_has_a_second_ball() {
        let mut rng = rng();
        assert!(PongState::new(Rule::Rank, &mut rng).extra_ball.is_none());
        assert!(PongState::new(Rule::Normal, &mut rng).extra_ball.is_none());
        let arcade = PongState::new(Rule::Arcade, &mut rng);
        let extra = arcade.extra_ball.expect("arcade serves two balls");
        assert_eq!(extra.dx.signum(), -arcade.ball.dx.signum());
    }

    #[test]
    fn goal_on_extra_ball_leaves_primary_ball_alone() {
        let mut rng = rng();
        let mut state = PongState::new(Rule::Arcade, &mut rng);
        state.ball = Ball { x: 100, y: 100, dx: 7, dy: 3, radius: 10 };
        // Extra ball about to cross the blue goal line far from the blue paddle.
        state.extra_ball = Some(Ball { x: 520, y: 30, dx: 8, dy: 0, radius: 10 });

        let goals = state.step(&mut rng);

        assert_eq!(goals, vec![Goal { scorer: Role::Red, ball: BallSlot::Extra }]);
        assert_eq!(state.red_score, 1);
        assert_eq!((state.ball.x, state.ball.y, state.ball.dx, state.ball.dy), (107, 103, 7, 3));
        let extra = state.extra_ball.expect("extra ball is served again");
        assert_eq!((extra.x, extra.y), (BALL_START_X, BALL_START_Y));
    }

    #[test]
    fn goal_on_primary_ball_leaves_extra_ball_alone() {
        let mut rng = rng();
        let mut state = PongState::new(Rule::Arcade, &mut rng);
        state.ball = Ball { x: 20, y: 30, dx: -8, dy: 0, radius: 10 };
        state.extra_ball = Some(Ball { x: 300, y: 200, dx: -7, dy: 4, radius: 10 });
        state.red_paddle.y = 200;

        let goals = state.step(&mut rng);

        assert_eq!(goals, vec![Goal { scorer: Role::Blue, ball: BallSlot::Primary }]);
        assert_eq!(state.blue_score, 1);
        assert_eq!((state.ball.x, state.ball.y), (BALL_START_X, BALL_START_Y));
        assert_eq!(state.red_paddle.y, PADDLE_START_Y);
        let extra = state.extra_ball.expect("extra ball stays in play");
        assert_eq!((extra.x, extra.y, extra.dx, extra.dy), (293, 204, -7, 4));
    }

    #[test]
    fn score_never_exceeds_winning_score_within_a_tick() {
        let mut rng = rng();
        let mut state = PongState::new(Rule::Arcade, &mut rng);
        state.red_score = WIN_SCORE - 1;
        state.ball = Ball { x: 520, y: 30, dx: 8, dy: 0, radius: 10 };
        state.extra_ball = Some(Ball { x: 520, y: 330, dx: 8, dy: 0, radius: 10 });

        let goals = state.step(&mut rng);

        assert_eq!(goals.len(), 1);
        assert_eq!(state.red_score, WIN_SCORE);
        assert_eq!(state.winner(), Some(Role::Red));
    }

    #[test]
    fn force_win_decides_the_winner() {
        let mut rng = rng();
        let mut state = PongState::new(Rule::Normal, &mut rng);
        assert_eq!(state.winner(), None);
        state.force_win(Role::Blue);
        assert_eq!(state.winner(), Some(Role::Blue));
        assert_eq!(state.score(Role::Blue), WIN_SCORE);
    }

    #[test]
    fn paddles_move_independently() {
        let mut rng = rng();
        let mut state = PongState::new(Rule::Normal, &mut rng);
        assert!(state.move_paddle(Role::Red, Direction::Up));
        assert_eq!(state.red_paddle.y, PADDLE_START_Y - 10);
        assert_eq!(state.blue_paddle.y, PADDLE_START_Y);
    }
}
