/// Game session actor.
///
/// Owns the physics state of one match and runs it at a fixed tick. Ticks of
/// one session never overlap: actix runs interval callbacks sequentially on the
/// owning actor.

use actix::prelude::*;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, SystemTime};

use super::messages::{AddSpectator, Leave, Move, SessionFinished};
use crate::config::game::{TICK_INTERVAL_MS, WIN_SCORE};
use crate::config::matchmaking::RANK_RATING_DELTA;
use crate::game::state::PongState;
use crate::game::types::{Role, Rule};
use crate::server::events::{GameMessage, GameStatus, ServerEvent, SpectatorEntry};
use crate::server::presence::PresenceServer;
use crate::server::presence::messages::{EmitToRoom, JoinRoom, LeaveRoom, SendToUser};
use crate::server::types::{RoomId, SessionId, UserId};
use crate::store::{Badge, MatchResult, SharedStore, StoreResult, UserStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    Playing,
    Finished,
}

pub struct GameSession {
    id: SessionId,
    red: UserId,
    blue: UserId,
    /// In join order.
    spectators: Vec<UserId>,
    state: PongState,
    phase: Phase,
    rng: StdRng,
    tick_handle: Option<SpawnHandle>,
    on_finished: Recipient<SessionFinished>,
    presence: Addr<PresenceServer>,
    store: SharedStore,
}

impl GameSession {
    pub fn new(
        id: SessionId,
        rule: Rule,
        red: UserId,
        blue: UserId,
        on_finished: Recipient<SessionFinished>,
        presence: Addr<PresenceServer>,
        store: SharedStore,
    ) -> Self {
        let mut rng = StdRng::from_os_rng();
        let state = PongState::new(rule, &mut rng);
        Self {
            id,
            red,
            blue,
            spectators: Vec::new(),
            state,
            phase: Phase::Created,
            rng,
            tick_handle: None,
            on_finished,
            presence,
            store,
        }
    }

    /// Replace the physics state before the session starts.
    #[cfg(test)]
    pub fn with_state(mut self, state: PongState) -> Self {
        self.state = state;
        self
    }

    fn room(&self) -> RoomId {
        RoomId::game(self.id)
    }

    fn holder(&self, role: Role) -> &UserId {
        match role {
            Role::Red => &self.red,
            Role::Blue => &self.blue,
        }
    }

    fn role_of(&self, user_id: &str) -> Option<Role> {
        if self.red == user_id {
            Some(Role::Red)
        } else if self.blue == user_id {
            Some(Role::Blue)
        } else {
            None
        }
    }

    fn emit(&self, event: ServerEvent) {
        self.presence.do_send(EmitToRoom { room: self.room(), event });
    }

    fn send_to(&self, user_id: &UserId, event: ServerEvent) {
        self.presence.do_send(SendToUser { user_id: user_id.clone(), event });
    }

    fn emit_state(&self) {
        let status = GameStatus {
            room_id: self.id,
            playing: self.phase == Phase::Playing && self.state.winner().is_none(),
            red_user: self.red.clone(),
            blue_user: self.blue.clone(),
            state: self.state.clone(),
        };
        self.emit(ServerEvent::message(GameMessage::Game { status }));
    }

    fn emit_spectators(&self) {
        let list = self
            .spectators
            .iter()
            .map(|username| SpectatorEntry { username: username.clone() })
            .collect();
        self.emit(ServerEvent::message(GameMessage::Spectator { list }));
    }

    fn tick(&mut self, ctx: &mut Context<Self>) {
        if self.phase != Phase::Playing {
            return;
        }
        for goal in self.state.step(&mut self.rng) {
            debug!(
                "[GameSession] Room {}: {} scored ({:?} ball), {}-{}",
                self.id,
                goal.scorer.as_str(),
                goal.ball,
                self.state.red_score,
                self.state.blue_score
            );
        }
        self.emit_state();
        if self.state.winner().is_some() {
            self.finish(ctx);
        }
    }

    /// End the session. Safe to call more than once.
    fn finish(&mut self, ctx: &mut Context<Self>) {
        if self.phase == Phase::Finished {
            return;
        }
        self.phase = Phase::Finished;
        if let Some(handle) = self.tick_handle.take() {
            ctx.cancel_future(handle);
        }

        let winner = if self.state.red_score >= WIN_SCORE { Role::Red } else { Role::Blue };
        let room_id = self.id;
        self.send_to(self.holder(winner), ServerEvent::message(GameMessage::Win { room_id }));
        self.send_to(self.holder(winner.opponent()), ServerEvent::message(GameMessage::Lose { room_id }));
        for spectator in &self.spectators {
            self.send_to(spectator, ServerEvent::message(GameMessage::Finish { room_id, winner }));
        }

        let result = MatchResult {
            session_id: self.id,
            rule: self.state.rule,
            red: self.red.clone(),
            blue: self.blue.clone(),
            red_score: self.state.red_score,
            blue_score: self.state.blue_score,
            winner,
            finished_at: SystemTime::now(),
        };
        if let Err(e) = self.store.save_result(&result) {
            warn!("[GameSession] Could not save result of room {}: {}", self.id, e);
        }
        if let Err(e) = self.record_aggregates(&result) {
            warn!("[GameSession] Could not update player records for room {}: {}", self.id, e);
        }

        info!(
            "[GameSession] Room {} finished {}-{}, winner {} ({})",
            self.id,
            result.red_score,
            result.blue_score,
            result.winner_id(),
            winner.as_str()
        );
        self.on_finished.do_send(SessionFinished { session_id: self.id });
        ctx.stop();
    }

    fn record_aggregates(&self, result: &MatchResult) -> StoreResult<()> {
        let winner = result.winner_id();
        let loser = result.loser_id();
        let wins = self.store.record_win(winner)?;
        self.store.record_loss(loser)?;
        if result.rule.is_ranked() {
            self.store.adjust_rating(winner, RANK_RATING_DELTA)?;
            self.store.adjust_rating(loser, -RANK_RATING_DELTA)?;
        }
        if let Some(badge) = Badge::for_wins(wins) {
            self.store.award_badge(winner, badge)?;
        }
        Ok(())
    }
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.phase = Phase::Playing;
        let handle = ctx.run_interval(Duration::from_millis(TICK_INTERVAL_MS), |act, ctx| {
            act.tick(ctx);
        });
        self.tick_handle = Some(handle);
        info!("[GameSession] Room {} started: {} (red) vs {} (blue)", self.id, self.red, self.blue);
    }
}

impl Handler<Move> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Move, _ctx: &mut Self::Context) -> Self::Result {
        if self.phase != Phase::Playing {
            return;
        }
        if self.holder(msg.role) != &msg.user_id {
            debug!("[GameSession] {} may not move the {} paddle in room {}", msg.user_id, msg.role.as_str(), self.id);
            return;
        }
        self.state.move_paddle(msg.role, msg.direction);
    }
}

impl Handler<AddSpectator> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: AddSpectator, _ctx: &mut Self::Context) -> Self::Result {
        if self.phase == Phase::Finished || self.role_of(&msg.user_id).is_some() {
            return;
        }
        if !self.spectators.contains(&msg.user_id) {
            self.spectators.push(msg.user_id.clone());
        }
        self.presence.do_send(JoinRoom { user_id: msg.user_id, room: self.room() });
        self.emit_spectators();
    }
}

impl Handler<Leave> for GameSession {
    type Result = ();

    fn handle(&mut self, msg: Leave, ctx: &mut Self::Context) -> Self::Result {
        if self.phase == Phase::Finished {
            return;
        }
        match self.role_of(&msg.user_id) {
            Some(role) => {
                if let Err(e) = self.store.update_status(&msg.user_id, UserStatus::Online) {
                    warn!("[GameSession] Could not mark {} online: {}", msg.user_id, e);
                }
                info!("[GameSession] {} left room {}, {} wins by forfeit", msg.user_id, self.id, role.opponent().as_str());
                self.state.force_win(role.opponent());
                self.finish(ctx);
            }
            None => {
                let before = self.spectators.len();
                self.spectators.retain(|s| s != &msg.user_id);
                if self.spectators.len() == before {
                    return;
                }
                self.presence.do_send(LeaveRoom { user_id: msg.user_id, room: self.room() });
                self.emit_spectators();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::game::types::{Ball, Direction};
    use crate::server::presence::messages::Register;
    use crate::server::presence::registry::Connection;
    use crate::server::test_support::{Events, collector, drain, settle, sleep_ms};
    use crate::store::{MemoryStore, UserStore};

    /// Counts `SessionFinished` notifications.
    struct FinishProbe {
        seen: Arc<Mutex<Vec<SessionId>>>,
    }

    impl Actor for FinishProbe {
        type Context = Context<Self>;
    }

    impl Handler<SessionFinished> for FinishProbe {
        type Result = ();

        fn handle(&mut self, msg: SessionFinished, _ctx: &mut Self::Context) -> Self::Result {
            self.seen.lock().unwrap().push(msg.session_id);
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        presence: Addr<PresenceServer>,
        finished: Arc<Mutex<Vec<SessionId>>>,
        probe: Recipient<SessionFinished>,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::with_users(["alice", "bob", "carol"]));
            let presence = PresenceServer::new(store.clone()).start();
            let finished = Arc::new(Mutex::new(Vec::new()));
            let probe = FinishProbe { seen: finished.clone() }.start().recipient();
            Self { store, presence, finished, probe }
        }

        async fn connect(&self, user: &str) -> Events {
            let (rx, events) = collector();
            self.presence.send(Register { connection: Connection::new(user, rx) }).await.unwrap().unwrap();
            self.presence.send(JoinRoom { user_id: user.into(), room: RoomId::game(SessionId(1)) }).await.unwrap();
            events
        }

        fn session(&self, rule: Rule) -> GameSession {
            GameSession::new(
                SessionId(1),
                rule,
                "alice".into(),
                "bob".into(),
                self.probe.clone(),
                self.presence.clone(),
                self.store.clone(),
            )
        }
    }

    fn messages(events: &Events) -> Vec<GameMessage> {
        drain(events)
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::Message(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    /// Red one goal from winning, ball about to cross the blue line away from the paddle.
    fn red_about_to_win(rule: Rule) -> PongState {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = PongState::new(rule, &mut rng);
        state.red_score = WIN_SCORE - 1;
        state.ball = Ball { x: 520, y: 30, dx: 8, dy: 0, radius: 10 };
        state.extra_ball = None;
        state
    }

    #[actix::test]
    async fn red_reaching_five_wins_and_notifies_everyone() {
        let fx = Fixture::new();
        let alice = fx.connect("alice").await;
        let bob = fx.connect("bob").await;
        let (rx, carol) = collector();
        fx.presence.send(Register { connection: Connection::new("carol", rx) }).await.unwrap().unwrap();

        let addr = fx.session(Rule::Rank).with_state(red_about_to_win(Rule::Rank)).start();
        addr.send(AddSpectator { user_id: "carol".into() }).await.unwrap();
        sleep_ms(120).await;

        let alice_msgs = messages(&alice);
        let bob_msgs = messages(&bob);
        assert!(alice_msgs.contains(&GameMessage::Win { room_id: SessionId(1) }));
        assert!(!alice_msgs.contains(&GameMessage::Lose { room_id: SessionId(1) }));
        assert!(bob_msgs.contains(&GameMessage::Lose { room_id: SessionId(1) }));
        assert!(!bob_msgs.contains(&GameMessage::Win { room_id: SessionId(1) }));
        assert!(messages(&carol).contains(&GameMessage::Finish { room_id: SessionId(1), winner: Role::Red }));

        let history = fx.store.history();
        assert_eq!(history.len(), 1);
        assert_eq!((history[0].red_score, history[0].winner), (WIN_SCORE, Role::Red));
        assert_eq!(*fx.finished.lock().unwrap(), vec![SessionId(1)]);
    }

    #[actix::test]
    async fn ranked_result_moves_rating_and_counts() {
        let fx = Fixture::new();
        fx.connect("alice").await;
        fx.connect("bob").await;

        fx.session(Rule::Rank).with_state(red_about_to_win(Rule::Rank)).start();
        sleep_ms(120).await;

        let alice = fx.store.user("alice").unwrap();
        let bob = fx.store.user("bob").unwrap();
        assert_eq!((alice.wins, alice.rating), (1, 1020));
        assert_eq!((bob.losses, bob.rating), (1, 980));
    }

    #[actix::test]
    async fn casual_result_leaves_rating_alone_and_awards_badges() {
        let fx = Fixture::new();
        fx.connect("alice").await;
        fx.connect("bob").await;
        fx.store.record_win("alice").unwrap();
        fx.store.record_win("alice").unwrap();

        fx.session(Rule::Normal).with_state(red_about_to_win(Rule::Normal)).start();
        sleep_ms(120).await;

        let alice = fx.store.user("alice").unwrap();
        assert_eq!((alice.wins, alice.rating), (3, 1000));
        assert!(alice.badges.contains(&Badge::Win3));
    }

    #[actix::test]
    async fn participant_leaving_forfeits_once() {
        let fx = Fixture::new();
        let alice = fx.connect("alice").await;
        fx.connect("bob").await;

        let addr = fx.session(Rule::Normal).start();
        addr.do_send(Leave { user_id: "bob".into() });
        addr.do_send(Leave { user_id: "alice".into() });
        settle().await;

        assert!(messages(&alice).contains(&GameMessage::Win { room_id: SessionId(1) }));
        assert_eq!(fx.finished.lock().unwrap().len(), 1);
        let history = fx.store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].winner, Role::Red);
        assert_eq!(fx.store.user("bob").map(|u| u.status), Some(UserStatus::Online));
    }

    #[actix::test]
    async fn spectators_are_listed_in_join_order() {
        let fx = Fixture::new();
        let alice = fx.connect("alice").await;
        fx.connect("bob").await;
        for user in ["carol", "dave"] {
            let (rx, _) = collector();
            fx.presence.send(Register { connection: Connection::new(user, rx) }).await.unwrap().unwrap();
        }

        let addr = fx.session(Rule::Normal).start();
        addr.send(AddSpectator { user_id: "carol".into() }).await.unwrap();
        addr.send(AddSpectator { user_id: "dave".into() }).await.unwrap();
        addr.send(AddSpectator { user_id: "alice".into() }).await.unwrap();
        addr.send(Leave { user_id: "carol".into() }).await.unwrap();
        settle().await;

        let lists: Vec<Vec<UserId>> = messages(&alice)
            .into_iter()
            .filter_map(|m| match m {
                GameMessage::Spectator { list } => Some(list.into_iter().map(|e| e.username).collect()),
                _ => None,
            })
            .collect();
        assert_eq!(
            lists,
            vec![
                vec!["carol".to_string()],
                vec!["carol".to_string(), "dave".to_string()],
                vec!["dave".to_string()],
            ]
        );
    }

    #[actix::test]
    async fn paddle_moves_only_for_the_role_holder() {
        let fx = Fixture::new();
        let alice = fx.connect("alice").await;
        fx.connect("bob").await;

        let addr = fx.session(Rule::Normal).start();
        addr.send(Move { user_id: "bob".into(), role: Role::Red, direction: Direction::Up }).await.unwrap();
        addr.send(Move { user_id: "alice".into(), role: Role::Red, direction: Direction::Up }).await.unwrap();
        sleep_ms(80).await;

        let last = messages(&alice)
            .into_iter()
            .filter_map(|m| match m {
                GameMessage::Game { status } => Some(status),
                _ => None,
            })
            .last()
            .expect("at least one tick");
        assert_eq!(last.state.red_paddle.y, 130);
        assert_eq!(last.state.blue_paddle.y, 140);
    }
}
