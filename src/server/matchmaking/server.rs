/// Matchmaking server actor.
///
/// Owns the three rule queues and the outstanding invitations. A periodic
/// matcher pairs queued users; each invitation runs its own countdown. Matched
/// pairs are handed to the game session manager.

use actix::prelude::*;
use std::collections::HashSet;
use std::time::Duration;
use log::{debug, info, warn};

use super::guards::{self, TargetFacts, UserFacts};
use super::invitations::InvitationBook;
use super::messages::{AcceptGame, CancelSearch, DeclineGame, InviteGame, SearchGame, UserDisconnected};
use super::queues::MatchQueues;
use super::types::{Invitation, InvitationStatus, QueueEntry};
use crate::config::matchmaking::{INVITATION_TICK_SECS, INVITATION_TIMEOUT_TICKS, MATCH_INTERVAL_SECS};
use crate::game::types::Rule;
use crate::server::error::EngineError;
use crate::server::events::{CommandResult, GameMessage, ResultKind, ResultStatus, ServerEvent};
use crate::server::game_session::GameSessionManager;
use crate::server::game_session::messages::CreateSession;
use crate::server::presence::PresenceServer;
use crate::server::presence::messages::{LookupConnection, NotifyIfMember, SendToUser};
use crate::server::types::{RoomId, SessionId, UserId};
use crate::store::SharedStore;

/// Cadence of the matcher and of invitation countdowns.
#[derive(Debug, Clone, Copy)]
pub struct MatchTiming {
    pub match_interval: Duration,
    pub invitation_tick: Duration,
    pub invitation_timeout_ticks: u32,
}

impl Default for MatchTiming {
    fn default() -> Self {
        Self {
            match_interval: Duration::from_secs(MATCH_INTERVAL_SECS),
            invitation_tick: Duration::from_secs(INVITATION_TICK_SECS),
            invitation_timeout_ticks: INVITATION_TIMEOUT_TICKS,
        }
    }
}

pub struct MatchmakingServer {
    queues: MatchQueues,
    invitations: InvitationBook,
    /// Users whose session is being created right now.
    in_flight: HashSet<UserId>,
    timing: MatchTiming,
    game_sessions: Addr<GameSessionManager>,
    presence: Addr<PresenceServer>,
    store: SharedStore,
}

impl MatchmakingServer {
    pub fn new(game_sessions: Addr<GameSessionManager>, presence: Addr<PresenceServer>, store: SharedStore) -> Self {
        Self {
            queues: MatchQueues::new(),
            invitations: InvitationBook::new(),
            in_flight: HashSet::new(),
            timing: MatchTiming::default(),
            game_sessions,
            presence,
            store,
        }
    }

    pub fn with_timing(mut self, timing: MatchTiming) -> Self {
        self.timing = timing;
        self
    }

    fn send_to(&self, user_id: &str, event: ServerEvent) {
        self.presence.do_send(SendToUser { user_id: user_id.to_string(), event });
    }

    fn in_game(&self, user_id: &str) -> Result<bool, EngineError> {
        Ok(self.in_flight.contains(user_id) || self.store.is_gaming(user_id)?)
    }

    /// Both players must still be free when their session is about to open.
    fn ensure_free(&self, users: [&str; 2]) -> Result<(), EngineError> {
        for user in users {
            if self.in_game(user)? {
                return Err(EngineError::warning(format!("{} is already in a game.", user)));
            }
        }
        Ok(())
    }

    /// Pair the two oldest users of every queue holding at least two.
    fn run_matcher(&mut self, ctx: &mut Context<Self>) {
        let mut matched = false;
        for rule in Rule::ALL {
            while let Some((red, blue)) = self.queues.pop_pair(rule) {
                matched = true;
                self.start_matched_session(rule, red, blue, ctx);
            }
        }
        if matched {
            return;
        }
        for entry in self.queues.entries() {
            self.send_to(
                &entry.user_id,
                ResultKind::SearchGame.event(CommandResult::new(ResultStatus::Searching)),
            );
        }
    }

    fn start_matched_session(&mut self, rule: Rule, red: QueueEntry, blue: QueueEntry, ctx: &mut Context<Self>) {
        info!("[Matchmaking] Matched {} vs {} ({})", red.user_id, blue.user_id, rule.as_str());
        let (red, blue) = (red.user_id, blue.user_id);
        self.in_flight.insert(red.clone());
        self.in_flight.insert(blue.clone());

        let create = self.game_sessions.send(CreateSession { rule, red: red.clone(), blue: blue.clone() });
        ctx.spawn(create.into_actor(self).map(move |res, act, _ctx| {
            act.in_flight.remove(&red);
            act.in_flight.remove(&blue);
            let result = match flatten(res) {
                Ok(session_id) => CommandResult::new(ResultStatus::Match).room(session_id.0),
                Err(e) => {
                    warn!("[Matchmaking] Could not open a room for {} vs {}: {}", red, blue, e);
                    CommandResult::new(e.status()).detail(e.public_detail())
                }
            };
            act.send_to(&red, ResultKind::SearchGame.event(result.clone()));
            act.send_to(&blue, ResultKind::SearchGame.event(result));
        }));
    }

    fn invite(&mut self, msg: InviteGame, online: bool, ctx: &mut Context<Self>) -> Result<(), EngineError> {
        let target = TargetFacts {
            exists: self.store.exists(&msg.to)?,
            online,
            in_game: self.in_game(&msg.to)?,
        };
        let inviter = UserFacts { in_game: self.in_game(&msg.from)? };
        guards::check_invite(&msg.from, &msg.to, inviter, target, &self.queues, &self.invitations)?;

        let from = msg.from.clone();
        let mut invitation = Invitation::new(msg.from, msg.to, msg.rule);
        invitation.timer = Some(ctx.run_interval(self.timing.invitation_tick, move |act, ctx| {
            act.tick_invitation(&from, ctx);
        }));

        let notice = ServerEvent::message(GameMessage::GameInvitation { from: invitation.from.clone() });
        self.presence.do_send(NotifyIfMember {
            room: RoomId::GameInvitation,
            user_id: invitation.to.clone(),
            event: notice,
        });
        info!("[Matchmaking] {} invited {} ({})", invitation.from, invitation.to, invitation.rule.as_str());
        self.invitations.insert(invitation);
        Ok(())
    }

    /// Remove an invitation and stop its countdown.
    fn withdraw(&mut self, from: &str, ctx: &mut Context<Self>) -> Option<Invitation> {
        let mut invitation = self.invitations.remove(from)?;
        if let Some(handle) = invitation.timer.take() {
            ctx.cancel_future(handle);
        }
        Some(invitation)
    }

    /// One countdown step of `from`'s invitation.
    fn tick_invitation(&mut self, from: &str, ctx: &mut Context<Self>) {
        let Some(invitation) = self.invitations.get_mut(from) else {
            return;
        };
        if invitation.status == InvitationStatus::Waiting && invitation.elapsed < self.timing.invitation_timeout_ticks {
            invitation.elapsed += 1;
            let waiting = CommandResult::new(ResultStatus::Waiting).username(invitation.to.clone());
            self.send_to(from, ResultKind::InviteGame.event(waiting));
            return;
        }

        let Some(invitation) = self.withdraw(from, ctx) else {
            return;
        };
        match invitation.status {
            InvitationStatus::Accepted => self.start_invited_session(invitation, ctx),
            InvitationStatus::Waiting | InvitationStatus::Declined => {
                if invitation.status == InvitationStatus::Waiting {
                    info!("[Matchmaking] Invitation from {} to {} timed out", invitation.from, invitation.to);
                }
                let declined = CommandResult::new(ResultStatus::Decline).username(invitation.to);
                self.send_to(from, ResultKind::InviteGame.event(declined));
            }
        }
    }

    fn start_invited_session(&mut self, invitation: Invitation, ctx: &mut Context<Self>) {
        let Invitation { from, to, rule, .. } = invitation;
        if let Err(e) = self.ensure_free([&from, &to]) {
            info!("[Matchmaking] Not opening a room for {} vs {}: {}", from, to, e);
            let failed = CommandResult::new(e.status()).detail(e.public_detail());
            self.send_to(&from, ResultKind::InviteGame.event(failed.clone().username(to.clone())));
            self.send_to(&to, ResultKind::AcceptGame.event(failed.username(from)));
            return;
        }
        self.in_flight.insert(from.clone());
        self.in_flight.insert(to.clone());

        let create = self.game_sessions.send(CreateSession { rule, red: from.clone(), blue: to.clone() });
        ctx.spawn(create.into_actor(self).map(move |res, act, _ctx| {
            act.in_flight.remove(&from);
            act.in_flight.remove(&to);
            let (to_inviter, to_invitee) = match flatten(res) {
                Ok(session_id) => (
                    CommandResult::new(ResultStatus::Accept).username(to.clone()).room(session_id.0),
                    CommandResult::new(ResultStatus::Approved).username(from.clone()).room(session_id.0),
                ),
                Err(e) => {
                    warn!("[Matchmaking] Could not open a room for {} vs {}: {}", from, to, e);
                    let failed = CommandResult::new(e.status()).detail(e.public_detail());
                    (failed.clone().username(to.clone()), failed.username(from.clone()))
                }
            };
            act.send_to(&from, ResultKind::InviteGame.event(to_inviter));
            act.send_to(&to, ResultKind::AcceptGame.event(to_invitee));
        }));
    }

    fn respond(&mut self, from: &str, responder: &str, status: InvitationStatus) -> Result<(), EngineError> {
        guards::check_response(from, responder, &self.invitations)?;
        if let Some(invitation) = self.invitations.get_mut(from) {
            invitation.status = status;
        }
        debug!("[Matchmaking] {} answered {}'s invitation: {:?}", responder, from, status);
        Ok(())
    }
}

fn flatten(res: Result<Result<SessionId, EngineError>, MailboxError>) -> Result<SessionId, EngineError> {
    res.map_err(EngineError::from).and_then(|r| r)
}

impl Actor for MatchmakingServer {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.run_interval(self.timing.match_interval, |act, ctx| {
            act.run_matcher(ctx);
        });
        info!("[Matchmaking] Matcher running every {:?}", self.timing.match_interval);
    }
}

impl Handler<SearchGame> for MatchmakingServer {
    type Result = Result<(), EngineError>;

    /// Handles a user asking to be matched under a rule.
    fn handle(&mut self, msg: SearchGame, _ctx: &mut Self::Context) -> Self::Result {
        let user = UserFacts { in_game: self.in_game(&msg.user_id)? };
        guards::check_enqueue(&msg.user_id, user, &self.queues, &self.invitations)?;
        info!("[Matchmaking] {} is searching a {} game", msg.user_id, msg.rule.as_str());
        self.queues.push(msg.rule, QueueEntry::new(msg.user_id, msg.connection_id));
        Ok(())
    }
}

impl Handler<CancelSearch> for MatchmakingServer {
    type Result = Result<(), EngineError>;

    fn handle(&mut self, msg: CancelSearch, _ctx: &mut Self::Context) -> Self::Result {
        guards::check_cancel(&msg.user_id, msg.rule, &self.queues)?;
        self.queues.remove(msg.rule, &msg.user_id);
        info!("[Matchmaking] {} stopped searching", msg.user_id);
        Ok(())
    }
}

impl Handler<InviteGame> for MatchmakingServer {
    type Result = ResponseActFuture<Self, Result<(), EngineError>>;

    /// Handles a direct challenge. The target's presence is resolved first; the
    /// remaining checks run once the answer is back, against current state.
    fn handle(&mut self, msg: InviteGame, _ctx: &mut Self::Context) -> Self::Result {
        let lookup = self.presence.send(LookupConnection { user_id: msg.to.clone() });
        Box::pin(lookup.into_actor(self).map(move |res, act, ctx| -> Result<(), EngineError> {
            let online = res?.is_some();
            act.invite(msg, online, ctx)
        }))
    }
}

impl Handler<AcceptGame> for MatchmakingServer {
    type Result = Result<(), EngineError>;

    /// Handles an accept. A responder still queued leaves the queues, so the
    /// matcher cannot pair them while the invited session opens.
    fn handle(&mut self, msg: AcceptGame, _ctx: &mut Self::Context) -> Self::Result {
        self.respond(&msg.from, &msg.responder, InvitationStatus::Accepted)?;
        if self.queues.remove_everywhere(&msg.responder) {
            info!("[Matchmaking] {} left the queue to accept {}'s invitation", msg.responder, msg.from);
        }
        Ok(())
    }
}

impl Handler<DeclineGame> for MatchmakingServer {
    type Result = Result<(), EngineError>;

    fn handle(&mut self, msg: DeclineGame, _ctx: &mut Self::Context) -> Self::Result {
        self.respond(&msg.from, &msg.responder, InvitationStatus::Declined)
    }
}

impl Handler<UserDisconnected> for MatchmakingServer {
    type Result = ();

    /// Handles a disconnect: drop queue entries and the user's own invitation.
    fn handle(&mut self, msg: UserDisconnected, ctx: &mut Self::Context) -> Self::Result {
        if self.queues.remove_everywhere(&msg.user_id) {
            debug!("[Matchmaking] Removed {} from the queues", msg.user_id);
        }
        if self.withdraw(&msg.user_id, ctx).is_some() {
            debug!("[Matchmaking] Withdrew the invitation sent by {}", msg.user_id);
        }
        self.invitations.decline_addressed_to(&msg.user_id);
    }
}
