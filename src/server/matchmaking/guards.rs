//! Precondition checks for queue and invitation commands.
//!
//! Pure functions over the matchmaking state, evaluated inside the actor's
//! handler right before the mutation they protect.

use super::invitations::InvitationBook;
use super::queues::MatchQueues;
use super::types::InvitationStatus;
use crate::game::types::Rule;
use crate::server::error::EngineError;

/// What the store and the presence registry said about the users involved.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserFacts {
    pub in_game: bool,
}

pub fn check_enqueue(
    user_id: &str,
    user: UserFacts,
    queues: &MatchQueues,
    invitations: &InvitationBook,
) -> Result<(), EngineError> {
    if user.in_game {
        return Err(EngineError::warning("You are already in a game."));
    }
    if queues.contains(user_id) {
        return Err(EngineError::warning("You are already searching for a game."));
    }
    if invitations.has_outgoing(user_id) || invitations.has_incoming(user_id) {
        return Err(EngineError::warning("You have a pending invitation."));
    }
    Ok(())
}

pub fn check_cancel(user_id: &str, rule: Rule, queues: &MatchQueues) -> Result<(), EngineError> {
    if queues.rule_of(user_id) != Some(rule) {
        return Err(EngineError::warning(format!("You are not searching for a {} game.", rule.as_str())));
    }
    Ok(())
}

/// Facts about the invitation target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetFacts {
    pub exists: bool,
    pub online: bool,
    pub in_game: bool,
}

pub fn check_invite(
    from: &str,
    to: &str,
    inviter: UserFacts,
    target: TargetFacts,
    queues: &MatchQueues,
    invitations: &InvitationBook,
) -> Result<(), EngineError> {
    if from == to {
        return Err(EngineError::rejected("You cannot invite yourself."));
    }
    if !target.exists {
        return Err(EngineError::rejected(format!("User {} does not exist.", to)));
    }
    if !target.online {
        return Err(EngineError::warning(format!("{} is not online.", to)));
    }
    if inviter.in_game {
        return Err(EngineError::warning("You are already in a game."));
    }
    if target.in_game {
        return Err(EngineError::warning(format!("{} is already in a game.", to)));
    }
    if queues.contains(from) {
        return Err(EngineError::warning("You are already searching for a game."));
    }
    if invitations.has_outgoing(from) {
        return Err(EngineError::warning("You already have a pending invitation."));
    }
    Ok(())
}

/// An answer to `from`'s invitation must come from its target while it still waits.
pub fn check_response(from: &str, responder: &str, invitations: &InvitationBook) -> Result<(), EngineError> {
    let Some(invitation) = invitations.get(from) else {
        return Err(EngineError::warning("The invitation has expired."));
    };
    if invitation.to != responder {
        return Err(EngineError::warning("This invitation was not sent to you."));
    }
    if invitation.status != InvitationStatus::Waiting {
        return Err(EngineError::warning("The invitation was already answered."));
    }
    Ok(())
}
