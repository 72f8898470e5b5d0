//! Outstanding invitations, keyed by inviter (one each at most).

use std::collections::HashMap;

use super::types::{Invitation, InvitationStatus};
use crate::server::types::UserId;

#[derive(Debug, Default)]
pub struct InvitationBook {
    by_inviter: HashMap<UserId, Invitation>,
}

impl InvitationBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, invitation: Invitation) {
        self.by_inviter.insert(invitation.from.clone(), invitation);
    }

    pub fn get(&self, from: &str) -> Option<&Invitation> {
        self.by_inviter.get(from)
    }

    pub fn get_mut(&mut self, from: &str) -> Option<&mut Invitation> {
        self.by_inviter.get_mut(from)
    }

    pub fn remove(&mut self, from: &str) -> Option<Invitation> {
        self.by_inviter.remove(from)
    }

    pub fn has_outgoing(&self, user_id: &str) -> bool {
        self.by_inviter.contains_key(user_id)
    }

    /// Whether an invitation addressed to `user_id` is still waiting or was accepted.
    pub fn has_incoming(&self, user_id: &str) -> bool {
        self.by_inviter
            .values()
            .any(|i| i.to == user_id && i.status != InvitationStatus::Declined)
    }

    /// Decline every waiting invitation addressed to `user_id`. The inviter
    /// hears about it on the next countdown tick.
    pub fn decline_addressed_to(&mut self, user_id: &str) -> usize {
        let mut declined = 0;
        for invitation in self.by_inviter.values_mut() {
            if invitation.to == user_id && invitation.status == InvitationStatus::Waiting {
                invitation.status = InvitationStatus::Declined;
                declined += 1;
            }
        }
        declined
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_inviter.len()
    }
}
