//! The three rule queues.

use std::collections::VecDeque;

use super::types::QueueEntry;
use crate::game::types::Rule;

#[derive(Debug, Default)]
pub struct MatchQueues {
    rank: VecDeque<QueueEntry>,
    normal: VecDeque<QueueEntry>,
    arcade: VecDeque<QueueEntry>,
}

impl MatchQueues {
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self, rule: Rule) -> &VecDeque<QueueEntry> {
        match rule {
            Rule::Rank => &self.rank,
            Rule::Normal => &self.normal,
            Rule::Arcade => &self.arcade,
        }
    }

    fn queue_mut(&mut self, rule: Rule) -> &mut VecDeque<QueueEntry> {
        match rule {
            Rule::Rank => &mut self.rank,
            Rule::Normal => &mut self.normal,
            Rule::Arcade => &mut self.arcade,
        }
    }

    pub fn push(&mut self, rule: Rule, entry: QueueEntry) {
        self.queue_mut(rule).push_back(entry);
    }

    /// Take the two oldest entries of a queue, oldest first. Leaves the queue
    /// untouched when it holds fewer than two.
    pub fn pop_pair(&mut self, rule: Rule) -> Option<(QueueEntry, QueueEntry)> {
        let queue = self.queue_mut(rule);
        if queue.len() < 2 {
            return None;
        }
        let first = queue.pop_front()?;
        let second = queue.pop_front()?;
        Some((first, second))
    }

    /// Returns false if the user was not in that queue.
    pub fn remove(&mut self, rule: Rule, user_id: &str) -> bool {
        let queue = self.queue_mut(rule);
        let before = queue.len();
        queue.retain(|e| e.user_id != user_id);
        queue.len() != before
    }

    pub fn remove_everywhere(&mut self, user_id: &str) -> bool {
        let mut removed = false;
        for rule in Rule::ALL {
            removed |= self.remove(rule, user_id);
        }
        removed
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.rule_of(user_id).is_some()
    }

    pub fn rule_of(&self, user_id: &str) -> Option<Rule> {
        Rule::ALL
            .into_iter()
            .find(|&rule| self.queue(rule).iter().any(|e| e.user_id == user_id))
    }

    #[cfg(test)]
    pub fn len(&self, rule: Rule) -> usize {
        self.queue(rule).len()
    }

    pub fn entries(&self) -> impl Iterator<Item = &QueueEntry> {
        self.rank.iter().chain(self.normal.iter()).chain(self.arcade.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::types::ConnectionId;

    fn entry(user: &str) -> QueueEntry {
        QueueEntry::new(user, ConnectionId::new())
    }

    #[test]
    fn pairs_leave_in_arrival_order() {
        let mut queues = MatchQueues::new();
        queues.push(Rule::Rank, entry("alice"));
        queues.push(Rule::Rank, entry("bob"));
        queues.push(Rule::Rank, entry("carol"));

        let (red, blue) = queues.pop_pair(Rule::Rank).unwrap();
        assert_eq!((red.user_id.as_str(), blue.user_id.as_str()), ("alice", "bob"));
        assert!(!queues.contains("alice"));
        assert!(!queues.contains("bob"));
        assert!(queues.pop_pair(Rule::Rank).is_none());
        assert_eq!(queues.len(Rule::Rank), 1);
    }

    #[test]
    fn queues_are_independent() {
        let mut queues = MatchQueues::new();
        queues.push(Rule::Rank, entry("alice"));
        queues.push(Rule::Arcade, entry("bob"));
        assert!(queues.pop_pair(Rule::Rank).is_none());
        assert_eq!(queues.rule_of("bob"), Some(Rule::Arcade));
    }

    #[test]
    fn remove_everywhere_clears_the_user() {
        let mut queues = MatchQueues::new();
        queues.push(Rule::Normal, entry("alice"));
        queues.push(Rule::Normal, entry("bob"));
        assert!(queues.remove_everywhere("alice"));
        assert!(!queues.remove_everywhere("alice"));
        assert!(!queues.remove(Rule::Rank, "bob"));
        assert_eq!(queues.entries().map(|e| e.user_id.as_str()).collect::<Vec<_>>(), vec!["bob"]);
    }
}
