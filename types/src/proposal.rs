//! Proposal records as displayed client-side.

use crate::{Timestamp, WeiAmount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract-assigned proposal identifier.
///
/// Ids are a monotonically increasing counter starting at 1; they are
/// contiguous (the contract never deletes proposals).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProposalId(u64);

impl ProposalId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One on-chain proposal as held in the client-side store.
///
/// `description`, `amount`, `min_required_vote` and `deadline` are immutable
/// after creation. `vote_count` only ever increases and `executed` only ever
/// flips false -> true; the store enforces both.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalRecord {
    pub id: ProposalId,
    pub description: String,
    /// Funding amount in wei.
    pub amount: WeiAmount,
    /// Votes required for the proposal to become executable.
    pub min_required_vote: u64,
    pub vote_count: u64,
    /// Voting deadline (Unix seconds).
    pub deadline: Timestamp,
    pub executed: bool,
}

impl ProposalRecord {
    /// Whether the voting deadline has passed.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.deadline.is_past(now)
    }

    /// Whether the proposal has met its vote threshold and is still
    /// awaiting execution.
    pub fn can_execute(&self) -> bool {
        !self.executed && self.vote_count >= self.min_required_vote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vote_count: u64, min_required_vote: u64, executed: bool) -> ProposalRecord {
        ProposalRecord {
            id: ProposalId::new(1),
            description: "fund the bridge".into(),
            amount: WeiAmount::new(1_000),
            min_required_vote,
            vote_count,
            deadline: Timestamp::new(2_000),
            executed,
        }
    }

    #[test]
    fn expired_at_deadline() {
        let r = record(0, 3, false);
        assert!(!r.is_expired(Timestamp::new(1_999)));
        assert!(r.is_expired(Timestamp::new(2_000)));
    }

    #[test]
    fn can_execute_requires_threshold() {
        assert!(!record(2, 3, false).can_execute());
        assert!(record(3, 3, false).can_execute());
    }

    #[test]
    fn executed_proposal_cannot_execute_again() {
        assert!(!record(5, 3, true).can_execute());
    }
}
