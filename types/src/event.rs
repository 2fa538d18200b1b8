//! Contract events the synchronization core reacts to.

use crate::{Address, ProposalId, Timestamp, WeiAmount};

/// A decoded event emitted by the voting contract.
///
/// These mirror the contract's event interface one-to-one. `Created` carries
/// the recipient even though the client-side record does not display it, so
/// downstream consumers can log the full emission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProposalEvent {
    /// A new proposal was created.
    Created {
        id: ProposalId,
        description: String,
        recipient: Address,
        amount: WeiAmount,
        voting_deadline: Timestamp,
        min_votes_to_pass: u64,
    },
    /// A vote was cast on a proposal.
    Voted { id: ProposalId, voter: Address },
    /// A proposal met its threshold and was executed.
    Executed { id: ProposalId },
}

impl ProposalEvent {
    /// The proposal this event refers to.
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            Self::Created { id, .. } | Self::Voted { id, .. } | Self::Executed { id } => *id,
        }
    }
}
