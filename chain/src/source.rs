//! The trait seam between the network accessor and the sync core.

use crate::ChainError;
use async_trait::async_trait;
use tally_abi::ProposalState;
use tally_types::ProposalId;

/// Read access to the voting contract's proposal state.
///
/// The sync core depends only on this trait; [`crate::VotingContract`] is the
/// live implementation and the test double lives in `tally-nullables`.
#[async_trait]
pub trait ProposalSource: Send + Sync {
    /// The contract-wide proposal counter: one greater than the id of the
    /// most recently created proposal.
    async fn proposal_count(&self) -> Result<u64, ChainError>;

    /// Read the state of every id in `ids` in one aggregated round trip.
    ///
    /// Strict: any individual failure fails the whole batch. The returned
    /// states are position-aligned with `ids`.
    async fn proposal_states(&self, ids: &[ProposalId])
        -> Result<Vec<ProposalState>, ChainError>;
}
