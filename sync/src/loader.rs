//! Bootstrap snapshot loading via the batched multicall read.

use crate::{ProposalStore, SyncError};
use std::sync::Arc;
use tally_chain::ProposalSource;
use tally_types::{ProposalId, ProposalRecord};
use tracing::{debug, info};

/// What happened to a completed load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The snapshot was committed; contains the number of records.
    Applied(usize),
    /// A newer load was issued while this one was in flight; its result was
    /// discarded and the store is untouched.
    Superseded,
}

/// Loads a complete, consistent snapshot of every existing proposal in one
/// aggregated round trip and replaces the store's contents with it.
pub struct SnapshotLoader {
    source: Arc<dyn ProposalSource>,
    store: Arc<ProposalStore>,
}

impl SnapshotLoader {
    pub fn new(source: Arc<dyn ProposalSource>, store: Arc<ProposalStore>) -> Self {
        Self { source, store }
    }

    /// Run one snapshot load.
    ///
    /// Valid ids are `1..count` where `count` is the contract's proposal
    /// counter; `count <= 1` yields an empty (and successful) snapshot. Any
    /// failure (connectivity, revert, decode) aborts the whole load with the
    /// store left at its previous contents; a partial snapshot is never
    /// committed.
    pub async fn load(&self) -> Result<LoadOutcome, SyncError> {
        let token = self.store.begin_load();

        let count = self.source.proposal_count().await?;
        let ids: Vec<ProposalId> = (1..count).map(ProposalId::new).collect();
        debug!(count, proposals = ids.len(), "bootstrap read started");

        let records = if ids.is_empty() {
            Vec::new()
        } else {
            let states = self.source.proposal_states(&ids).await?;
            ids.iter()
                .zip(states)
                .map(|(id, state)| ProposalRecord {
                    id: *id,
                    description: state.description,
                    amount: state.amount,
                    min_required_vote: state.min_votes_to_pass,
                    vote_count: state.vote_count,
                    deadline: state.voting_deadline,
                    executed: state.executed,
                })
                .collect()
        };

        let applied = records.len();
        if self.store.commit_snapshot(token, records) {
            info!(proposals = applied, "snapshot applied");
            Ok(LoadOutcome::Applied(applied))
        } else {
            debug!("snapshot superseded by a newer load; discarding");
            Ok(LoadOutcome::Superseded)
        }
    }
}
