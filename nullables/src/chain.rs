//! Nullable chain accessor — canned proposal state, scriptable failures,
//! injectable events.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use tally_abi::ProposalState;
use tally_chain::{ChainError, ProposalSource};
use tally_types::{ProposalEvent, ProposalId};
use tokio::sync::broadcast;

/// A test chain that serves proposals from memory.
///
/// Ids are positional: the state at index `i` answers `proposals(i + 1)`,
/// and `proposal_count()` reports `len + 1`, matching the contract's
/// "counter is one past the last id" convention.
pub struct NullChain {
    proposals: Mutex<Vec<ProposalState>>,
    /// When set, the next read fails with a connectivity error and the
    /// flag clears.
    fail_next: Mutex<bool>,
    /// Artificial latency applied to every batch read.
    batch_delay: Mutex<Duration>,
    events_tx: broadcast::Sender<ProposalEvent>,
}

impl NullChain {
    pub fn new(proposals: Vec<ProposalState>) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        Self {
            proposals: Mutex::new(proposals),
            fail_next: Mutex::new(false),
            batch_delay: Mutex::new(Duration::ZERO),
            events_tx,
        }
    }

    /// Make the next read fail with `ChainError::Unreachable`.
    pub fn fail_next_read(&self) {
        *self.fail_next.lock().unwrap() = true;
    }

    /// Delay every subsequent batch read by `delay`.
    pub fn set_batch_delay(&self, delay: Duration) {
        *self.batch_delay.lock().unwrap() = delay;
    }

    /// Replace the canned proposal states.
    pub fn set_proposals(&self, proposals: Vec<ProposalState>) {
        *self.proposals.lock().unwrap() = proposals;
    }

    /// Get a receiver on the injected event stream.
    pub fn events(&self) -> broadcast::Receiver<ProposalEvent> {
        self.events_tx.subscribe()
    }

    /// Inject an event as if the contract had emitted it.
    pub fn emit(&self, event: ProposalEvent) {
        let _ = self.events_tx.send(event);
    }

    fn take_failure(&self) -> Result<(), ChainError> {
        let mut fail = self.fail_next.lock().unwrap();
        if *fail {
            *fail = false;
            return Err(ChainError::Unreachable("scripted failure".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProposalSource for NullChain {
    async fn proposal_count(&self) -> Result<u64, ChainError> {
        self.take_failure()?;
        Ok(self.proposals.lock().unwrap().len() as u64 + 1)
    }

    async fn proposal_states(
        &self,
        ids: &[ProposalId],
    ) -> Result<Vec<ProposalState>, ChainError> {
        let delay = *self.batch_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.take_failure()?;

        let proposals = self.proposals.lock().unwrap();
        ids.iter()
            .map(|id| {
                proposals
                    .get(id.raw() as usize - 1)
                    .cloned()
                    .ok_or(tally_abi::AbiError::CallFailed(id.raw() as usize - 1).into())
            })
            .collect()
    }
}
