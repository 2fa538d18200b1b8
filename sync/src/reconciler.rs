//! Live event reconciliation.
//!
//! Translates the contract's three event kinds into store mutations, exactly
//! once per delivered event. The subscription is an owned resource: one
//! apply task per reconciler, acquired by [`EventReconciler::attach`] and
//! released by [`EventReconciler::detach`] (or drop), independent of any
//! display refresh cycle.

use crate::ProposalStore;
use std::sync::Arc;
use tally_types::{ProposalEvent, ProposalRecord};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Applies the live event stream to the store.
///
/// All three event kinds arrive on one channel, so attach/detach cover them
/// as a unit; a state where some kinds are subscribed and others are not
/// cannot be constructed. Delivery is assumed at-least-once for `Created`
/// (deduplicated by id) and at-most-once per increment for `Voted`; votes
/// carry no client-side dedup key, which mirrors the contract's own
/// one-vote-per-address rule.
pub struct EventReconciler {
    store: Arc<ProposalStore>,
    apply_task: Option<JoinHandle<()>>,
    attached: bool,
}

impl EventReconciler {
    pub fn new(store: Arc<ProposalStore>) -> Self {
        Self {
            store,
            apply_task: None,
            attached: false,
        }
    }

    /// Start applying events from `events`.
    ///
    /// Guarded: a second attach without an intervening [`detach`](Self::detach)
    /// is a logged no-op, so re-running a session setup path cannot register
    /// a duplicate listener and double-apply votes.
    pub fn attach(&mut self, events: broadcast::Receiver<ProposalEvent>) {
        if self.attached {
            debug!("reconciler already attached; ignoring");
            return;
        }
        // Flag first: even if the task below never spawns, a concurrent
        // setup path must see the subscription as taken.
        self.attached = true;

        let store = Arc::clone(&self.store);
        let mut events = events;
        self.apply_task = Some(tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => Self::apply_event(&store, event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "event stream lagged; state is stale until the next snapshot");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("event channel closed; apply task exiting");
                        break;
                    }
                }
            }
        }));
    }

    /// Whether an apply task currently owns the subscription.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Stop applying events and release the subscription.
    pub fn detach(&mut self) {
        if let Some(task) = self.apply_task.take() {
            task.abort();
        }
        self.attached = false;
    }

    /// Apply one event to the store.
    ///
    /// Infallible: every missing-key case degrades to a logged no-op. An
    /// error escaping the apply task would silently stop all future
    /// delivery, so none may.
    pub fn apply_event(store: &ProposalStore, event: ProposalEvent) {
        match event {
            ProposalEvent::Created {
                id,
                description,
                recipient: _,
                amount,
                voting_deadline,
                min_votes_to_pass,
            } => {
                let record = ProposalRecord {
                    id,
                    description,
                    amount,
                    min_required_vote: min_votes_to_pass,
                    vote_count: 0,
                    deadline: voting_deadline,
                    executed: false,
                };
                if store.append_if_absent(record) {
                    info!(%id, "proposal created");
                } else {
                    // Bootstrap overlap: the snapshot already contained it.
                    debug!(%id, "created event for a known proposal; keeping existing record");
                }
            }
            ProposalEvent::Voted { id, voter } => match store.record_vote(id) {
                Some(count) => debug!(%id, %voter, count, "vote recorded"),
                None => warn!(%id, "vote for an unknown proposal dropped"),
            },
            ProposalEvent::Executed { id } => {
                if store.mark_executed(id) {
                    info!(%id, "proposal executed");
                } else {
                    warn!(%id, "execution event for an unknown proposal dropped");
                }
            }
        }
    }
}

impl Drop for EventReconciler {
    fn drop(&mut self) {
        self.detach();
    }
}
