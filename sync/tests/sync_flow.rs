//! End-to-end synchronization flow over the nullable chain: bootstrap
//! snapshot, then live events patching the same store.

use std::sync::Arc;
use std::time::Duration;
use tally_abi::ProposalState;
use tally_nullables::NullChain;
use tally_sync::{EventReconciler, LoadOutcome, ProposalStore, SnapshotLoader};
use tally_types::{Address, ProposalEvent, ProposalId, Timestamp, WeiAmount};

fn state(description: &str, vote_count: u64) -> ProposalState {
    ProposalState {
        description: description.into(),
        amount: WeiAmount::new(1_000_000_000_000_000_000),
        min_votes_to_pass: 2,
        vote_count,
        voting_deadline: Timestamp::new(1_900_000_000),
        executed: false,
    }
}

fn voter() -> Address {
    Address::from_hex("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap()
}

/// Poll until `check` passes or a deadline expires.
async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within deadline");
}

#[tokio::test]
async fn bootstrap_then_live_events() {
    // proposalCount = 3 -> two existing proposals.
    let chain = Arc::new(NullChain::new(vec![state("repair the well", 1), state("new roof", 0)]));
    let store = Arc::new(ProposalStore::new());

    let loader = SnapshotLoader::new(Arc::clone(&chain) as _, Arc::clone(&store));
    assert_eq!(loader.load().await.unwrap(), LoadOutcome::Applied(2));

    let mut reconciler = EventReconciler::new(Arc::clone(&store));
    reconciler.attach(chain.events());

    // A vote on #1, execution of #2, and creation of #3 arrive in order.
    chain.emit(ProposalEvent::Voted {
        id: ProposalId::new(1),
        voter: voter(),
    });
    chain.emit(ProposalEvent::Executed {
        id: ProposalId::new(2),
    });
    chain.emit(ProposalEvent::Created {
        id: ProposalId::new(3),
        description: "street lights".into(),
        recipient: voter(),
        amount: WeiAmount::new(500),
        voting_deadline: Timestamp::new(1_950_000_000),
        min_votes_to_pass: 4,
    });

    wait_until(|| store.len() == 3).await;

    let records = store.snapshot();
    assert_eq!(records[0].vote_count, 2); // bootstrap value 1 + one event
    assert!(records[1].executed);
    assert_eq!(records[2].id.raw(), 3);
    assert_eq!(records[2].description, "street lights");
    assert_eq!(records[2].vote_count, 0);
    assert!(!records[2].executed);

    reconciler.detach();
}

#[tokio::test]
async fn rebroadcast_creation_does_not_duplicate_bootstrapped_proposal() {
    let chain = Arc::new(NullChain::new(vec![state("repair the well", 3)]));
    let store = Arc::new(ProposalStore::new());

    let loader = SnapshotLoader::new(Arc::clone(&chain) as _, Arc::clone(&store));
    loader.load().await.unwrap();

    let mut reconciler = EventReconciler::new(Arc::clone(&store));
    reconciler.attach(chain.events());

    // The subscription window overlapped the bootstrap read: the creation
    // of #1 is delivered even though the snapshot already contains it.
    chain.emit(ProposalEvent::Created {
        id: ProposalId::new(1),
        description: "repair the well".into(),
        recipient: voter(),
        amount: WeiAmount::new(1),
        voting_deadline: Timestamp::new(1_900_000_000),
        min_votes_to_pass: 2,
    });
    chain.emit(ProposalEvent::Voted {
        id: ProposalId::new(1),
        voter: voter(),
    });

    wait_until(|| store.get(ProposalId::new(1)).map(|r| r.vote_count) == Some(4)).await;

    // One record, bootstrap fields intact, vote applied on top.
    assert_eq!(store.len(), 1);
    let record = store.get(ProposalId::new(1)).unwrap();
    assert_eq!(record.vote_count, 4);
    assert_eq!(record.amount.raw(), 1_000_000_000_000_000_000);

    reconciler.detach();
}

#[tokio::test]
async fn reload_after_failure_keeps_serving_old_snapshot() {
    let chain = Arc::new(NullChain::new(vec![state("repair the well", 0)]));
    let store = Arc::new(ProposalStore::new());
    let loader = SnapshotLoader::new(Arc::clone(&chain) as _, Arc::clone(&store));

    loader.load().await.unwrap();

    chain.fail_next_read();
    assert!(loader.load().await.is_err());
    assert_eq!(store.len(), 1, "failed reload must not clear the store");

    // The next reload succeeds and picks up the new proposal.
    chain.set_proposals(vec![state("repair the well", 0), state("new roof", 0)]);
    assert_eq!(loader.load().await.unwrap(), LoadOutcome::Applied(2));
    assert_eq!(store.len(), 2);
}
