//! The in-memory proposal store — single source of truth for the display
//! layer.
//!
//! Mutation comes from exactly two places: the snapshot loader replaces the
//! whole collection (guarded by a load token), and the event reconciler
//! applies keyed patches. Readers always observe either the previous or the
//! new snapshot, never a partial replace.

use std::sync::{Mutex, MutexGuard};
use tally_types::{ProposalId, ProposalRecord};

/// Token tying a snapshot load to the store generation it started from.
///
/// `begin_load` hands one out and remembers it as the newest; a commit is
/// accepted only while its token is still the newest. A load that raced a
/// newer one therefore cannot roll back state with its stale response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadToken(u64);

#[derive(Default)]
struct Inner {
    records: Vec<ProposalRecord>,
    /// Most recently issued load token.
    newest_load: u64,
}

/// Ordered collection of [`ProposalRecord`]s.
#[derive(Default)]
pub struct ProposalStore {
    inner: Mutex<Inner>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave records half-written
        // (every mutation is a single push or field store), so recover the
        // guard instead of propagating the poison.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start a snapshot load, superseding any load still in flight.
    pub fn begin_load(&self) -> LoadToken {
        let mut inner = self.lock();
        inner.newest_load += 1;
        LoadToken(inner.newest_load)
    }

    /// Replace the whole collection with `records`, unless a newer load has
    /// been issued since `token` was drawn. Returns whether the snapshot was
    /// applied.
    pub fn commit_snapshot(&self, token: LoadToken, records: Vec<ProposalRecord>) -> bool {
        let mut inner = self.lock();
        if token.0 != inner.newest_load {
            return false;
        }
        inner.records = records;
        true
    }

    /// Append `record` unless its id is already present. Returns whether the
    /// record was inserted; an existing record is left untouched.
    pub fn append_if_absent(&self, record: ProposalRecord) -> bool {
        let mut inner = self.lock();
        if inner.records.iter().any(|r| r.id == record.id) {
            return false;
        }
        inner.records.push(record);
        true
    }

    /// Increment the vote count of `id` by exactly one. Returns the new
    /// count, or `None` if no such record exists.
    pub fn record_vote(&self, id: ProposalId) -> Option<u64> {
        let mut inner = self.lock();
        let record = inner.records.iter_mut().find(|r| r.id == id)?;
        record.vote_count += 1;
        Some(record.vote_count)
    }

    /// Mark `id` as executed. Marking an already-executed proposal is a
    /// no-op. Returns `false` only when no such record exists.
    pub fn mark_executed(&self, id: ProposalId) -> bool {
        let mut inner = self.lock();
        match inner.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.executed = true;
                true
            }
            None => false,
        }
    }

    /// The full ordered sequence, cloned out for the display layer.
    pub fn snapshot(&self) -> Vec<ProposalRecord> {
        self.lock().records.clone()
    }

    /// Look up one record by id.
    pub fn get(&self, id: ProposalId) -> Option<ProposalRecord> {
        self.lock().records.iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }
}
