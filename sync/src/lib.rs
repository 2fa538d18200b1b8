//! Synchronization core for the voting-contract client.
//!
//! Two writers, one store: the [`SnapshotLoader`] fills the
//! [`ProposalStore`] wholesale from a batched on-chain read, while the
//! [`EventReconciler`] patches it incrementally from the live event stream.
//! The store's load tokens keep a stale bulk read from rolling back state
//! the reconciler has already advanced.

pub mod error;
pub mod loader;
pub mod reconciler;
pub mod store;

pub use error::SyncError;
pub use loader::{LoadOutcome, SnapshotLoader};
pub use reconciler::EventReconciler;
pub use store::{LoadToken, ProposalStore};
