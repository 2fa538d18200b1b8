//! Fundamental types for the tally voting-contract client.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: contract addresses, wei amounts, timestamps, proposal records,
//! and the contract events the synchronization core reacts to.

pub mod address;
pub mod amount;
pub mod error;
pub mod event;
pub mod proposal;
pub mod time;

pub use address::Address;
pub use amount::WeiAmount;
pub use error::TypeError;
pub use event::ProposalEvent;
pub use proposal::{ProposalId, ProposalRecord};
pub use time::Timestamp;
