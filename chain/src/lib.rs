//! Read-only accessor for the voting contract.
//!
//! This crate owns every network touchpoint of the client:
//! - JSON-RPC over HTTP for non-mutating reads (`eth_call`)
//! - the multicall aggregator round trip used by the snapshot loader
//! - a WebSocket `eth_subscribe` session that decodes contract logs into
//!   [`tally_types::ProposalEvent`]s and fans them out on a broadcast channel
//!
//! Nothing here retries: connectivity failures surface as
//! [`ChainError::Unreachable`] and retry policy belongs to the caller.

pub mod config;
pub mod contract;
pub mod error;
pub mod listener;
pub mod rpc;
pub mod source;

pub use config::ChainConfig;
pub use contract::VotingContract;
pub use error::ChainError;
pub use listener::EventListener;
pub use rpc::RpcClient;
pub use source::ProposalSource;
