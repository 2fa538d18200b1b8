//! Ethereum ABI codec for the voting contract.
//!
//! Hand-rolled encoding/decoding for the three surfaces the client touches:
//! - the contract's read interface (`proposalCount()`, `proposals(uint256)`)
//! - the multicall aggregator (`tryAggregate(bool,(address,bytes)[])`)
//! - the contract's event logs (`ProposalCreated`, `Voted`, `ProposalExecuted`)
//!
//! Everything is strict: truncated payloads, out-of-range uints, malformed
//! booleans and bad UTF-8 are decode errors, never silent coercions.

pub mod decode;
pub mod encode;
pub mod error;
pub mod event;
pub mod selector;

pub use decode::{
    decode_proposal_count, decode_proposal_state, decode_try_aggregate, AggregateResult,
    ProposalState,
};
pub use encode::{encode_proposal_count, encode_proposals, encode_try_aggregate, Call};
pub use error::AbiError;
pub use event::decode_log;

/// Size of one ABI word in bytes.
pub const WORD: usize = 32;
