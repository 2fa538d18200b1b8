//! Call-data encoding for the contract reads and the multicall aggregate.

use crate::selector::{selector, SIG_PROPOSALS, SIG_PROPOSAL_COUNT, SIG_TRY_AGGREGATE};
use crate::WORD;
use tally_types::{Address, ProposalId};

/// One entry in an aggregated multicall request: a target contract and the
/// encoded call to run against it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub target: Address,
    pub call_data: Vec<u8>,
}

/// Encode `proposalCount()` — selector only, no arguments.
pub fn encode_proposal_count() -> Vec<u8> {
    selector(SIG_PROPOSAL_COUNT).to_vec()
}

/// Encode `proposals(uint256 id)`.
pub fn encode_proposals(id: ProposalId) -> Vec<u8> {
    let mut data = selector(SIG_PROPOSALS).to_vec();
    data.extend_from_slice(&uint_word(id.raw() as u128));
    data
}

/// Encode `tryAggregate(bool requireSuccess, (address target, bytes callData)[] calls)`.
///
/// The calls array is a dynamic array of dynamic tuples, so the layout is
/// head words (bool, array offset) followed by the array: length, per-element
/// offsets, then each tuple as (address word, bytes offset, bytes length,
/// padded bytes).
pub fn encode_try_aggregate(require_success: bool, calls: &[Call]) -> Vec<u8> {
    let mut data = selector(SIG_TRY_AGGREGATE).to_vec();

    // Head: requireSuccess, then the array's offset from the start of the
    // argument block (two head words = 0x40).
    data.extend_from_slice(&bool_word(require_success));
    data.extend_from_slice(&uint_word((2 * WORD) as u128));

    // Array region: length word, element offset words, element tails.
    let tails: Vec<Vec<u8>> = calls.iter().map(encode_call_tuple).collect();

    data.extend_from_slice(&uint_word(calls.len() as u128));
    let mut tail_offset = calls.len() * WORD;
    for tail in &tails {
        data.extend_from_slice(&uint_word(tail_offset as u128));
        tail_offset += tail.len();
    }
    for tail in &tails {
        data.extend_from_slice(tail);
    }

    data
}

/// Encode one `(address target, bytes callData)` tuple.
fn encode_call_tuple(call: &Call) -> Vec<u8> {
    let mut out = Vec::with_capacity(3 * WORD + padded_len(call.call_data.len()));
    out.extend_from_slice(&address_word(&call.target));
    // Offset of the bytes payload from the start of the tuple.
    out.extend_from_slice(&uint_word((2 * WORD) as u128));
    out.extend_from_slice(&uint_word(call.call_data.len() as u128));
    out.extend_from_slice(&call.call_data);
    out.resize(3 * WORD + padded_len(call.call_data.len()), 0);
    out
}

/// A u128 left-padded into one big-endian ABI word.
pub(crate) fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

pub(crate) fn bool_word(value: bool) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[31] = value as u8;
    word
}

pub(crate) fn address_word(addr: &Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(addr.as_bytes());
    word
}

/// Length of `len` bytes padded up to a whole number of words.
fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}
