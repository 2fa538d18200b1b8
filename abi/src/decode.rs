//! Return-data decoding for the contract reads and the multicall aggregate.

use crate::{AbiError, WORD};
use tally_types::{Address, Timestamp, WeiAmount};

/// The decoded return of `proposals(uint256)` — the contract's internal
/// proposal struct, before it is mapped into a client-side record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposalState {
    pub description: String,
    pub amount: WeiAmount,
    pub min_votes_to_pass: u64,
    pub vote_count: u64,
    pub voting_deadline: Timestamp,
    pub executed: bool,
}

/// One `(bool success, bytes returnData)` entry of a `tryAggregate` response,
/// position-aligned with the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateResult {
    pub success: bool,
    pub return_data: Vec<u8>,
}

/// Decode the single-uint return of `proposalCount()`.
pub fn decode_proposal_count(data: &[u8]) -> Result<u64, AbiError> {
    u64_at(data, 0)
}

/// Decode the return of `proposals(uint256)`.
///
/// Layout: six head words (string offset, amount, minVotesToPass, voteCount,
/// votingDeadline, executed) followed by the string payload.
pub fn decode_proposal_state(data: &[u8]) -> Result<ProposalState, AbiError> {
    let description = string_at(data, offset_at(data, 0)?)?;
    let amount = WeiAmount::new(uint_at(data, WORD)?);
    let min_votes_to_pass = u64_at(data, 2 * WORD)?;
    let vote_count = u64_at(data, 3 * WORD)?;
    let voting_deadline = Timestamp::new(u64_at(data, 4 * WORD)?);
    let executed = bool_at(data, 5 * WORD)?;

    Ok(ProposalState {
        description,
        amount,
        min_votes_to_pass,
        vote_count,
        voting_deadline,
        executed,
    })
}

/// Decode the return of `tryAggregate`: a dynamic array of
/// `(bool, bytes)` tuples.
pub fn decode_try_aggregate(data: &[u8]) -> Result<Vec<AggregateResult>, AbiError> {
    // The array itself sits behind one offset word.
    let array = slice_from(data, offset_at(data, 0)?)?;
    let len = u64_at(array, 0)? as usize;

    // Elements are addressed relative to the position right after the
    // length word.
    let elements = slice_from(array, WORD)?;
    let mut results = Vec::with_capacity(len);
    for i in 0..len {
        let tuple = slice_from(elements, offset_at(elements, i * WORD)?)?;
        let success = bool_at(tuple, 0)?;
        let return_data = bytes_at(tuple, offset_at(tuple, WORD)?)?;
        results.push(AggregateResult {
            success,
            return_data,
        });
    }
    Ok(results)
}

// ── Word-level readers ─────────────────────────────────────────────────

fn word_at(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    data.get(offset..offset + WORD).ok_or(AbiError::Truncated {
        offset,
        wanted: WORD,
        have: data.len().saturating_sub(offset),
    })
}

/// Read a uint word into u128, rejecting values wider than 128 bits.
pub(crate) fn uint_at(data: &[u8], offset: usize) -> Result<u128, AbiError> {
    let word = word_at(data, offset)?;
    if word[..16].iter().any(|&b| b != 0) {
        return Err(AbiError::Overflow(offset));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(buf))
}

/// Read a uint word into u64, rejecting values wider than 64 bits.
pub(crate) fn u64_at(data: &[u8], offset: usize) -> Result<u64, AbiError> {
    let value = uint_at(data, offset)?;
    u64::try_from(value).map_err(|_| AbiError::Overflow(offset))
}

/// Read an offset word and check it lands inside the payload.
pub(crate) fn offset_at(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = u64_at(data, offset)? as usize;
    if value > data.len() {
        return Err(AbiError::Truncated {
            offset,
            wanted: value,
            have: data.len(),
        });
    }
    Ok(value)
}

fn slice_from(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    data.get(offset..).ok_or(AbiError::Truncated {
        offset,
        wanted: 0,
        have: data.len(),
    })
}

fn bool_at(data: &[u8], offset: usize) -> Result<bool, AbiError> {
    let word = word_at(data, offset)?;
    if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
        return Err(AbiError::InvalidBool(offset));
    }
    Ok(word[31] == 1)
}

pub(crate) fn address_at(data: &[u8], offset: usize) -> Result<Address, AbiError> {
    let word = word_at(data, offset)?;
    if word[..12].iter().any(|&b| b != 0) {
        return Err(AbiError::InvalidAddress(offset));
    }
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&word[12..]);
    Ok(Address::new(bytes))
}

/// Read a dynamic `bytes` payload (length word + data) starting at `offset`.
fn bytes_at(data: &[u8], offset: usize) -> Result<Vec<u8>, AbiError> {
    let len = u64_at(data, offset)? as usize;
    let start = offset + WORD;
    data.get(start..start + len)
        .map(<[u8]>::to_vec)
        .ok_or(AbiError::Truncated {
            offset: start,
            wanted: len,
            have: data.len().saturating_sub(start),
        })
}

/// Read a dynamic `string` payload, validating UTF-8.
pub(crate) fn string_at(data: &[u8], offset: usize) -> Result<String, AbiError> {
    let bytes = bytes_at(data, offset)?;
    String::from_utf8(bytes).map_err(|_| AbiError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{bool_word, uint_word};

    /// Hand-assemble a `proposals(uint256)` return payload.
    fn proposal_payload(description: &str, vote_count: u64, executed: bool) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&uint_word((6 * WORD) as u128)); // string offset
        data.extend_from_slice(&uint_word(1_500_000_000_000_000_000)); // amount
        data.extend_from_slice(&uint_word(3)); // minVotesToPass
        data.extend_from_slice(&uint_word(vote_count as u128));
        data.extend_from_slice(&uint_word(1_900_000_000)); // votingDeadline
        data.extend_from_slice(&bool_word(executed));
        let desc = description.as_bytes();
        data.extend_from_slice(&uint_word(desc.len() as u128));
        data.extend_from_slice(desc);
        data.resize(data.len().div_ceil(WORD) * WORD, 0);
        data
    }

    #[test]
    fn decode_proposal_count_single_word() {
        assert_eq!(decode_proposal_count(&uint_word(5)).unwrap(), 5);
    }

    #[test]
    fn decode_proposal_count_rejects_empty() {
        assert!(matches!(
            decode_proposal_count(&[]),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_proposal_state_maps_all_fields() {
        let state = decode_proposal_state(&proposal_payload("fund the bridge", 2, false)).unwrap();
        assert_eq!(state.description, "fund the bridge");
        assert_eq!(state.amount.raw(), 1_500_000_000_000_000_000);
        assert_eq!(state.min_votes_to_pass, 3);
        assert_eq!(state.vote_count, 2);
        assert_eq!(state.voting_deadline.as_secs(), 1_900_000_000);
        assert!(!state.executed);
    }

    #[test]
    fn decode_proposal_state_long_description() {
        // Longer than one word, exercises padding.
        let text = "a description that spans more than thirty-two bytes of payload";
        let state = decode_proposal_state(&proposal_payload(text, 0, true)).unwrap();
        assert_eq!(state.description, text);
        assert!(state.executed);
    }

    #[test]
    fn decode_proposal_state_truncated_string() {
        let mut data = proposal_payload("fund the bridge", 2, false);
        data.truncate(6 * WORD + 8); // cut inside the string payload
        assert!(matches!(
            decode_proposal_state(&data),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn decode_proposal_state_rejects_overflowing_vote_count() {
        let mut data = proposal_payload("x", 0, false);
        // Blow the voteCount word past 64 bits.
        data[3 * WORD + 8] = 0xFF;
        assert!(matches!(
            decode_proposal_state(&data),
            Err(AbiError::Overflow(_))
        ));
    }

    #[test]
    fn decode_proposal_state_rejects_bad_bool() {
        let mut data = proposal_payload("x", 0, false);
        data[5 * WORD + 31] = 2;
        assert!(matches!(
            decode_proposal_state(&data),
            Err(AbiError::InvalidBool(_))
        ));
    }

    /// Hand-assemble a `tryAggregate` response with the given inner payloads.
    fn aggregate_payload(entries: &[(bool, Vec<u8>)]) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&uint_word(WORD as u128)); // offset to array
        data.extend_from_slice(&uint_word(entries.len() as u128));

        let tuples: Vec<Vec<u8>> = entries
            .iter()
            .map(|(success, payload)| {
                let mut t = Vec::new();
                t.extend_from_slice(&bool_word(*success));
                t.extend_from_slice(&uint_word((2 * WORD) as u128));
                t.extend_from_slice(&uint_word(payload.len() as u128));
                t.extend_from_slice(payload);
                t.resize(t.len().div_ceil(WORD) * WORD, 0);
                t
            })
            .collect();

        let mut offset = entries.len() * WORD;
        for t in &tuples {
            data.extend_from_slice(&uint_word(offset as u128));
            offset += t.len();
        }
        for t in &tuples {
            data.extend_from_slice(t);
        }
        data
    }

    #[test]
    fn decode_try_aggregate_preserves_order_and_flags() {
        let payload = aggregate_payload(&[
            (true, uint_word(1).to_vec()),
            (false, Vec::new()),
            (true, uint_word(3).to_vec()),
        ]);
        let results = decode_try_aggregate(&payload).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[2].return_data, uint_word(3));
    }

    #[test]
    fn decode_try_aggregate_empty_array() {
        let payload = aggregate_payload(&[]);
        assert!(decode_try_aggregate(&payload).unwrap().is_empty());
    }

    #[test]
    fn decode_try_aggregate_rejects_truncated_tail() {
        let mut payload = aggregate_payload(&[(true, uint_word(1).to_vec())]);
        payload.truncate(payload.len() - WORD);
        assert!(matches!(
            decode_try_aggregate(&payload),
            Err(AbiError::Truncated { .. })
        ));
    }
}
