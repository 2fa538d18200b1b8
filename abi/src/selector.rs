//! Function selectors and event topics derived from canonical signatures.

use sha3::{Digest, Keccak256};

/// Canonical signatures of the contract's read interface.
pub const SIG_PROPOSAL_COUNT: &str = "proposalCount()";
pub const SIG_PROPOSALS: &str = "proposals(uint256)";

/// Canonical signature of the multicall aggregator entry point.
pub const SIG_TRY_AGGREGATE: &str = "tryAggregate(bool,(address,bytes)[])";

/// Canonical signatures of the contract's events.
pub const EVT_PROPOSAL_CREATED: &str =
    "ProposalCreated(uint256,string,address,uint256,uint256,uint256)";
pub const EVT_VOTED: &str = "Voted(uint256,address)";
pub const EVT_PROPOSAL_EXECUTED: &str = "ProposalExecuted(uint256)";

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// The 4-byte function selector for a canonical signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// The 32-byte topic-0 value for a canonical event signature.
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_is_topic_prefix() {
        // For functions the selector is the first 4 bytes of the full hash.
        let topic = event_topic(SIG_PROPOSALS);
        assert_eq!(selector(SIG_PROPOSALS), topic[..4]);
    }

    #[test]
    fn distinct_signatures_give_distinct_selectors() {
        assert_ne!(selector(SIG_PROPOSAL_COUNT), selector(SIG_PROPOSALS));
        assert_ne!(selector(SIG_PROPOSALS), selector(SIG_TRY_AGGREGATE));
    }

    #[test]
    fn event_topics_are_distinct() {
        let created = event_topic(EVT_PROPOSAL_CREATED);
        let voted = event_topic(EVT_VOTED);
        let executed = event_topic(EVT_PROPOSAL_EXECUTED);
        assert_ne!(created, voted);
        assert_ne!(voted, executed);
        assert_ne!(created, executed);
    }
}
