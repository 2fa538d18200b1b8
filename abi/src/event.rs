//! Event log decoding.
//!
//! The proposal id is the single indexed parameter on every event (topic 1);
//! the remaining parameters are ABI-encoded in the log data. Logs whose
//! topic 0 is not one of the contract's three events decode to `None` rather
//! than an error, so callers can skip unrelated logs on a shared filter.

use crate::decode::{address_at, offset_at, string_at, u64_at, uint_at};
use crate::selector::{
    event_topic, EVT_PROPOSAL_CREATED, EVT_PROPOSAL_EXECUTED, EVT_VOTED,
};
use crate::{AbiError, WORD};
use std::sync::OnceLock;
use tally_types::{ProposalEvent, ProposalId, Timestamp, WeiAmount};

struct EventTopics {
    created: [u8; 32],
    voted: [u8; 32],
    executed: [u8; 32],
}

fn known_topics() -> &'static EventTopics {
    static TOPICS: OnceLock<EventTopics> = OnceLock::new();
    TOPICS.get_or_init(|| EventTopics {
        created: event_topic(EVT_PROPOSAL_CREATED),
        voted: event_topic(EVT_VOTED),
        executed: event_topic(EVT_PROPOSAL_EXECUTED),
    })
}

/// Decode one raw log into a [`ProposalEvent`].
///
/// Returns `Ok(None)` for logs that do not belong to the voting contract's
/// event interface.
pub fn decode_log(topics: &[[u8; 32]], data: &[u8]) -> Result<Option<ProposalEvent>, AbiError> {
    let Some(topic0) = topics.first() else {
        return Ok(None);
    };
    let known = known_topics();

    if *topic0 == known.created {
        decode_created(topics, data).map(Some)
    } else if *topic0 == known.voted {
        decode_voted(topics, data).map(Some)
    } else if *topic0 == known.executed {
        Ok(Some(ProposalEvent::Executed {
            id: indexed_id(topics)?,
        }))
    } else {
        Ok(None)
    }
}

/// Pull the indexed proposal id out of topic 1.
fn indexed_id(topics: &[[u8; 32]]) -> Result<ProposalId, AbiError> {
    let word = topics.get(1).ok_or(AbiError::MissingTopic)?;
    u64_at(word, 0).map(ProposalId::new)
}

/// `ProposalCreated`: data carries (description, recipient, amount,
/// votingDeadline, minVotesToPass).
fn decode_created(topics: &[[u8; 32]], data: &[u8]) -> Result<ProposalEvent, AbiError> {
    Ok(ProposalEvent::Created {
        id: indexed_id(topics)?,
        description: string_at(data, offset_at(data, 0)?)?,
        recipient: address_at(data, WORD)?,
        amount: WeiAmount::new(uint_at(data, 2 * WORD)?),
        voting_deadline: Timestamp::new(u64_at(data, 3 * WORD)?),
        min_votes_to_pass: u64_at(data, 4 * WORD)?,
    })
}

/// `Voted`: data carries the voter address.
fn decode_voted(topics: &[[u8; 32]], data: &[u8]) -> Result<ProposalEvent, AbiError> {
    Ok(ProposalEvent::Voted {
        id: indexed_id(topics)?,
        voter: address_at(data, 0)?,
    })
}
