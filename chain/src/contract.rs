//! The live, read-only voting contract accessor.

use crate::{ChainConfig, ChainError, ProposalSource, RpcClient};
use async_trait::async_trait;
use std::time::Duration;
use tally_abi::{self as abi, Call, ProposalState};
use tally_types::{Address, ProposalId};
use tracing::debug;

/// Read-only handle on the voting contract and its multicall aggregator.
///
/// Construction is cheap and repeatable: handles share one HTTP connection
/// pool, so callers may build or clone one per refresh cycle without
/// spawning new connections.
#[derive(Clone)]
pub struct VotingContract {
    rpc: RpcClient,
    contract: Address,
    multicall: Address,
}

impl VotingContract {
    pub fn new(config: &ChainConfig) -> Self {
        let rpc = RpcClient::new(
            config.http_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        );
        Self {
            rpc,
            contract: config.contract_address,
            multicall: config.multicall_address,
        }
    }

    /// Build one from an existing RPC client (shared pool).
    pub fn with_client(rpc: RpcClient, contract: Address, multicall: Address) -> Self {
        Self {
            rpc,
            contract,
            multicall,
        }
    }

    /// The voting contract's address.
    pub fn address(&self) -> Address {
        self.contract
    }
}

#[async_trait]
impl ProposalSource for VotingContract {
    async fn proposal_count(&self) -> Result<u64, ChainError> {
        let raw = self
            .rpc
            .eth_call(&self.contract, &abi::encode_proposal_count())
            .await?;
        Ok(abi::decode_proposal_count(&raw)?)
    }

    async fn proposal_states(
        &self,
        ids: &[ProposalId],
    ) -> Result<Vec<ProposalState>, ChainError> {
        let calls: Vec<Call> = ids
            .iter()
            .map(|id| Call {
                target: self.contract,
                call_data: abi::encode_proposals(*id),
            })
            .collect();

        debug!(calls = calls.len(), "submitting aggregated proposal read");
        let raw = self
            .rpc
            .eth_call(&self.multicall, &abi::encode_try_aggregate(true, &calls))
            .await?;

        let results = abi::decode_try_aggregate(&raw)?;
        if results.len() != ids.len() {
            return Err(ChainError::InvalidResponse(format!(
                "aggregate returned {} results for {} calls",
                results.len(),
                ids.len()
            )));
        }

        let mut states = Vec::with_capacity(results.len());
        for (i, result) in results.iter().enumerate() {
            // requireSuccess = true means a failed inner call reverts the
            // whole aggregate; a false flag here is a misbehaving aggregator.
            if !result.success {
                return Err(tally_abi::AbiError::CallFailed(i).into());
            }
            states.push(abi::decode_proposal_state(&result.return_data)?);
        }
        Ok(states)
    }
}
