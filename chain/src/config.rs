//! Network configuration with TOML file support.

use crate::ChainError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_types::Address;

/// Configuration for the contract accessor.
///
/// Can be loaded from a TOML file via [`ChainConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The two contract addresses are
/// deployment-specific and have no defaults.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// HTTP JSON-RPC endpoint used for reads.
    #[serde(default = "default_http_url")]
    pub http_url: String,

    /// WebSocket endpoint used for the log subscription.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Address of the voting contract.
    pub contract_address: Address,

    /// Address of the multicall aggregator.
    pub multicall_address: Address,

    /// Per-request timeout for HTTP reads, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ChainConfig {
    /// Load a config from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ChainError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ChainError::Config(format!("{}: {e}", path.as_ref().display())))?;
        toml::from_str(&contents).map_err(|e| ChainError::Config(e.to_string()))
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_http_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_ws_url() -> String {
    "ws://127.0.0.1:8545".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}
