use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    /// The endpoint could not be reached (connection refused, DNS, timeout).
    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    /// The transport worked but the request itself failed.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The node returned a JSON-RPC error object (including reverted calls).
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The response did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Returned bytes did not decode against the contract interface.
    #[error("abi error: {0}")]
    Abi(#[from] tally_abi::AbiError),

    #[error("config error: {0}")]
    Config(String),
}
