use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// A snapshot load failed before it could be committed; the store keeps
    /// its previous contents.
    #[error("chain error: {0}")]
    Chain(#[from] tally_chain::ChainError),
}
