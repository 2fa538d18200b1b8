//! Nullable infrastructure for deterministic testing.
//!
//! A "nullable" is a real implementation with its external effects removed:
//! the scriptable chain behaves like the live accessor but serves canned
//! state and injected events instead of touching the network.

pub mod chain;

pub use chain::NullChain;
