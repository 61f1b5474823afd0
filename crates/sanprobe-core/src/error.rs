//! Errors outside the fault contract.
//!
//! Deliberate faults are never reported through this type; they trap or are
//! logged. `ProbeError` covers the plumbing around them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize log record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("argument {index} contains an interior NUL byte")]
    InteriorNul { index: usize },
}
