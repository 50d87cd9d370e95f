//! Error types for merkle_stream

use thiserror::Error;

/// Result type alias for merkle_stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a Merkle stream
#[derive(Error, Debug)]
pub enum Error {
    /// The leaf hash rejected or failed on a block's bytes
    #[error("Leaf construction failed for block {index}: {reason}")]
    LeafConstruction { index: usize, reason: String },

    /// A hash instance rejected its input
    #[error("Hash error: {0}")]
    Hash(String),

    /// The tree has no leaves, so there is no root
    #[error("Cannot compute a root over an empty tree")]
    EmptyTree,

    #[error("Root computation failed: {0}")]
    RootComputation(String),

    #[error("Invalid block length: {0} (must be positive)")]
    InvalidBlockLength(usize),

    #[error("Invalid digest: {0}")]
    InvalidDigest(String),

    #[error("Block index {index} out of range (tree has {leaves} leaves)")]
    BlockOutOfRange { index: usize, leaves: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from building a leaf
    pub fn is_leaf_construction(&self) -> bool {
        matches!(self, Error::LeafConstruction { .. })
    }

    /// Whether this error came from aggregating leaves into a root
    pub fn is_root_computation(&self) -> bool {
        matches!(self, Error::EmptyTree | Error::RootComputation(_))
    }
}
