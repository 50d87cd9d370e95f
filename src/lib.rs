//! # merkle_stream
//!
//! Block-level, tamper-evident checksums of byte streams, computed
//! incrementally as bytes arrive.
//!
//! The stream is cut into fixed-length blocks, each block becomes a leaf
//! of a Merkle tree, and the root checksum identifies the whole stream.
//! Individual blocks stay addressable and verifiable through their leaves,
//! which suits content-addressed storage, deduplication and transfer
//! verification.
//!
//! ## Core Concepts
//!
//! - **Leaf hash**: pluggable block hash, created fresh per node by a
//!   [`HasherFactory`]
//! - **Leaves**: one checksum per block, in stream order
//! - **Root**: aggregate checksum over all leaves
//! - **Accumulator**: [`MerkleHasher`] turns arbitrary writes into leaves
//!   and answers "checksum so far" without closing the stream
//!
//! ## Example
//!
//! ```
//! use merkle_stream::{HashAlgorithm, MerkleHasher};
//!
//! let mut hasher = MerkleHasher::new(HashAlgorithm::Blake3, 4)?;
//! hasher.write(b"ABCDEFG")?;
//! let partial = hasher.sum(&[])?;
//! hasher.write(b"H")?;
//! assert_ne!(partial, hasher.sum(&[])?);
//! assert_eq!(hasher.leaf_count(), 2);
//! # Ok::<(), merkle_stream::Error>(())
//! ```

pub mod config;
pub mod hasher;
pub mod model;
pub mod stream;
pub mod tree;

mod error;

pub use config::{StreamConfig, DEFAULT_BLOCK_LENGTH};
pub use error::{Error, Result};
pub use hasher::{
    Blake3Hasher, FailingHasherFactory, HashAlgorithm, HasherFactory, LeafHasher,
    MockHasherFactory, Sha256Hasher,
};
pub use model::Digest;
pub use stream::{BlockBuffer, MerkleHasher, StreamStats};
pub use tree::{MerkleTree, Node, NodeKind};
