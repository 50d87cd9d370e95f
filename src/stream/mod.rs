//! Incremental Merkle checksums over a byte stream
//!
//! [`MerkleHasher`] cuts arbitrarily fragmented writes into fixed-length
//! blocks, commits one leaf per full block and keeps the trailing partial
//! block buffered. A checksum query may hash that partial block as a
//! temporary leaf; the next call of any kind drops it again, so querying
//! never prevents further writes.

mod accumulator;
mod buffer;

pub use accumulator::{MerkleHasher, StreamStats};
pub use buffer::BlockBuffer;
