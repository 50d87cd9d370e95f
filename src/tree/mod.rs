//! Merkle tree over fixed-length blocks
//!
//! Leaves carry the checksum of exactly one block, computed with a fresh
//! hasher so identical bytes always give identical leaves. The root is
//! derived on demand by pairing nodes level by level:
//! - parent = H(left.checksum || right.checksum), fresh hasher per parent
//! - an odd node at the end of a level is promoted unchanged
//! - a single leaf is its own root, an empty tree has no root

mod node;
mod tree;

pub use node::{Node, NodeKind};
pub use tree::{aggregate, MerkleTree};
