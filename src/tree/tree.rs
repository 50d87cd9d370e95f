//! Ordered leaf sequence and root aggregation

use super::Node;
use crate::hasher::HasherFactory;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A Merkle tree: leaves in stream order plus the block length they were cut at
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTree {
    nodes: Vec<Node>,
    block_length: usize,
}

impl MerkleTree {
    /// Create an empty tree
    pub fn new(block_length: usize) -> Result<Self> {
        if block_length == 0 {
            return Err(Error::InvalidBlockLength(block_length));
        }
        Ok(MerkleTree {
            nodes: Vec::new(),
            block_length,
        })
    }

    /// Build a tree over `data` in one pass
    pub fn from_data(factory: &dyn HasherFactory, block_length: usize, data: &[u8]) -> Result<Self> {
        let mut tree = MerkleTree::new(block_length)?;
        for block in data.chunks(block_length) {
            tree.push_block(factory, &[block])?;
        }
        Ok(tree)
    }

    pub fn block_length(&self) -> usize {
        self.block_length
    }

    /// Leaves in stream order
    pub fn leaves(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total stream bytes covered by the leaves
    pub fn total_length(&self) -> u64 {
        self.nodes.iter().map(Node::length).sum()
    }

    /// Hash `parts` as one block and append it as the next leaf
    pub(crate) fn push_block(&mut self, factory: &dyn HasherFactory, parts: &[&[u8]]) -> Result<()> {
        let index = self.nodes.len();
        let leaf = Node::leaf_from_parts(factory, parts).map_err(|e| Error::LeafConstruction {
            index,
            reason: e.to_string(),
        })?;
        self.nodes.push(leaf);
        Ok(())
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Compute the root node over the current leaves
    pub fn root(&self, factory: &dyn HasherFactory) -> Result<Node> {
        aggregate(self.nodes.iter().cloned(), factory)
    }

    /// Byte range of the stream covered by leaf `index`
    pub fn block_range(&self, index: usize) -> Result<Range<u64>> {
        let leaf = self.nodes.get(index).ok_or(Error::BlockOutOfRange {
            index,
            leaves: self.nodes.len(),
        })?;
        let start = index as u64 * self.block_length as u64;
        Ok(start..start + leaf.length())
    }

    /// Check `block` against the stored checksum of leaf `index`
    pub fn verify_block(&self, factory: &dyn HasherFactory, index: usize, block: &[u8]) -> Result<bool> {
        let leaf = self.nodes.get(index).ok_or(Error::BlockOutOfRange {
            index,
            leaves: self.nodes.len(),
        })?;
        if leaf.length() != block.len() as u64 {
            return Ok(false);
        }
        let candidate = Node::leaf(factory, block).map_err(|e| Error::LeafConstruction {
            index,
            reason: e.to_string(),
        })?;
        Ok(candidate.checksum() == leaf.checksum())
    }
}

/// Combine leaves into a root, pairing left to right one level at a time
pub fn aggregate(leaves: impl IntoIterator<Item = Node>, factory: &dyn HasherFactory) -> Result<Node> {
    let mut level: Vec<Node> = leaves.into_iter().collect();
    if level.is_empty() {
        return Err(Error::EmptyTree);
    }

    while level.len() > 1 {
        let mut next = Vec::with_capacity((level.len() + 1) / 2);
        let mut nodes = level.into_iter();
        while let Some(left) = nodes.next() {
            match nodes.next() {
                Some(right) => {
                    let parent = Node::parent(factory, left, right)
                        .map_err(|e| Error::RootComputation(e.to_string()))?;
                    next.push(parent);
                }
                // Odd node out - promote as is
                None => next.push(left),
            }
        }
        level = next;
    }

    level.pop().ok_or(Error::EmptyTree)
}
