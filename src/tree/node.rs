//! Tree node types

use crate::hasher::HasherFactory;
use crate::model::Digest;
use crate::Result;
use serde::{Deserialize, Serialize};

/// An immutable node of the Merkle tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    checksum: Digest,
    kind: NodeKind,
}

/// What a node covers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Checksum of a single block
    Leaf {
        /// Number of block bytes covered (less than the block length only
        /// for the final block of a stream)
        length: usize,
    },
    /// Checksum over two children
    Branch {
        left: Box<Node>,
        right: Box<Node>,
        /// Total stream bytes covered by the subtree
        length: u64,
    },
}

impl Node {
    /// Build a leaf from raw block bytes
    pub fn leaf(factory: &dyn HasherFactory, block: &[u8]) -> Result<Self> {
        Self::leaf_from_parts(factory, &[block])
    }

    /// Build a leaf whose block is the concatenation of `parts`
    pub fn leaf_from_parts(factory: &dyn HasherFactory, parts: &[&[u8]]) -> Result<Self> {
        let checksum = factory.digest_parts(parts)?;
        Ok(Node {
            checksum,
            kind: NodeKind::Leaf {
                length: parts.iter().map(|p| p.len()).sum(),
            },
        })
    }

    /// Combine two nodes into their parent
    pub fn parent(factory: &dyn HasherFactory, left: Node, right: Node) -> Result<Self> {
        let checksum = factory.digest_parts(&[left.checksum.as_bytes(), right.checksum.as_bytes()])?;
        let length = left.length() + right.length();
        Ok(Node {
            checksum,
            kind: NodeKind::Branch {
                left: Box::new(left),
                right: Box::new(right),
                length,
            },
        })
    }

    pub fn checksum(&self) -> &Digest {
        &self.checksum
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Stream bytes covered by this node
    pub fn length(&self) -> u64 {
        match &self.kind {
            NodeKind::Leaf { length } => *length as u64,
            NodeKind::Branch { length, .. } => *length,
        }
    }

    pub fn left(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Branch { left, .. } => Some(left),
            NodeKind::Leaf { .. } => None,
        }
    }

    pub fn right(&self) -> Option<&Node> {
        match &self.kind {
            NodeKind::Branch { right, .. } => Some(right),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Number of leaves under this node
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf { .. } => 1,
            NodeKind::Branch { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{HashAlgorithm, MockHasherFactory};

    #[test]
    fn test_leaf_hash_deterministic() {
        let n1 = Node::leaf(&HashAlgorithm::Blake3, b"block").unwrap();
        let n2 = Node::leaf(&HashAlgorithm::Blake3, b"block").unwrap();
        assert_eq!(n1, n2);
        assert_eq!(n1.length(), 5);
        assert!(n1.is_leaf());
    }

    #[test]
    fn test_leaf_from_parts_matches_contiguous() {
        let whole = Node::leaf(&HashAlgorithm::Sha256, b"ABCD").unwrap();
        let parts = Node::leaf_from_parts(&HashAlgorithm::Sha256, &[b"AB", b"", b"CD"]).unwrap();
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_parent_order_matters() {
        let a = Node::leaf(&HashAlgorithm::Blake3, b"a").unwrap();
        let b = Node::leaf(&HashAlgorithm::Blake3, b"b").unwrap();

        let ab = Node::parent(&HashAlgorithm::Blake3, a.clone(), b.clone()).unwrap();
        let ba = Node::parent(&HashAlgorithm::Blake3, b, a).unwrap();
        assert_ne!(ab.checksum(), ba.checksum());
        assert_eq!(ab.length(), 2);
        assert_eq!(ab.leaf_count(), 2);
    }

    #[test]
    fn test_parent_concatenates_child_checksums() {
        let factory = MockHasherFactory;
        let a = Node::leaf(&factory, b"AB").unwrap();
        let b = Node::leaf(&factory, b"CD").unwrap();
        let parent = Node::parent(&factory, a, b).unwrap();

        assert_eq!(parent.checksum().as_bytes(), b"ABCD");
        assert_eq!(parent.left().unwrap().checksum().as_bytes(), b"AB");
        assert_eq!(parent.right().unwrap().checksum().as_bytes(), b"CD");
    }
}
