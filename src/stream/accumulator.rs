//! Streaming Merkle accumulator

use super::BlockBuffer;
use crate::hasher::{HashAlgorithm, HasherFactory};
use crate::model::Digest;
use crate::tree::{aggregate, MerkleTree, Node};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::io;
use tracing::{debug, warn};

/// State of the trailing partial block
enum Tail {
    /// No leaf exists for the buffered bytes
    Clean,
    /// A checksum query hashed the buffered bytes into this leaf.
    /// It is never committed to the tree.
    Speculative(Node),
}

impl Tail {
    fn leaf(&self) -> Option<&Node> {
        match self {
            Tail::Clean => None,
            Tail::Speculative(leaf) => Some(leaf),
        }
    }
}

/// Snapshot of accumulator progress
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    /// Leaves visible to introspection, including a speculative one
    pub leaves: usize,
    /// Bytes buffered towards the next block
    pub buffered: usize,
    /// Bytes written since construction or the last reset
    pub total_bytes: u64,
    /// Whether the last leaf is a speculative partial block
    pub speculative: bool,
}

/// Incremental Merkle hash over a byte stream
///
/// Every full `block_length` run of written bytes becomes one leaf. The
/// trailing partial block is buffered until enough bytes arrive.
///
/// Not synchronized; share across threads only behind external locking.
pub struct MerkleHasher<F: HasherFactory = HashAlgorithm> {
    factory: F,
    block_length: usize,
    tree: MerkleTree,
    pending: BlockBuffer,
    tail: Tail,
    total_bytes: u64,
}

impl<F: HasherFactory> MerkleHasher<F> {
    /// Create an accumulator cutting blocks of `block_length` bytes
    pub fn new(factory: F, block_length: usize) -> Result<Self> {
        let tree = MerkleTree::new(block_length)?;
        Ok(MerkleHasher {
            factory,
            block_length,
            tree,
            pending: BlockBuffer::new(block_length),
            tail: Tail::Clean,
            total_bytes: 0,
        })
    }

    /// Append bytes to the stream
    ///
    /// Returns the number of bytes consumed, which is always `data.len()`
    /// on success. If a leaf cannot be built the call has no effect: leaves
    /// added by it are dropped and the buffered bytes are kept as they were.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.settle();
        if data.is_empty() {
            return Ok(0);
        }

        let committed = self.tree.len();
        match self.absorb(data) {
            Ok(()) => {
                self.total_bytes += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                self.tree.truncate(committed);
                warn!(error = %e, "write rolled back");
                Err(e)
            }
        }
    }

    /// Cut `data` into blocks, leaving `pending` untouched until every leaf
    /// has been built.
    fn absorb(&mut self, data: &[u8]) -> Result<()> {
        let factory: &dyn HasherFactory = &self.factory;
        let mut rest = data;

        if !self.pending.is_empty() {
            let need = self.pending.remaining();
            if rest.len() < need {
                self.pending.extend(rest);
                return Ok(());
            }
            let (head, tail) = rest.split_at(need);
            self.tree.push_block(factory, &[self.pending.as_slice(), head])?;
            rest = tail;
        }

        let mut blocks = rest.chunks_exact(self.block_length);
        for block in &mut blocks {
            self.tree.push_block(factory, &[block])?;
        }
        self.pending.replace(blocks.remainder());

        debug!(
            leaves = self.tree.len(),
            buffered = self.pending.len(),
            "absorbed {} bytes",
            data.len()
        );
        Ok(())
    }

    /// Checksum of everything written so far, followed by `extra`
    ///
    /// `extra` becomes part of the stream exactly as if it had been passed
    /// to [`write`](Self::write). Returns `Ok(None)` when nothing has been
    /// written. A trailing partial block is hashed as a speculative leaf
    /// that the next call drops again, so repeated queries agree and
    /// writing may continue afterwards.
    pub fn sum(&mut self, extra: &[u8]) -> Result<Option<Digest>> {
        self.write(extra)?;

        if self.tree.is_empty() && self.pending.is_empty() {
            return Ok(None);
        }

        if !self.pending.is_empty() {
            let index = self.tree.len();
            let leaf = Node::leaf(&self.factory, self.pending.as_slice()).map_err(|e| {
                warn!(error = %e, index, "partial block leaf failed");
                Error::LeafConstruction {
                    index,
                    reason: e.to_string(),
                }
            })?;
            debug!(index, length = leaf.length(), "speculative leaf appended");
            self.tail = Tail::Speculative(leaf);
        }

        match self.root() {
            Ok(root) => Ok(Some(root.checksum().clone())),
            Err(e) => {
                warn!(error = %e, "root computation failed");
                self.tail = Tail::Clean;
                Err(e)
            }
        }
    }

    /// Drop all leaves and buffered bytes, keeping the configuration
    pub fn reset(&mut self) {
        self.tree.clear();
        self.pending.clear();
        self.tail = Tail::Clean;
        self.total_bytes = 0;
    }

    /// Current leaves in stream order, a speculative leaf last
    pub fn leaves(&self) -> impl Iterator<Item = &Node> + '_ {
        self.tree.leaves().iter().chain(self.tail.leaf())
    }

    pub fn leaf_count(&self) -> usize {
        self.tree.len() + usize::from(self.tail.leaf().is_some())
    }

    /// Root node over the current leaves
    pub fn root(&self) -> Result<Node> {
        aggregate(self.leaves().cloned(), &self.factory)
    }

    /// Merkle block length in bytes
    pub fn block_length(&self) -> usize {
        self.block_length
    }

    /// Native block size of the leaf hash algorithm
    ///
    /// Not the Merkle block length; see [`block_length`](Self::block_length).
    pub fn block_size(&self) -> usize {
        self.factory.block_size()
    }

    /// Checksum size of the leaf hash algorithm
    pub fn digest_size(&self) -> usize {
        self.factory.digest_size()
    }

    /// Bytes buffered towards the next block
    pub fn buffered(&self) -> &[u8] {
        self.pending.as_slice()
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            leaves: self.leaf_count(),
            buffered: self.pending.len(),
            total_bytes: self.total_bytes,
            speculative: self.tail.leaf().is_some(),
        }
    }

    /// Finish the stream, committing a trailing partial block as the last leaf
    pub fn into_tree(mut self) -> Result<MerkleTree> {
        self.settle();
        if !self.pending.is_empty() {
            let factory: &dyn HasherFactory = &self.factory;
            self.tree.push_block(factory, &[self.pending.as_slice()])?;
        }
        Ok(self.tree)
    }

    /// Drop a speculative leaf left by the previous query
    fn settle(&mut self) {
        if let Tail::Speculative(leaf) = std::mem::replace(&mut self.tail, Tail::Clean) {
            debug!(length = leaf.length(), "speculative leaf retracted");
        }
    }
}

impl<F: HasherFactory> io::Write for MerkleHasher<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MerkleHasher::write(self, buf).map_err(|e| match e {
            Error::Io(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other),
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<F: HasherFactory> fmt::Debug for MerkleHasher<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleHasher")
            .field("block_length", &self.block_length)
            .field("leaves", &self.leaf_count())
            .field("buffered", &self.pending.len())
            .field("speculative", &self.tail.leaf().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::{FailingHasherFactory, MockHasherFactory};
    use std::io::Write as _;

    fn mock(block_length: usize) -> MerkleHasher<MockHasherFactory> {
        MerkleHasher::new(MockHasherFactory, block_length).unwrap()
    }

    fn leaf_bytes<F: HasherFactory>(h: &MerkleHasher<F>) -> Vec<Vec<u8>> {
        h.leaves().map(|n| n.checksum().as_bytes().to_vec()).collect()
    }

    #[test]
    fn test_zero_block_length_rejected() {
        let result = MerkleHasher::new(MockHasherFactory, 0);
        assert!(matches!(result, Err(Error::InvalidBlockLength(0))));
    }

    #[test]
    fn test_exact_blocks() {
        let mut h = mock(4);
        assert_eq!(h.write(b"ABCDEFGH").unwrap(), 8);

        assert_eq!(leaf_bytes(&h), vec![b"ABCD".to_vec(), b"EFGH".to_vec()]);
        assert!(h.buffered().is_empty());

        let sum = h.sum(&[]).unwrap().unwrap();
        assert_eq!(sum.as_bytes(), b"ABCDEFGH");
        assert_eq!(h.leaf_count(), 2);
        assert!(!h.stats().speculative);
    }

    #[test]
    fn test_speculative_leaf_then_resume() {
        let mut h = mock(4);
        h.write(b"ABCDEFG").unwrap();
        assert_eq!(leaf_bytes(&h), vec![b"ABCD".to_vec()]);
        assert_eq!(h.buffered(), b"EFG");

        h.sum(&[]).unwrap().unwrap();
        assert_eq!(leaf_bytes(&h), vec![b"ABCD".to_vec(), b"EFG".to_vec()]);
        assert!(h.stats().speculative);

        h.write(b"H").unwrap();
        assert_eq!(leaf_bytes(&h), vec![b"ABCD".to_vec(), b"EFGH".to_vec()]);
        assert!(h.buffered().is_empty());
        assert!(!h.stats().speculative);
    }

    #[test]
    fn test_fresh_sum_is_none() {
        let mut h = mock(4);
        assert_eq!(h.sum(&[]).unwrap(), None);
        assert_eq!(h.leaf_count(), 0);
        assert!(matches!(h.root(), Err(Error::EmptyTree)));
    }

    #[test]
    fn test_small_writes_accumulate() {
        let mut h = mock(4);
        for byte in b"ABCDEF" {
            h.write(&[*byte]).unwrap();
        }
        assert_eq!(leaf_bytes(&h), vec![b"ABCD".to_vec()]);
        assert_eq!(h.buffered(), b"EF");
        assert_eq!(h.stats().total_bytes, 6);
    }

    #[test]
    fn test_sum_extra_joins_stream() {
        let mut a = mock(4);
        a.write(b"AB").unwrap();
        let with_extra = a.sum(b"CDEFG").unwrap();

        let mut b = mock(4);
        b.write(b"ABCDEFG").unwrap();
        assert_eq!(with_extra, b.sum(&[]).unwrap());
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut h = mock(4);
        h.write(b"ABCDEFG").unwrap();
        h.sum(&[]).unwrap();
        h.reset();

        assert_eq!(h.leaf_count(), 0);
        assert!(h.buffered().is_empty());
        assert_eq!(h.block_length(), 4);
        assert_eq!(h.sum(&[]).unwrap(), None);
        assert_eq!(
            h.stats(),
            StreamStats {
                leaves: 0,
                buffered: 0,
                total_bytes: 0,
                speculative: false
            }
        );
    }

    #[test]
    fn test_block_size_is_not_block_length() {
        let h = MerkleHasher::new(HashAlgorithm::Blake3, 1024).unwrap();
        assert_eq!(h.block_length(), 1024);
        assert_eq!(h.block_size(), 64);
        assert_eq!(h.digest_size(), 32);
    }

    #[test]
    fn test_write_failure_rolls_back_buffer() {
        let mut h = MerkleHasher::new(FailingHasherFactory::rejecting(b'X'), 4).unwrap();
        h.write(b"ABCDEF").unwrap();
        assert_eq!(h.buffered(), b"EF");

        // "EFGH" would be built first, then "IJXL" fails
        let err = h.write(b"GHIJXLMN").unwrap_err();
        assert!(matches!(err, Error::LeafConstruction { index: 2, .. }));
        assert!(err.is_leaf_construction());

        assert_eq!(h.leaf_count(), 1);
        assert_eq!(h.buffered(), b"EF");
        assert_eq!(h.stats().total_bytes, 6);

        // Retry with good bytes continues the original stream
        h.write(b"GHIJKLMN").unwrap();
        let mut expected = MerkleHasher::new(FailingHasherFactory::rejecting(b'X'), 4).unwrap();
        expected.write(b"ABCDEFGHIJKLMN").unwrap();
        assert_eq!(h.sum(&[]).unwrap(), expected.sum(&[]).unwrap());
    }

    #[test]
    fn test_write_failure_in_first_block_keeps_pending() {
        let mut h = MerkleHasher::new(FailingHasherFactory::rejecting(b'X'), 4).unwrap();
        h.write(b"AB").unwrap();

        assert!(h.write(b"XY").is_err());
        assert_eq!(h.buffered(), b"AB");
        assert_eq!(h.leaf_count(), 0);
    }

    #[test]
    fn test_sum_failure_leaves_state_clean() {
        // Two leaf instances, then the parent hash fails
        let mut h = MerkleHasher::new(FailingHasherFactory::after(2), 4).unwrap();
        h.write(b"ABCDEF").unwrap();

        let err = h.sum(&[]).unwrap_err();
        assert!(err.is_root_computation());
        assert!(!h.stats().speculative);
        assert_eq!(h.leaf_count(), 1);
        assert_eq!(h.buffered(), b"EF");
    }

    #[test]
    fn test_partial_leaf_failure_in_sum_keeps_buffer() {
        let mut h = MerkleHasher::new(FailingHasherFactory::rejecting(b'X'), 4).unwrap();
        h.write(b"ABCDEX").unwrap();

        let err = h.sum(&[]).unwrap_err();
        assert!(err.is_leaf_construction());
        assert!(matches!(err, Error::LeafConstruction { index: 1, .. }));
        assert!(!h.stats().speculative);
        assert_eq!(h.leaf_count(), 1);
        assert_eq!(h.buffered(), b"EX");
        assert_eq!(h.stats().total_bytes, 6);
    }

    #[test]
    fn test_write_failure_after_speculative_sum() {
        let mut h = MerkleHasher::new(FailingHasherFactory::rejecting(b'X'), 4).unwrap();
        h.write(b"ABCDEF").unwrap();
        let first = h.sum(&[]).unwrap();
        assert!(h.stats().speculative);

        assert!(h.write(b"GX").is_err());
        assert!(!h.stats().speculative);
        assert_eq!(h.leaf_count(), 1);
        assert_eq!(h.buffered(), b"EF");
        assert_eq!(h.stats().total_bytes, 6);

        assert_eq!(h.sum(&[]).unwrap(), first);
    }

    #[test]
    fn test_into_tree_commits_partial_block() {
        let mut h = mock(4);
        h.write(b"ABCDEFG").unwrap();
        h.sum(&[]).unwrap();

        let tree = h.into_tree().unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.leaves()[1].checksum().as_bytes(), b"EFG");
        assert_eq!(tree.total_length(), 7);
    }

    #[test]
    fn test_io_write_copy() {
        let data = vec![7u8; 10_000];
        let mut h = MerkleHasher::new(HashAlgorithm::Blake3, 1024).unwrap();
        let copied = io::copy(&mut data.as_slice(), &mut h).unwrap();
        h.flush().unwrap();

        assert_eq!(copied, 10_000);
        assert_eq!(h.stats().leaves, 9);
        assert_eq!(h.stats().buffered, 10_000 - 9 * 1024);
    }

    #[test]
    fn test_debug_output() {
        let mut h = mock(4);
        h.write(b"ABCDE").unwrap();
        let dbg = format!("{:?}", h);
        assert!(dbg.contains("block_length: 4"));
        assert!(dbg.contains("buffered: 1"));
    }
}
