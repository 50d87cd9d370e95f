//! Leaf hash trait definitions

use crate::model::Digest;
use crate::Result;

/// A single-use instance of a block-level hash algorithm
///
/// Instances are created fresh for every node, so no state is ever shared
/// between two leaves.
pub trait LeafHasher {
    /// Feed bytes into the hash
    fn update(&mut self, data: &[u8]) -> Result<()>;

    /// Consume the instance and produce the checksum
    fn finalize(self: Box<Self>) -> Result<Digest>;

    /// The algorithm's own internal block size in bytes
    ///
    /// This is a property of the hash function, not the Merkle block length.
    fn block_size(&self) -> usize;

    /// Size of the produced checksum in bytes
    fn digest_size(&self) -> usize;
}

/// Produces fresh [`LeafHasher`] instances on demand
///
/// Implementations must be stateless: identical bytes in must always give
/// an identical checksum out, independent of call order. Any
/// `Fn() -> H` closure is a factory.
pub trait HasherFactory: Send + Sync {
    /// Create a fresh hash instance
    fn new_hasher(&self) -> Box<dyn LeafHasher>;

    /// Native block size of the produced algorithm
    fn block_size(&self) -> usize {
        self.new_hasher().block_size()
    }

    /// Checksum size of the produced algorithm
    fn digest_size(&self) -> usize {
        self.new_hasher().digest_size()
    }

    /// Hash several slices as one logical message with a fresh instance
    fn digest_parts(&self, parts: &[&[u8]]) -> Result<Digest> {
        let mut hasher = self.new_hasher();
        for part in parts {
            hasher.update(part)?;
        }
        hasher.finalize()
    }
}

impl<F, H> HasherFactory for F
where
    F: Fn() -> H + Send + Sync,
    H: LeafHasher + 'static,
{
    fn new_hasher(&self) -> Box<dyn LeafHasher> {
        Box::new(self())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::Blake3Hasher;

    #[test]
    fn test_closure_is_factory() {
        let factory = Blake3Hasher::new;
        assert_eq!(factory.digest_size(), 32);
        assert_eq!(factory.block_size(), 64);
    }

    #[test]
    fn test_digest_parts_matches_single_slice() {
        let factory = Blake3Hasher::new;
        let split = factory.digest_parts(&[b"hello ", b"world"]).unwrap();
        let whole = factory.digest_parts(&[b"hello world"]).unwrap();
        assert_eq!(split, whole);
    }
}
