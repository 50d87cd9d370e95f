//! Pluggable leaf hash algorithms

mod algorithm;
mod mock;
mod traits;

pub use algorithm::{Blake3Hasher, HashAlgorithm, Sha256Hasher};
pub use mock::{FailingHasherFactory, MockHasherFactory};
pub use traits::{HasherFactory, LeafHasher};
