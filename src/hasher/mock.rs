//! Mock leaf hashers for testing

use super::{HasherFactory, LeafHasher};
use crate::model::Digest;
use crate::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A transparent "hash" whose checksum is the input bytes themselves
///
/// Leaf checksums equal their block bytes and a parent's checksum is the
/// concatenation of its children, which makes tree shapes easy to assert on.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockHasherFactory;

impl MockHasherFactory {
    pub fn new() -> Self {
        MockHasherFactory
    }
}

impl HasherFactory for MockHasherFactory {
    fn new_hasher(&self) -> Box<dyn LeafHasher> {
        Box::new(IdentityHasher::default())
    }
}

/// Identity hasher that fails on demand
///
/// Fails either when it is fed a particular byte, or on every update once a
/// given number of instances have been handed out.
#[derive(Debug, Default)]
pub struct FailingHasherFactory {
    reject: Option<u8>,
    budget: Option<usize>,
    created: AtomicUsize,
}

impl FailingHasherFactory {
    /// Fail any update whose input contains `byte`
    pub fn rejecting(byte: u8) -> Self {
        FailingHasherFactory {
            reject: Some(byte),
            ..Default::default()
        }
    }

    /// Allow `n` working instances, then hand out only failing ones
    pub fn after(n: usize) -> Self {
        FailingHasherFactory {
            budget: Some(n),
            ..Default::default()
        }
    }

    /// Number of instances handed out so far
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl HasherFactory for FailingHasherFactory {
    fn new_hasher(&self) -> Box<dyn LeafHasher> {
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(IdentityHasher {
            buf: Vec::new(),
            reject: self.reject,
            exhausted: self.budget.is_some_and(|budget| n >= budget),
        })
    }
}

#[derive(Default)]
struct IdentityHasher {
    buf: Vec<u8>,
    reject: Option<u8>,
    exhausted: bool,
}

impl LeafHasher for IdentityHasher {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        if self.exhausted {
            return Err(Error::Hash("mock hasher budget exhausted".into()));
        }
        if let Some(byte) = self.reject {
            if data.contains(&byte) {
                return Err(Error::Hash(format!("mock hasher rejected byte 0x{:02x}", byte)));
            }
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Digest> {
        Ok(Digest::from_bytes(self.buf))
    }

    fn block_size(&self) -> usize {
        1
    }

    fn digest_size(&self) -> usize {
        0
    }
}
