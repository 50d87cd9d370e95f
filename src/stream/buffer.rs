//! Owned buffer for the trailing partial block

/// Bytes that have been written but do not yet fill a block
///
/// Capacity is fixed to the block length at construction; the buffer never
/// holds a full block between calls.
#[derive(Clone, Debug)]
pub struct BlockBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl BlockBuffer {
    pub fn new(capacity: usize) -> Self {
        BlockBuffer {
            bytes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still needed to complete the block
    pub fn remaining(&self) -> usize {
        self.capacity - self.bytes.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Append bytes that do not complete the block
    pub(crate) fn extend(&mut self, data: &[u8]) {
        debug_assert!(data.len() < self.remaining());
        self.bytes.extend_from_slice(data);
    }

    /// Replace the contents with a new partial block
    pub(crate) fn replace(&mut self, data: &[u8]) {
        debug_assert!(data.len() < self.capacity);
        self.bytes.clear();
        self.bytes.extend_from_slice(data);
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }
}
