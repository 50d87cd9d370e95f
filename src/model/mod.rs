//! Core value types for merkle_stream

mod digest;

pub use digest::Digest;
