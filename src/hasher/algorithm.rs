//! Built-in leaf hash algorithms

use super::{HasherFactory, LeafHasher};
use crate::model::Digest;
use crate::Result;
use serde::{Deserialize, Serialize};
use sha2::digest::core_api::BlockSizeUser;
use sha2::Digest as _;
use std::fmt;
use std::str::FromStr;

/// BLAKE3 leaf hash
#[derive(Default)]
pub struct Blake3Hasher {
    inner: blake3::Hasher,
}

impl Blake3Hasher {
    pub fn new() -> Self {
        Blake3Hasher {
            inner: blake3::Hasher::new(),
        }
    }
}

impl LeafHasher for Blake3Hasher {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.inner.update(data);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Digest> {
        let this = *self;
        Ok(Digest::from_bytes(this.inner.finalize().as_bytes().to_vec()))
    }

    fn block_size(&self) -> usize {
        blake3::BLOCK_LEN
    }

    fn digest_size(&self) -> usize {
        blake3::OUT_LEN
    }
}

/// SHA-256 leaf hash
#[derive(Default)]
pub struct Sha256Hasher {
    inner: sha2::Sha256,
}

impl Sha256Hasher {
    pub fn new() -> Self {
        Sha256Hasher {
            inner: sha2::Sha256::new(),
        }
    }
}

impl LeafHasher for Sha256Hasher {
    fn update(&mut self, data: &[u8]) -> Result<()> {
        self.inner.update(data);
        Ok(())
    }

    fn finalize(self: Box<Self>) -> Result<Digest> {
        let this = *self;
        Ok(Digest::from_bytes(this.inner.finalize().to_vec()))
    }

    fn block_size(&self) -> usize {
        <sha2::Sha256 as BlockSizeUser>::block_size()
    }

    fn digest_size(&self) -> usize {
        <sha2::Sha256 as sha2::Digest>::output_size()
    }
}

/// Selectable leaf hash algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
}

impl HashAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            HashAlgorithm::Blake3 => "blake3",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl HasherFactory for HashAlgorithm {
    fn new_hasher(&self) -> Box<dyn LeafHasher> {
        match self {
            HashAlgorithm::Blake3 => Box::new(Blake3Hasher::new()),
            HashAlgorithm::Sha256 => Box::new(Sha256Hasher::new()),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(HashAlgorithm::Blake3),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(crate::Error::Config(format!(
                "Unknown hash algorithm: {}",
                other
            ))),
        }
    }
}
