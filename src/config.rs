//! Accumulator configuration
//!
//! Stored in ~/.config/merkle_stream/config.json when present. Command line
//! flags override file values.

use crate::hasher::HashAlgorithm;
use crate::stream::MerkleHasher;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Merkle block length: 256 KiB
pub const DEFAULT_BLOCK_LENGTH: usize = 256 * 1024;

/// Configuration for building a [`MerkleHasher`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Length of each Merkle block in bytes
    pub block_length: usize,
    /// Leaf hash algorithm
    pub algorithm: HashAlgorithm,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            block_length: DEFAULT_BLOCK_LENGTH,
            algorithm: HashAlgorithm::default(),
        }
    }
}

impl StreamConfig {
    pub fn new(block_length: usize, algorithm: HashAlgorithm) -> Self {
        StreamConfig {
            block_length,
            algorithm,
        }
    }

    /// Default config file location (~/.config/merkle_stream/config.json)
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(config_dir.join("merkle_stream").join("config.json"))
    }

    /// Load from `path`, or from the default location if `None`
    ///
    /// A missing file at the default location yields the defaults; a
    /// missing explicit path is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        let config: StreamConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {}", e)))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }

    /// Apply command line overrides
    pub fn with_overrides(
        mut self,
        block_length: Option<usize>,
        algorithm: Option<HashAlgorithm>,
    ) -> Self {
        if let Some(block_length) = block_length {
            self.block_length = block_length;
        }
        if let Some(algorithm) = algorithm {
            self.algorithm = algorithm;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_length == 0 {
            return Err(Error::InvalidBlockLength(self.block_length));
        }
        Ok(())
    }

    /// Create an accumulator from this configuration
    pub fn build(&self) -> Result<MerkleHasher<HashAlgorithm>> {
        MerkleHasher::new(self.algorithm, self.block_length)
    }
}
