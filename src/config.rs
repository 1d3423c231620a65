//! Configuration for the knowledge index subsystem.
//!
//! Every section has defaults, so an empty mapping is a valid configuration:
//!
//! ```yaml
//! cache:
//!   capacity: 100
//!   ttl_secs: 3600
//! integrity: degrade
//! logger:
//!   enable: true
//!   level: info
//!   format: compact
//! ```

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{
    errors::{Error, Result},
    knowledge::solver::IntegrityPolicy,
    logger::LoggerSettings,
};

/// Maximum number of cached indexes.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Age after which a cached index is recomputed.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub integrity: IntegrityPolicy,
    #[serde(default)]
    pub logger: LoggerSettings,
}

impl Config {
    /// Parses and validates a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or invalid values.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a YAML file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or its content is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// # Errors
    ///
    /// Rejects a zero cache capacity or a zero TTL.
    pub fn validate(&self) -> Result<()> {
        if self.cache.capacity == 0 {
            return Err(Error::InvalidConfig(
                "cache.capacity must be at least 1".to_string(),
            ));
        }
        if self.cache.ttl_secs == 0 {
            return Err(Error::InvalidConfig(
                "cache.ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Bounds of the knowledge index cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheSettings {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}

fn default_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL.as_secs()
}
