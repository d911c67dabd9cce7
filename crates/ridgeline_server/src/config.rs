//! # Server Configuration
//!
//! Loaded once at startup from a TOML file, with every field optional and
//! defaulted. Validation happens before the server binds anything, so a
//! bad compression level is a startup error, not a mid-connection one.
//!
//! ```toml
//! bind_addr = "0.0.0.0:6000"
//! chunk_size = 128
//! compression_level = 6
//! max_connections = 16
//!
//! [source]
//! kind = "directory"
//! path = "dem_tiles"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use ridgeline_core::{ChunkSource, DirSource, GenSource, MemSource};

use crate::delivery::RetryPolicy;

/// Configuration errors surfaced at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field value is out of range.
    #[error("invalid config: {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Human-readable constraint.
        reason: String,
    },
}

/// Where chunks come from.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// Bincode tile files at `<path>/<cx>_<cy>.dat`.
    Directory {
        /// Tile directory.
        path: PathBuf,
    },
    /// Deterministic procedural terrain.
    Generated {
        /// World seed.
        seed: u64,
    },
    /// Every coordinate is the zero grid (useful for protocol testing).
    Empty,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Directory {
            path: PathBuf::from("dem_tiles"),
        }
    }
}

/// Complete server configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// TCP listen address.
    pub bind_addr: String,
    /// Native chunk dimension in cells per axis.
    pub chunk_size: usize,
    /// zlib level, 1 (fastest) to 9 (tightest).
    pub compression_level: u32,
    /// Global concurrent connection budget.
    pub max_connections: usize,
    /// Delivery attempts per frame.
    pub max_retries: u32,
    /// Base backoff delay between delivery attempts, milliseconds.
    pub retry_base_ms: u64,
    /// Backoff ceiling, milliseconds.
    pub retry_cap_ms: u64,
    /// Entries in the pre-compressed full-frame cache; 0 disables it.
    pub cache_capacity: usize,
    /// Seconds before a cached frame is considered stale.
    pub cache_ttl_secs: u64,
    /// Chunk data source.
    pub source: SourceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:6000".to_string(),
            chunk_size: 128,
            compression_level: 6,
            max_connections: 16,
            max_retries: 3,
            retry_base_ms: 1_000,
            retry_cap_ms: 10_000,
            cache_capacity: 100,
            cache_ttl_secs: 300,
            source: SourceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Loads and validates a TOML config file.
    ///
    /// # Errors
    ///
    /// I/O, parse or validation failure.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=9).contains(&self.compression_level) {
            return Err(ConfigError::Invalid {
                field: "compression_level",
                reason: format!("{} is not in 1..=9", self.compression_level),
            });
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "max_connections",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid {
                field: "max_retries",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.retry_cap_ms < self.retry_base_ms {
            return Err(ConfigError::Invalid {
                field: "retry_cap_ms",
                reason: format!(
                    "cap {}ms is below base {}ms",
                    self.retry_cap_ms, self.retry_base_ms
                ),
            });
        }
        Ok(())
    }

    /// Retry policy derived from the delivery fields.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_ms),
            cap: Duration::from_millis(self.retry_cap_ms),
        }
    }

    /// TTL for the full-frame cache.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Builds the configured chunk source.
    #[must_use]
    pub fn build_source(&self) -> Arc<dyn ChunkSource> {
        match &self.source {
            SourceConfig::Directory { path } => Arc::new(DirSource::new(path, self.chunk_size)),
            SourceConfig::Generated { seed } => Arc::new(GenSource::new(self.chunk_size, *seed)),
            SourceConfig::Empty => Arc::new(MemSource::new(self.chunk_size)),
        }
    }
}
