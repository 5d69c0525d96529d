//! Configuration for shredder trees.
//!
//! # Example
//!
//! ```
//! use shredder::ShredderConfig;
//!
//! // Defaults
//! let config = ShredderConfig::default();
//! assert_eq!(config.path_cache_capacity, 4096);
//! assert!(!config.log_state);
//! assert_eq!(config.max_index_gap, 65_536);
//!
//! // From TOML, missing fields fall back to defaults
//! let config = ShredderConfig::from_toml_str("log_state = true").unwrap();
//! assert!(config.log_state);
//! assert_eq!(config.path_cache_capacity, 4096);
//! ```

use serde::Deserialize;
use shredder_path::DEFAULT_CACHE_CAPACITY;

use crate::error::{Result, ShredderError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShredderConfig {
    /// Maximum number of memoized path strings (default: 4096)
    #[serde(default = "default_path_cache_capacity")]
    pub path_cache_capacity: usize,

    /// Include the full resulting state in write traces (default: false)
    #[serde(default)]
    pub log_state: bool,

    /// How far past the end of a list a write may pad with absent slots
    /// (default: 65536)
    #[serde(default = "default_max_index_gap")]
    pub max_index_gap: usize,
}

fn default_path_cache_capacity() -> usize { DEFAULT_CACHE_CAPACITY }

fn default_max_index_gap() -> usize { 1 << 16 }

impl Default for ShredderConfig {
    fn default() -> Self {
        Self {
            path_cache_capacity: default_path_cache_capacity(),
            log_state: false,
            max_index_gap: default_max_index_gap(),
        }
    }
}

impl ShredderConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ShredderError::Config(e.to_string()))
    }

    pub fn from_json(raw: &serde_json::Value) -> Result<Self> {
        Self::deserialize(raw).map_err(|e| ShredderError::Config(e.to_string()))
    }
}
