//! File server configuration

use limpet_cache::SweeperConfig;
use limpet_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default per-entry cache ceiling: 10 MB
pub const DEFAULT_MAX_BYTES_PER_ENTRY: usize = 10_000_000;

fn default_max_bytes_per_entry() -> usize {
    DEFAULT_MAX_BYTES_PER_ENTRY
}

/// File server configuration, fixed at construction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileServerConfig {
    /// Route prefix stripped from request paths before cache-key and
    /// filesystem resolution (e.g. `/assets`)
    pub route_prefix: String,

    /// Directory the responder serves files from
    pub root_dir: PathBuf,

    /// Turns off all cache lookup and store behavior
    #[serde(default)]
    pub disable_cache: bool,

    /// Per-entry cache ceiling in bytes; responses that grow past this are
    /// served but never stored
    #[serde(default = "default_max_bytes_per_entry")]
    pub max_bytes_per_entry: usize,

    /// Eviction sweeper settings
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

impl FileServerConfig {
    /// Create a configuration with defaults for everything but the
    /// prefix and root directory
    pub fn new(route_prefix: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        Self {
            route_prefix: route_prefix.into(),
            root_dir: root_dir.into(),
            disable_cache: false,
            max_bytes_per_entry: DEFAULT_MAX_BYTES_PER_ENTRY,
            sweeper: SweeperConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !self.route_prefix.is_empty() && !self.route_prefix.starts_with('/') {
            return Err(Error::InvalidConfig(format!(
                "route prefix must be empty or start with '/', got {:?}",
                self.route_prefix
            )));
        }
        Ok(())
    }
}
