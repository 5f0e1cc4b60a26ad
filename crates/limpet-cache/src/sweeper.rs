//! Background eviction sweeper
//!
//! Eviction is best-effort: an expired entry may still be served until the
//! next sweep runs. The sweep walks the store with the same sharded access
//! as request-path lookups, so it never blocks in-flight traffic.

use crate::ResponseCache;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::interval;
use tracing::debug;

/// Eviction sweeper settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Time between sweep passes
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Entries older than this are removed by the next sweep
    #[serde(default = "default_max_age", with = "humantime_serde")]
    pub max_age: Duration,
}

fn default_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_max_age() -> Duration {
    Duration::from_secs(600)
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            max_age: default_max_age(),
        }
    }
}

impl ResponseCache {
    /// Create a cache with a background sweeper
    ///
    /// Spawns a tokio task that runs for the cache's lifetime, removing
    /// entries older than `config.max_age` every `config.interval`. Must
    /// be called within a tokio runtime.
    pub fn with_sweeper(config: SweeperConfig) -> Self {
        let cache = Self::new();
        cache.spawn_sweeper(config);
        cache
    }

    /// Spawn the background sweep task for this cache
    pub fn spawn_sweeper(&self, config: SweeperConfig) {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval(config.interval);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                cache.sweep(config.max_age);
            }
        });
    }

    /// Run one sweep pass, returning the number of entries removed
    pub fn sweep(&self, max_age: Duration) -> usize {
        let removed = self.retain_younger_than(max_age);
        if removed > 0 {
            debug!(removed, "swept expired cache entries");
        }
        removed
    }
}
