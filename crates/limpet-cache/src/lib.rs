//! # Limpet Cache
//!
//! Concurrent in-memory response cache for the Limpet file server.
//!
//! The store maps `(path, encoding)` keys to immutable response snapshots.
//! Entries are atomically replaceable `Arc`s, so lookups never observe a
//! torn entry and writers never block readers. A background sweeper ages
//! out stale entries without touching request traffic.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod store;
pub mod sweeper;

pub use store::{CacheKey, CachedResponse, ResponseCache};
pub use sweeper::SweeperConfig;
