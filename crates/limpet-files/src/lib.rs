//! # Limpet Files
//!
//! Caching, compressing static file serving.
//!
//! [`FileServer`] sits in front of a directory-backed responder and
//! memoizes rendered responses in memory, keyed by path and encoding.
//! Compressed variants (`gzip`, `br`, `zstd`, `deflate`) are derived
//! lazily the first time a client asks for them; responses larger than the
//! per-entry ceiling are served but never cached; a background sweeper
//! ages out stale entries.
//!
//! ```no_run
//! # async fn run() -> limpet_core::Result<()> {
//! use limpet_files::FileServer;
//!
//! let server = FileServer::builder("/assets", "./public")
//!     .max_bytes_per_entry(5_000_000)
//!     .build()?;
//!
//! // serve(request) from any hyper/tower integration,
//! // or mount it directly: FileServer implements tower::Service
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod capture;
pub mod config;
pub mod responder;
pub mod server;
mod service;

pub use config::{FileServerConfig, DEFAULT_MAX_BYTES_PER_ENTRY};
pub use responder::{DirResponder, ResponderRequest, StaticResponder};
pub use server::{FileServer, FileServerBuilder};

// Re-export the cache surface callers interact with
pub use limpet_cache::{CacheKey, CachedResponse, ResponseCache, SweeperConfig};
