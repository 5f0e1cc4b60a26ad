//! # Limpet Compress
//!
//! Stateless encoders for the four encodings the cache recognizes:
//! gzip, brotli, zstd, and raw deflate.
//!
//! Two shapes are provided:
//! - [`compress`]/[`decompress`] — one-shot, byte slice in, bytes out.
//!   Used to derive cached compressed variants from a raw entry.
//! - [`encode_body`] — streaming, wraps a response body so compressed
//!   bytes reach the client as they are produced. Used on cache-miss
//!   passthrough.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod oneshot;
pub mod stream;

pub use oneshot::{compress, decompress};
pub use stream::encode_body;
