//! # Limpet Runtime
//!
//! Standalone HTTP serving for [`limpet_files::FileServer`]: a hyper 1.x
//! accept loop with graceful shutdown on SIGINT/SIGTERM.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod server;
pub mod shutdown;

pub use server::Server;
pub use shutdown::{ShutdownSignal, SignalHandler};
