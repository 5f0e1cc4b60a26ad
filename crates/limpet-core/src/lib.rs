//! # Limpet Core
//!
//! Core types and error handling for the Limpet file server.
//!
//! This crate provides the foundational pieces shared by the other crates:
//! - The [`Error`] type and [`Result`] alias
//! - The boxed response [`Body`] alias used at every crate boundary
//! - The [`Encoding`] enumeration and `Accept-Encoding` negotiation

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod body;
pub mod encoding;
pub mod error;

pub use body::{boxed, empty, full, Body, BoxError};
pub use encoding::Encoding;
pub use error::{Error, Result};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{HeaderMap, Request, Response, StatusCode};
