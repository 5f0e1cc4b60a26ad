//! Directory responder seam
//!
//! The file server orchestrates caching and compression around an
//! underlying responder that maps a URL path to file bytes and standard
//! headers (ETag, Last-Modified, Content-Type). Production uses
//! [`DirResponder`]; tests substitute scripted implementations.

use async_trait::async_trait;
use bytes::Bytes;
use http::Request;
use http_body_util::Empty;
use limpet_core::{boxed, Body, Error, Response, Result};
use std::fmt;
use std::path::Path;
use tower_http::services::ServeDir;

/// Request handed to the responder. Static file resolution only reads the
/// head, so the body is always empty.
pub type ResponderRequest = Request<Empty<Bytes>>;

/// A responder that resolves a request against a directory tree
#[async_trait]
pub trait StaticResponder: Send + Sync + fmt::Debug {
    /// Produce the response for `req`, including not-found handling
    async fn respond(&self, req: ResponderRequest) -> Result<Response<Body>>;
}

/// Directory-tree responder backed by [`ServeDir`]
///
/// Streams file contents, negotiates conditional requests, and renders its
/// own not-found response for missing paths.
#[derive(Debug, Clone)]
pub struct DirResponder {
    inner: ServeDir,
}

impl DirResponder {
    /// Serve files from `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            inner: ServeDir::new(root),
        }
    }
}

#[async_trait]
impl StaticResponder for DirResponder {
    async fn respond(&self, req: ResponderRequest) -> Result<Response<Body>> {
        let response = self
            .inner
            .clone()
            .try_call(req)
            .await
            .map_err(Error::Io)?;
        Ok(response.map(boxed))
    }
}
