//! File server orchestration
//!
//! Each request runs a lookup-or-populate-then-serve cycle: resolve the
//! cache path, consult the cache for an encoding-specific entry then a raw
//! one, and otherwise fall through to the directory responder with capture
//! in place. Compressed variants are derived lazily from cached raw bytes
//! the first time an encoding is requested.

use crate::capture::{CaptureBody, StoreOnComplete};
use crate::config::FileServerConfig;
use crate::responder::{DirResponder, ResponderRequest, StaticResponder};
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH};
use http::request::Parts;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode, Uri};
use http_body_util::Empty;
use limpet_cache::{CacheKey, CachedResponse, ResponseCache, SweeperConfig};
use limpet_compress::{compress, encode_body};
use limpet_core::{boxed, full, Body, Encoding, Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Caching, compressing static file server
///
/// Cloning is cheap; clones share the cache, configuration, and responder.
#[derive(Clone)]
pub struct FileServer {
    config: Arc<FileServerConfig>,
    cache: ResponseCache,
    responder: Arc<dyn StaticResponder>,
}

impl fmt::Debug for FileServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileServer")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.len())
            .finish()
    }
}

impl FileServer {
    /// Create a file server with default options
    ///
    /// Spawns the cache's eviction sweeper; must be called within a tokio
    /// runtime.
    pub fn new(route_prefix: impl Into<String>, root_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(route_prefix, root_dir).build()
    }

    /// Create a builder for customizing options
    pub fn builder(
        route_prefix: impl Into<String>,
        root_dir: impl Into<PathBuf>,
    ) -> FileServerBuilder {
        FileServerBuilder {
            config: FileServerConfig::new(route_prefix, root_dir),
            responder: None,
        }
    }

    /// The configuration this server was built with
    pub fn config(&self) -> &FileServerConfig {
        &self.config
    }

    /// The shared response cache
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Remove every cached entry
    pub fn flush(&self) -> Result<()> {
        self.cache.clear();
        Ok(())
    }

    /// Remove the raw entry and every encoded variant of one path
    ///
    /// `path` is the cache path, i.e. the request path after prefix
    /// stripping.
    pub fn invalidate(&self, path: &str) -> Result<()> {
        self.cache.remove_path(path);
        Ok(())
    }

    /// Serve one request
    ///
    /// The request body is ignored; only the head participates in file
    /// resolution.
    pub async fn serve<B>(&self, req: Request<B>) -> Result<Response<Body>> {
        let (parts, _body) = req.into_parts();
        self.serve_parts(parts).await
    }

    async fn serve_parts(&self, parts: Parts) -> Result<Response<Body>> {
        let path = self.cache_path(parts.uri.path());
        let encoding = Encoding::negotiate(&parts.headers);

        if !self.config.disable_cache {
            if let Some(encoding) = encoding {
                if let Some(entry) = self.cache.get(&CacheKey::encoded(&path, encoding)) {
                    return Ok(encoded_hit(&entry, encoding));
                }
            }
            if let Some(entry) = self.cache.get(&CacheKey::raw(&path)) {
                return match encoding {
                    Some(encoding) => self.lazy_compress(&path, &entry, encoding).await,
                    None => Ok(raw_hit(&entry)),
                };
            }
        }

        self.populate(parts, path, encoding).await
    }

    /// Strip the route prefix; the result is both the cache-key path and
    /// the path resolved by the responder
    fn cache_path(&self, request_path: &str) -> String {
        let stripped = request_path
            .strip_prefix(&self.config.route_prefix)
            .unwrap_or(request_path);
        if stripped.is_empty() {
            "/".to_string()
        } else {
            stripped.to_string()
        }
    }

    /// Derive, serve, and cache a compressed variant of a raw entry
    ///
    /// The raw entry is left untouched; the variant is a new entry under
    /// its own key. If compression fails the response degrades to the raw
    /// bytes with no `Content-Encoding`.
    async fn lazy_compress(
        &self,
        path: &str,
        entry: &CachedResponse,
        encoding: Encoding,
    ) -> Result<Response<Body>> {
        match compress(encoding, &entry.body).await {
            Ok(compressed) => {
                let mut headers = HeaderMap::new();
                replay_headers(&mut headers, &entry.headers, true);
                headers.remove(CONTENT_LENGTH);
                headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));

                self.cache.insert(
                    CacheKey::encoded(path, encoding),
                    CachedResponse::new(compressed.clone(), headers.clone()),
                );
                debug!(path, %encoding, size = compressed.len(), "cached compressed variant");

                let mut response = Response::new(full(compressed));
                *response.headers_mut() = headers;
                Ok(response)
            }
            Err(e) => {
                warn!(path, %encoding, error = %e, "compression failed, serving raw bytes");
                Ok(raw_hit(entry))
            }
        }
    }

    /// Fall through to the responder, capturing the raw bytes for the
    /// cache and compressing the client-visible stream when negotiated
    async fn populate(
        &self,
        parts: Parts,
        path: String,
        encoding: Option<Encoding>,
    ) -> Result<Response<Body>> {
        let method = parts.method.clone();
        let inner_req = self.responder_request(&parts, &path)?;
        let response = self.responder.respond(inner_req).await?;
        let (mut head, body) = response.into_parts();

        if let Some(encoding) = encoding {
            head.headers
                .insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
            // compressed size is unknown until the stream ends
            head.headers.remove(CONTENT_LENGTH);
        }

        let cacheable = !self.config.disable_cache
            && head.status == StatusCode::OK
            && method == Method::GET;

        // capture sees the raw bytes; the first compressed request for a
        // path seeds the raw cache, not an encoded entry
        let body = if cacheable {
            let store = StoreOnComplete::new(
                self.cache.clone(),
                CacheKey::raw(&path),
                head.headers.clone(),
            );
            boxed(CaptureBody::new(
                body,
                self.config.max_bytes_per_entry,
                store,
            ))
        } else {
            body
        };

        let body = match encoding {
            Some(encoding) => encode_body(encoding, body),
            None => body,
        };

        Ok(Response::from_parts(head, body))
    }

    fn responder_request(&self, parts: &Parts, path: &str) -> Result<ResponderRequest> {
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        let uri =
            Uri::try_from(path_and_query).map_err(|e| Error::InvalidRequest(e.to_string()))?;

        let mut req = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .body(Empty::new())?;
        *req.headers_mut() = parts.headers.clone();
        Ok(req)
    }
}

/// Serve a cached encoded variant: replay its headers and declare the
/// encoding
fn encoded_hit(entry: &CachedResponse, encoding: Encoding) -> Response<Body> {
    let mut response = Response::new(full(entry.body.clone()));
    replay_headers(response.headers_mut(), &entry.headers, false);
    response
        .headers_mut()
        .insert(CONTENT_ENCODING, HeaderValue::from_static(encoding.as_str()));
    response
}

/// Serve a cached raw entry: replay its headers minus any stale
/// `Content-Encoding` left over from a compressed first capture
fn raw_hit(entry: &CachedResponse) -> Response<Body> {
    let mut response = Response::new(full(entry.body.clone()));
    replay_headers(response.headers_mut(), &entry.headers, true);
    response
}

/// Overwrite-set `src` headers onto `dst`
///
/// With `raw` set, skips `Content-Encoding` and empty values: a raw entry
/// seeded by a compressed passthrough carries the encoding header of that
/// first response, which must not leak onto uncompressed replays.
fn replay_headers(dst: &mut HeaderMap, src: &HeaderMap, raw: bool) {
    for (name, value) in src {
        if raw && (name == &CONTENT_ENCODING || value.is_empty()) {
            continue;
        }
        dst.insert(name.clone(), value.clone());
    }
}

/// Builder for [`FileServer`]
#[derive(Debug)]
pub struct FileServerBuilder {
    config: FileServerConfig,
    responder: Option<Arc<dyn StaticResponder>>,
}

impl FileServerBuilder {
    /// Turn off all cache lookup and store behavior
    pub fn disable_cache(mut self, disable: bool) -> Self {
        self.config.disable_cache = disable;
        self
    }

    /// Set the per-entry cache ceiling in bytes (default 10 MB)
    pub fn max_bytes_per_entry(mut self, max_bytes: usize) -> Self {
        self.config.max_bytes_per_entry = max_bytes;
        self
    }

    /// Set the eviction sweeper interval and entry age
    pub fn sweeper(mut self, sweeper: SweeperConfig) -> Self {
        self.config.sweeper = sweeper;
        self
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: FileServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Substitute the directory responder
    pub fn responder(mut self, responder: Arc<dyn StaticResponder>) -> Self {
        self.responder = Some(responder);
        self
    }

    /// Build the server and start its eviction sweeper
    pub fn build(self) -> Result<FileServer> {
        self.config.validate()?;
        let cache = ResponseCache::with_sweeper(self.config.sweeper);
        let responder = self
            .responder
            .unwrap_or_else(|| Arc::new(DirResponder::new(&self.config.root_dir)));
        Ok(FileServer {
            config: Arc::new(self.config),
            cache,
            responder,
        })
    }
}
