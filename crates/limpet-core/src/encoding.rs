//! Content-encoding negotiation
//!
//! Negotiation is deliberately strict: the `Accept-Encoding` value must be
//! exactly one of the four recognized tokens. Quality lists and unknown
//! tokens fall back to uncompressed handling.

use http::header::ACCEPT_ENCODING;
use http::HeaderMap;
use std::fmt;

/// Compression encoding recognized by the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Gzip compression
    Gzip,
    /// Brotli compression
    Brotli,
    /// Zstd compression
    Zstd,
    /// Raw-deflate compression
    Deflate,
}

impl Encoding {
    /// The fixed set of recognized encodings, used when invalidating every
    /// variant of a path.
    pub const ALL: [Encoding; 4] = [
        Encoding::Gzip,
        Encoding::Brotli,
        Encoding::Zstd,
        Encoding::Deflate,
    ];

    /// The `Content-Encoding` header value for this encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            Encoding::Gzip => "gzip",
            Encoding::Brotli => "br",
            Encoding::Zstd => "zstd",
            Encoding::Deflate => "deflate",
        }
    }

    /// Parse a single `Accept-Encoding` token
    ///
    /// The whole (trimmed) value must equal one of the four recognized
    /// tokens. A browser-style list such as `gzip, deflate, br` does not
    /// match and means "uncompressed".
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "gzip" => Some(Encoding::Gzip),
            "br" => Some(Encoding::Brotli),
            "zstd" => Some(Encoding::Zstd),
            "deflate" => Some(Encoding::Deflate),
            _ => None,
        }
    }

    /// Negotiate an encoding from request headers
    pub fn negotiate(headers: &HeaderMap) -> Option<Self> {
        let accept = headers.get(ACCEPT_ENCODING)?;
        Self::from_token(accept.to_str().ok()?)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
