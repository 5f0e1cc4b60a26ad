//! Response body alias and constructors
//!
//! Responses cross several decorators (capture, streaming compression), so
//! every crate boundary uses one boxed body type instead of threading body
//! generics through the whole stack.

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};

/// Boxed error type used by [`Body`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body type used for all responses
pub type Body = UnsyncBoxBody<Bytes, BoxError>;

/// Build a body from a complete byte payload
pub fn full(data: impl Into<Bytes>) -> Body {
    Full::new(data.into()).map_err(Into::into).boxed_unsync()
}

/// Build an empty body
pub fn empty() -> Body {
    Empty::new().map_err(Into::into).boxed_unsync()
}

/// Box an arbitrary body into the common [`Body`] type
pub fn boxed<B>(body: B) -> Body
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed_unsync()
}
