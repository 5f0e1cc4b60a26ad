//! Response capture decorator
//!
//! Wraps a response body so every data frame is forwarded to the client
//! unchanged while being mirrored into a bounded buffer. Capture state is
//! per-request and dies with the body. When the body ends cleanly and the
//! ceiling was never crossed, the captured bytes are committed to the cache
//! under the request's raw key; a body dropped mid-stream commits nothing.

use bytes::{Bytes, BytesMut};
use http::HeaderMap;
use http_body::{Frame, SizeHint};
use limpet_cache::{CacheKey, CachedResponse, ResponseCache};
use limpet_core::BoxError;
use pin_project::pin_project;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tracing::debug;

/// Deferred cache store, run once at end-of-stream
pub(crate) struct StoreOnComplete {
    cache: ResponseCache,
    key: CacheKey,
    headers: HeaderMap,
}

impl StoreOnComplete {
    pub(crate) fn new(cache: ResponseCache, key: CacheKey, headers: HeaderMap) -> Self {
        Self { cache, key, headers }
    }

    fn commit(self, body: Bytes) {
        debug!(path = self.key.path(), size = body.len(), "cached response");
        self.cache
            .insert(self.key, CachedResponse::new(body, self.headers));
    }
}

/// Body decorator that tees data frames into a bounded capture buffer
#[pin_project]
pub(crate) struct CaptureBody<B> {
    #[pin]
    inner: B,
    buf: BytesMut,
    ceiling: usize,
    overflow: bool,
    store: Option<StoreOnComplete>,
}

impl<B> CaptureBody<B> {
    pub(crate) fn new(inner: B, ceiling: usize, store: StoreOnComplete) -> Self {
        Self {
            inner,
            buf: BytesMut::new(),
            ceiling,
            overflow: false,
            store: Some(store),
        }
    }
}

impl<B> http_body::Body for CaptureBody<B>
where
    B: http_body::Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        match ready!(this.inner.poll_frame(cx)) {
            Some(Ok(frame)) => {
                if let Some(data) = frame.data_ref() {
                    if !*this.overflow {
                        if this.buf.len() + data.len() <= *this.ceiling {
                            this.buf.extend_from_slice(data);
                        } else {
                            // the flag is sticky; mirroring never resumes
                            *this.overflow = true;
                            *this.buf = BytesMut::new();
                        }
                    }
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Some(Err(e)) => Poll::Ready(Some(Err(e.into()))),
            None => {
                if let Some(store) = this.store.take() {
                    if !*this.overflow {
                        store.commit(this.buf.split().freeze());
                    }
                }
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
