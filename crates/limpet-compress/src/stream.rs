//! Streaming response-body compression
//!
//! The body's data frames are exposed as an async reader, piped through the
//! matching codec, and re-emitted as a body. Compressed bytes are produced
//! as the underlying body yields, so the client starts receiving output
//! before the file has been fully read; end of the underlying stream
//! finalizes the compressed stream.

use async_compression::tokio::bufread::{
    BrotliEncoder, DeflateEncoder, GzipEncoder, ZstdEncoder,
};
use futures::StreamExt;
use http_body::Frame;
use http_body_util::{BodyExt, BodyStream, StreamBody};
use limpet_core::{Body, BoxError, Encoding};
use std::io;
use tokio::io::AsyncRead;
use tokio_util::io::{ReaderStream, StreamReader};

/// Wrap a response body in a streaming encoder for `encoding`
pub fn encode_body(encoding: Encoding, body: Body) -> Body {
    // Non-data frames carry nothing a static file response needs; they are
    // flattened away by the reader conversion.
    let data = BodyStream::new(body).map(|frame| match frame {
        Ok(frame) => Ok(frame.into_data().unwrap_or_default()),
        Err(e) => Err(io::Error::other(e)),
    });
    let reader = StreamReader::new(data);

    let encoded: Box<dyn AsyncRead + Send + Unpin> = match encoding {
        Encoding::Gzip => Box::new(GzipEncoder::new(reader)),
        Encoding::Brotli => Box::new(BrotliEncoder::new(reader)),
        Encoding::Zstd => Box::new(ZstdEncoder::new(reader)),
        Encoding::Deflate => Box::new(DeflateEncoder::new(reader)),
    };

    let frames =
        ReaderStream::new(encoded).map(|chunk| chunk.map(Frame::data).map_err(BoxError::from));
    StreamBody::new(frames).boxed_unsync()
}
