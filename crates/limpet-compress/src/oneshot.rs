//! One-shot compression of complete payloads

use async_compression::tokio::write::{
    BrotliDecoder, BrotliEncoder, DeflateDecoder, DeflateEncoder, GzipDecoder, GzipEncoder,
    ZstdDecoder, ZstdEncoder,
};
use bytes::Bytes;
use limpet_core::Encoding;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Compress a complete payload with the given encoding
pub async fn compress(encoding: Encoding, data: &[u8]) -> io::Result<Bytes> {
    let out = match encoding {
        Encoding::Gzip => drive(GzipEncoder::new(Vec::new()), data).await?,
        Encoding::Brotli => drive(BrotliEncoder::new(Vec::new()), data).await?,
        Encoding::Zstd => drive(ZstdEncoder::new(Vec::new()), data).await?,
        Encoding::Deflate => drive(DeflateEncoder::new(Vec::new()), data).await?,
    };
    Ok(Bytes::from(out))
}

/// Decompress a complete payload with the given encoding
pub async fn decompress(encoding: Encoding, data: &[u8]) -> io::Result<Bytes> {
    let out = match encoding {
        Encoding::Gzip => drive(GzipDecoder::new(Vec::new()), data).await?,
        Encoding::Brotli => drive(BrotliDecoder::new(Vec::new()), data).await?,
        Encoding::Zstd => drive(ZstdDecoder::new(Vec::new()), data).await?,
        Encoding::Deflate => drive(DeflateDecoder::new(Vec::new()), data).await?,
    };
    Ok(Bytes::from(out))
}

/// Feed `data` through a write-side codec and collect its output
async fn drive<W>(mut codec: W, data: &[u8]) -> io::Result<Vec<u8>>
where
    W: AsyncWrite + Unpin + IntoInner,
{
    codec.write_all(data).await?;
    codec.shutdown().await?;
    Ok(codec.into_inner())
}

/// Access to the codec's inner `Vec<u8>` sink once it is finished
trait IntoInner {
    fn into_inner(self) -> Vec<u8>;
}

macro_rules! impl_into_inner {
    ($($codec:ident),* $(,)?) => {
        $(
            impl IntoInner for $codec<Vec<u8>> {
                fn into_inner(self) -> Vec<u8> {
                    self.into_inner()
                }
            }
        )*
    };
}

impl_into_inner!(
    GzipEncoder,
    BrotliEncoder,
    ZstdEncoder,
    DeflateEncoder,
    GzipDecoder,
    BrotliDecoder,
    ZstdDecoder,
    DeflateDecoder,
);
