//! Transparent decoding of compressed response bodies.
//!
//! The transport advertises `br`, `zstd` and `gzip`; whatever the server picks is
//! undone here before the body reaches the XML layer. Request bodies are always
//! sent as identity.

use async_compression::tokio::bufread::{BrotliDecoder, GzipDecoder, ZstdDecoder};
use bytes::Bytes;
use futures_util::TryStreamExt;
use http_body_util::BodyStream;
use hyper::body::Incoming;
use hyper::{HeaderMap, header};
use tokio::io::{AsyncBufRead, AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

use crate::error::{DavError, Result};

const ACCEPTED_ENCODINGS: &str = "br, zstd, gzip";

/// Response content codings understood by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Br,
    Gzip,
    Zstd,
}

impl ContentEncoding {
    fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "br" => Some(Self::Br),
            "gzip" | "x-gzip" => Some(Self::Gzip),
            "zstd" | "zst" => Some(Self::Zstd),
            _ => None,
        }
    }
}

/// Codings applied to a response, in the order the server applied them.
///
/// `identity` and unknown tokens are skipped.
pub fn response_encodings(headers: &HeaderMap) -> Vec<ContentEncoding> {
    headers
        .get_all(header::CONTENT_ENCODING)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(','))
        .filter_map(ContentEncoding::from_token)
        .collect()
}

/// Advertise the supported codings unless the caller set its own preference.
pub fn add_accept_encoding(headers: &mut HeaderMap) {
    if !headers.contains_key(header::ACCEPT_ENCODING) {
        headers.insert(
            header::ACCEPT_ENCODING,
            header::HeaderValue::from_static(ACCEPTED_ENCODINGS),
        );
    }
}

/// Aggregate a response body, undoing `encodings` (outermost last).
pub async fn read_body(body: Incoming, encodings: &[ContentEncoding]) -> Result<Bytes> {
    let stream = BodyStream::new(body)
        .map_ok(|frame| frame.into_data().unwrap_or_default())
        .map_err(std::io::Error::other);
    let mut reader: Box<dyn AsyncBufRead + Unpin + Send> =
        Box::new(BufReader::new(StreamReader::new(stream)));

    for encoding in encodings.iter().rev() {
        reader = match encoding {
            ContentEncoding::Br => Box::new(BufReader::new(BrotliDecoder::new(reader))),
            ContentEncoding::Gzip => Box::new(BufReader::new(GzipDecoder::new(reader))),
            ContentEncoding::Zstd => Box::new(BufReader::new(ZstdDecoder::new(reader))),
        };
    }

    let mut out = Vec::with_capacity(16 * 1024);
    reader.read_to_end(&mut out).await.map_err(DavError::Body)?;
    Ok(Bytes::from(out))
}

/// Drop the headers describing the wire encoding once the body has been decoded.
pub fn strip_encoding_headers(headers: &mut HeaderMap, encodings: &[ContentEncoding]) {
    if encodings.is_empty() {
        return;
    }
    headers.remove(header::CONTENT_ENCODING);
    headers.remove(header::CONTENT_LENGTH);
}
