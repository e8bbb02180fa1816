use bytes::Bytes;
use hyper::{HeaderMap, StatusCode};

use crate::webdav::xml::XmlElement;

/// WebDAV Depth
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Depth {
    Zero,
    One,
    Infinity,
}
impl Depth {
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Zero => "0",
            Depth::One => "1",
            Depth::Infinity => "infinity",
        }
    }
}

/// Body of a successful exchange.
///
/// Only bodies that start with an XML declaration are parsed; anything else
/// (empty bodies of `PUT`/`DELETE`, HTML error pages, iCalendar payloads) is
/// passed through untouched.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Xml(XmlElement),
    Opaque(Bytes),
}

impl ResponseBody {
    pub fn xml(&self) -> Option<&XmlElement> {
        match self {
            ResponseBody::Xml(root) => Some(root),
            ResponseBody::Opaque(_) => None,
        }
    }

    /// All `response` elements of a multistatus body, in document order.
    pub fn responses(&self) -> Vec<&XmlElement> {
        self.xml()
            .map(|root| root.descendants("response"))
            .unwrap_or_default()
    }
}

/// Outcome of one HTTP exchange: status, headers and (possibly parsed) body.
#[derive(Debug, Clone)]
pub struct DavResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: ResponseBody,
}

impl DavResponse {
    /// The `ETag` header with one pair of surrounding double quotes removed.
    ///
    /// Weak validators (`W/"..."`) are returned unchanged.
    pub fn etag(&self) -> Option<String> {
        etag_from_headers(&self.headers)
    }
}

/// Extract the `ETag` from a header map, stripping one pair of surrounding quotes.
pub fn etag_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(hyper::header::ETAG)
        .and_then(|v| v.to_str().ok())
        .map(|s| strip_etag_quotes(s).to_string())
}

pub fn strip_etag_quotes(etag: &str) -> &str {
    etag.strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(etag)
}
