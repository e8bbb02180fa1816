//! Error type shared by every layer of the client.

use hyper::{Method, StatusCode};
use thiserror::Error;
use tokio::time::Duration;

/// Errors surfaced by the DAV client.
///
/// A well-formed response that lacks an expected property (principal,
/// home-set, folder) is *not* an error: those operations return `Ok(None)`.
#[derive(Debug, Error)]
pub enum DavError {
    /// The server answered with a non-2xx status.
    #[error("{method} {uri} failed with status {status}")]
    Status {
        method: Method,
        uri: String,
        status: StatusCode,
    },

    #[error("connection failed: {0}")]
    Connection(#[from] hyper_util::client::legacy::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read response body: {0}")]
    Body(#[source] std::io::Error),

    /// The response declared an XML body that could not be parsed.
    #[error("malformed XML in response: {0}")]
    Parse(String),

    #[error("unknown component kind: {0}")]
    UnknownComponent(String),

    #[error("cannot PUT an empty object at {0}")]
    EmptyObject(String),

    #[error("invalid URI: {0}")]
    InvalidUri(String),

    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] hyper::header::InvalidHeaderValue),

    #[error("invalid request: {0}")]
    Request(#[from] hyper::http::Error),
}

impl DavError {
    /// True for failures of the HTTP exchange itself (status, connection,
    /// timeout, body transfer). These are never retried by this crate.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Status { .. } | Self::Connection(_) | Self::Timeout(_) | Self::Body(_)
        )
    }

    /// HTTP status of a [`DavError::Status`] failure.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<hyper::http::uri::InvalidUri> for DavError {
    fn from(err: hyper::http::uri::InvalidUri) -> Self {
        Self::InvalidUri(err.to_string())
    }
}

impl From<hyper::http::uri::InvalidUriParts> for DavError {
    fn from(err: hyper::http::uri::InvalidUriParts) -> Self {
        Self::InvalidUri(err.to_string())
    }
}

impl From<hyper::http::method::InvalidMethod> for DavError {
    fn from(err: hyper::http::method::InvalidMethod) -> Self {
        Self::Request(err.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = DavError> = std::result::Result<T, E>;
