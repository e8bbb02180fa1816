use std::sync::RwLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use bytes::Bytes;
use http_body_util::Full;
use hyper::http::uri::PathAndQuery;
use hyper::{HeaderMap, Method, Request, Uri, header};
use tokio::time::{Duration, timeout};
use tracing::debug;

use crate::common::compression::{
    add_accept_encoding, read_body, response_encodings, strip_encoding_headers,
};
use crate::common::http::{HyperClient, build_hyper_client};
use crate::config::DavConfig;
use crate::error::{DavError, Result};
use crate::webdav::types::{DavResponse, Depth, ResponseBody};
use crate::webdav::xml::{XmlElement, has_xml_declaration};

/// Target of the request/response dumps emitted when debugging is enabled.
pub const WIRE_LOG_TARGET: &str = "groupware_dav::wire";

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// One-exchange-at-a-time HTTP transport bound to a DAV base URI.
///
/// Every call performs exactly one request and never retries. Paths may be
/// given relative to the base (`calendars/jdoe/`) or as server-absolute paths
/// that already carry the base path (`/dav/calendars/jdoe/`); both resolve to
/// the same URI.
pub struct Transport {
    base: Uri,
    root_path: String,
    client: HyperClient,
    auth_header: Option<header::HeaderValue>,
    timeout: Duration,
    debug: bool,
    last_headers: RwLock<HeaderMap>,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base", &self.base)
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Create a transport from a **base URL** and optional **Basic** credentials.
    ///
    /// The base may be `https://` **or** `http://`.
    pub fn new(base_url: &str, basic_user: Option<&str>, basic_pass: Option<&str>) -> Result<Self> {
        let base: Uri = base_url.parse()?;
        if base.scheme().is_none() || base.authority().is_none() {
            return Err(DavError::InvalidUri(format!(
                "base URI must be absolute: {base_url}"
            )));
        }

        let auth_header = if let (Some(u), Some(p)) = (basic_user, basic_pass) {
            let token = format!("{}:{}", u, p);
            let val = format!("Basic {}", B64.encode(token));
            Some(header::HeaderValue::from_str(&val)?)
        } else {
            None
        };

        let mut root_path = base.path().to_string();
        if !root_path.ends_with('/') {
            root_path.push('/');
        }

        Ok(Self {
            base,
            root_path,
            client: build_hyper_client(),
            auth_header,
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            last_headers: RwLock::new(HeaderMap::new()),
        })
    }

    pub fn from_config(config: &DavConfig) -> Result<Self> {
        let mut transport = Self::new(
            &config.uri,
            Some(config.username.as_str()),
            Some(config.password.as_str()),
        )?;
        transport.set_timeout(Duration::from_secs(config.timeout_secs));
        transport.set_debug(config.debug);
        Ok(transport)
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Toggle request/response dumps on [`WIRE_LOG_TARGET`].
    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn base(&self) -> &Uri {
        &self.base
    }

    /// Path component of the base URI, always ending in `/`.
    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Headers of the last successful exchange; empty after a failure.
    pub fn last_response_headers(&self) -> HeaderMap {
        self.last_headers
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    // ----------- Path handling -----------

    /// Strip the configured root prefix from a server-returned href.
    ///
    /// Absolute URLs are reduced to their path first. The root itself, with or
    /// without a trailing slash, becomes `""`. Hrefs outside the root are
    /// returned unchanged.
    pub fn relativize(&self, href: &str) -> String {
        let path = if href.starts_with("http://") || href.starts_with("https://") {
            match href.parse::<Uri>() {
                Ok(uri) => uri.path().to_string(),
                Err(_) => href.to_string(),
            }
        } else {
            href.to_string()
        };

        if self.is_root(&path) {
            return String::new();
        }
        match path.strip_prefix(self.root_path.as_str()) {
            Some(rest) => rest.to_string(),
            None => path,
        }
    }

    /// Server-absolute path (root prefix included) for an href in either form.
    pub fn absolutize(&self, href: &str) -> String {
        format!("{}{}", self.root_path, self.relative_part(href))
    }

    /// True for the root path with or without its trailing slash.
    fn is_root(&self, path: &str) -> bool {
        path == self.root_path || path == self.root_path.trim_end_matches('/')
    }

    fn relative_part<'a>(&self, path: &'a str) -> &'a str {
        if self.is_root(path) {
            return "";
        }
        let rest = if path.starts_with('/') {
            path.strip_prefix(self.root_path.as_str()).unwrap_or(path)
        } else {
            path
        };
        rest.trim_start_matches('/')
    }

    /// Resolve `path` against the base URI without duplicating the root prefix.
    pub fn build_uri(&self, path: &str) -> Result<Uri> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(path.parse::<Uri>()?);
        }

        let (path_only, query) = if let Some((p, q)) = path.split_once('?') {
            (p, Some(q))
        } else {
            (path, None)
        };

        let relative = self.relative_part(path_only);
        let combined = if relative.is_empty() {
            self.base.path().to_string()
        } else {
            format!("{}{}", self.root_path, relative)
        };

        let path_and_query: PathAndQuery = if let Some(q) = query {
            format!("{}?{}", combined, q).parse()?
        } else {
            combined.parse()?
        };

        let mut parts = self.base.clone().into_parts();
        parts.path_and_query = Some(path_and_query);
        Ok(Uri::from_parts(parts)?)
    }

    // ----------- Exchange -----------

    /// Execute one request and return status, headers and body.
    ///
    /// The timeout covers the whole exchange, body download included. A body
    /// without an explicit `Content-Type` is sent as XML. Non-2xx statuses
    /// fail with [`DavError::Status`]. Bodies starting with an XML declaration
    /// are parsed, everything else is returned opaque.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        mut headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<DavResponse> {
        self.set_last_headers(HeaderMap::new());

        let uri = self.build_uri(path)?;

        if body.is_some() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                header::HeaderValue::from_static(XML_CONTENT_TYPE),
            );
        }
        add_accept_encoding(&mut headers);

        if self.debug {
            debug!(
                target: WIRE_LOG_TARGET,
                "C: {method}: {uri}\n{}",
                render_exchange(&headers, body.as_deref().unwrap_or_default())
            );
        }

        let mut req_builder = Request::builder().method(method.clone()).uri(uri.clone());
        if let Some(auth) = &self.auth_header {
            req_builder = req_builder.header(header::AUTHORIZATION, auth);
        }
        for (k, v) in headers.iter() {
            req_builder = req_builder.header(k, v);
        }
        let req = req_builder.body(Full::new(body.unwrap_or_default()))?;

        let (parts, raw) = timeout(self.timeout, async {
            let resp = self.client.request(req).await?;
            let encodings = response_encodings(resp.headers());
            let (mut parts, incoming) = resp.into_parts();
            let raw = read_body(incoming, &encodings).await?;
            strip_encoding_headers(&mut parts.headers, &encodings);
            Ok::<_, DavError>((parts, raw))
        })
        .await
        .map_err(|_| DavError::Timeout(self.timeout))??;

        if self.debug {
            debug!(
                target: WIRE_LOG_TARGET,
                "S: [{}]\n{}",
                parts.status.as_u16(),
                render_exchange(&parts.headers, &raw)
            );
        }

        if !parts.status.is_success() {
            return Err(DavError::Status {
                method,
                uri: uri.to_string(),
                status: parts.status,
            });
        }

        self.set_last_headers(parts.headers.clone());

        let body = if has_xml_declaration(&raw) {
            ResponseBody::Xml(XmlElement::parse(&raw)?)
        } else {
            ResponseBody::Opaque(raw)
        };

        Ok(DavResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    fn set_last_headers(&self, headers: HeaderMap) {
        if let Ok(mut guard) = self.last_headers.write() {
            *guard = headers;
        }
    }

    // ----------- HTTP/WebDAV Verbs -----------

    /// Send a WebDAV `PROPFIND` with `Depth` and `Prefer: return-minimal`.
    pub async fn propfind(&self, path: &str, depth: Depth, xml: &XmlElement) -> Result<DavResponse> {
        self.execute(
            Method::from_bytes(b"PROPFIND")?,
            path,
            minimal_headers(Some(depth)),
            Some(Bytes::from(xml.to_document())),
        )
        .await
    }

    /// Send a WebDAV `REPORT` with `Depth` and `Prefer: return-minimal`.
    pub async fn report(&self, path: &str, depth: Depth, xml: &XmlElement) -> Result<DavResponse> {
        self.execute(
            Method::from_bytes(b"REPORT")?,
            path,
            minimal_headers(Some(depth)),
            Some(Bytes::from(xml.to_document())),
        )
        .await
    }

    pub async fn proppatch(&self, path: &str, xml: &XmlElement) -> Result<DavResponse> {
        self.execute(
            Method::from_bytes(b"PROPPATCH")?,
            path,
            HeaderMap::new(),
            Some(Bytes::from(xml.to_document())),
        )
        .await
    }

    /// Send an extended `MKCOL` (RFC 5689) carrying the initial properties.
    pub async fn mkcol(&self, path: &str, xml: &XmlElement) -> Result<DavResponse> {
        self.execute(
            Method::from_bytes(b"MKCOL")?,
            path,
            HeaderMap::new(),
            Some(Bytes::from(xml.to_document())),
        )
        .await
    }

    /// Send a `PUT` with an explicit content type.
    pub async fn put(&self, path: &str, content_type: &str, data: Bytes) -> Result<DavResponse> {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, header::HeaderValue::from_str(content_type)?);
        self.execute(Method::PUT, path, h, Some(data)).await
    }

    pub async fn get(&self, path: &str) -> Result<DavResponse> {
        self.execute(Method::GET, path, HeaderMap::new(), None).await
    }

    /// Send a `POST` with an explicit content type.
    pub async fn post(&self, path: &str, content_type: &str, data: Bytes) -> Result<DavResponse> {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, header::HeaderValue::from_str(content_type)?);
        self.execute(Method::POST, path, h, Some(data)).await
    }

    pub async fn delete(&self, path: &str) -> Result<DavResponse> {
        self.execute(Method::DELETE, path, HeaderMap::new(), None)
            .await
    }

    pub async fn options(&self, path: &str) -> Result<DavResponse> {
        self.execute(Method::OPTIONS, path, HeaderMap::new(), None)
            .await
    }
}

/// `Depth` (when given) plus `Prefer: return-minimal`.
fn minimal_headers(depth: Option<Depth>) -> HeaderMap {
    let mut h = HeaderMap::new();
    if let Some(depth) = depth {
        h.insert("Depth", header::HeaderValue::from_static(depth.as_str()));
    }
    h.insert("Prefer", header::HeaderValue::from_static("return-minimal"));
    h
}

/// Human-readable dump of one side of an exchange: headers, a blank line and
/// the body (pretty-printed when it is XML).
pub fn render_exchange(headers: &HeaderMap, body: &[u8]) -> String {
    let mut out = String::new();
    for name in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .map(|v| v.to_str().unwrap_or("<binary>"))
            .collect();
        out.push_str(name.as_str());
        out.push_str(": ");
        if name == header::AUTHORIZATION {
            out.push_str("[REDACTED]");
        } else {
            out.push_str(&values.join("\n\t"));
        }
        out.push('\n');
    }

    if body.is_empty() {
        return out;
    }

    out.push('\n');
    let pretty = if has_xml_declaration(body) {
        XmlElement::parse(body).ok().map(|root| root.to_pretty_string())
    } else {
        None
    };
    match pretty {
        Some(xml) => out.push_str(&xml),
        None => out.push_str(&String::from_utf8_lossy(body)),
    }
    out
}
