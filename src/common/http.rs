use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use tracing::warn;

/// Pooled Hyper client used by the DAV transport.
pub type HyperClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Build a Hyper client with HTTP/2 and a TLS connector that prefers native roots
/// but falls back to the bundled WebPKI store.
///
/// Plain `http://` endpoints are accepted as well.
pub fn build_hyper_client() -> HyperClient {
    let https_builder = HttpsConnectorBuilder::new()
        .with_native_roots()
        .unwrap_or_else(|err| {
            warn!("native TLS roots unavailable, using webpki roots: {err}");
            HttpsConnectorBuilder::new().with_webpki_roots()
        });

    let https = https_builder
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build();

    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(8)
        .build::<_, Full<Bytes>>(https)
}
