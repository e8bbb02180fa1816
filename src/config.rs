//! Client configuration.

use serde::{Deserialize, Serialize};

/// Connection settings for one DAV account.
#[derive(Clone, Serialize, Deserialize)]
pub struct DavConfig {
    /// Base URI of the DAV service, e.g. `https://dav.example/dav/`.
    pub uri: String,
    pub username: String,
    /// Password (excluded from serialization to prevent leaks)
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Per-request timeout in seconds (default: 20)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Dump every request/response exchange at debug level (default: false)
    #[serde(default)]
    pub debug: bool,
}

impl DavConfig {
    pub fn new(uri: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            username: username.into(),
            password: password.into(),
            timeout_secs: default_timeout(),
            debug: false,
        }
    }
}

impl std::fmt::Debug for DavConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DavConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("debug", &self.debug)
            .finish()
    }
}

const fn default_timeout() -> u64 {
    20
}
