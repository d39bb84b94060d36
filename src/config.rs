//! Client configuration: credentials and endpoint options.
//!
//! Provides a type-safe interface for configuring the REST and WebSocket
//! endpoints, plus the URL and header construction shared by the request
//! gateway and the session negotiator.
//!
//! # Example
//!
//! ```
//! use flowthings::config::{ApiOptions, WsOptions};
//!
//! let api = ApiOptions::new()
//!     .with_host("api.example.test")
//!     .with_secure(false);
//!
//! assert_eq!(api.base_url("alice"), "http://api.example.test/v0.1/alice");
//!
//! let ws = WsOptions::new();
//! assert_eq!(ws.session_url(), "https://ws.flowthings.io/session");
//! ```

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the account identifier.
pub const HEADER_ACCOUNT: &str = "X-Auth-Account";

/// Header carrying the auth token.
pub const HEADER_TOKEN: &str = "X-Auth-Token";

// ============================================================================
// Credentials
// ============================================================================

/// Account credentials attached to every request and handshake.
///
/// Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account identifier.
    pub account: String,
    /// Auth token.
    pub token: String,
}

impl Credentials {
    /// Creates credentials from an account identifier and token.
    #[inline]
    #[must_use]
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            token: token.into(),
        }
    }

    /// Returns the auth headers as name/value pairs.
    #[inline]
    #[must_use]
    pub fn headers(&self) -> [(&'static str, &str); 2] {
        [
            (HEADER_ACCOUNT, self.account.as_str()),
            (HEADER_TOKEN, self.token.as_str()),
        ]
    }
}

// ============================================================================
// ApiOptions
// ============================================================================

/// REST endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiOptions {
    /// API hostname.
    pub host: String,
    /// API version, appearing as `/v<version>` in the URL.
    pub version: String,
    /// Use TLS (`https`) when `true`.
    pub secure: bool,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            host: "api.flowthings.io".to_string(),
            version: "0.1".to_string(),
            secure: true,
        }
    }
}

impl ApiOptions {
    /// Creates options with the platform defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API hostname.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the API version.
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Enables or disables TLS.
    #[inline]
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Builds the account-scoped base URL, without a resource path.
    ///
    /// Shape: `<scheme>://<host>/v<version>/<account>`.
    #[must_use]
    pub fn base_url(&self, account: &str) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}/v{}/{account}", self.host, self.version)
    }
}

// ============================================================================
// WsOptions
// ============================================================================

/// WebSocket endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WsOptions {
    /// WebSocket gateway hostname.
    pub host: String,
    /// Use TLS (`https` handshake, `wss` socket) when `true`.
    pub secure: bool,
}

impl Default for WsOptions {
    fn default() -> Self {
        Self {
            host: "ws.flowthings.io".to_string(),
            secure: true,
        }
    }
}

impl WsOptions {
    /// Creates options with the platform defaults.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the gateway hostname.
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Enables or disables TLS.
    #[inline]
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Builds the handshake URL: `<http(s)>://<host>/session`.
    #[must_use]
    pub fn session_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{scheme}://{}/session", self.host)
    }

    /// Builds the socket URL for a negotiated session:
    /// `<ws(s)>://<host>/session/<id>/ws`.
    #[must_use]
    pub fn socket_url(&self, session_id: &str) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{scheme}://{}/session/{session_id}/ws", self.host)
    }
}

// ============================================================================
// Tests
// ============================================================================
