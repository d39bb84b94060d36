//! Builder pattern for client configuration.
//!
//! Provides a fluent API for configuring and creating [`Client`]
//! instances.
//!
//! # Example
//!
//! ```no_run
//! use flowthings::Client;
//!
//! # fn example() -> flowthings::Result<()> {
//! let client = Client::builder()
//!     .account("alice")
//!     .token("s3cr3t")
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::config::{ApiOptions, Credentials, WsOptions};
use crate::error::{Error, Result};
use crate::http::{HttpTransport, ReqwestTransport};

use super::core::Client;

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Default)]
pub struct ClientBuilder {
    /// Account identifier.
    account: Option<String>,
    /// Auth token.
    token: Option<String>,
    /// REST endpoint options.
    api: ApiOptions,
    /// WebSocket endpoint options.
    ws: WsOptions,
    /// Transport override, mainly for tests.
    transport: Option<Arc<dyn HttpTransport>>,
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a new builder with platform-default endpoints.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the account identifier.
    #[inline]
    #[must_use]
    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Sets the auth token.
    #[inline]
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets both account and token from existing credentials.
    #[inline]
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.account = Some(credentials.account);
        self.token = Some(credentials.token);
        self
    }

    /// Replaces the REST endpoint options.
    #[inline]
    #[must_use]
    pub fn api_options(mut self, options: ApiOptions) -> Self {
        self.api = options;
        self
    }

    /// Replaces the WebSocket endpoint options.
    #[inline]
    #[must_use]
    pub fn ws_options(mut self, options: WsOptions) -> Self {
        self.ws = options;
        self
    }

    /// Sets the REST hostname.
    #[inline]
    #[must_use]
    pub fn api_host(mut self, host: impl Into<String>) -> Self {
        self.api.host = host.into();
        self
    }

    /// Sets the WebSocket gateway hostname.
    #[inline]
    #[must_use]
    pub fn ws_host(mut self, host: impl Into<String>) -> Self {
        self.ws.host = host.into();
        self
    }

    /// Enables or disables TLS for both endpoints.
    #[inline]
    #[must_use]
    pub fn secure(mut self, secure: bool) -> Self {
        self.api.secure = secure;
        self.ws.secure = secure;
        self
    }

    /// Overrides the HTTP transport.
    #[inline]
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if account or token is not set
    /// - [`Error::Http`] if the default transport cannot be constructed
    pub fn build(self) -> Result<Client> {
        let account = self
            .account
            .ok_or_else(|| Error::config("account is required"))?;
        let token = self.token.ok_or_else(|| Error::config("token is required"))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Client::assemble(
            Credentials::new(account, token),
            self.api,
            self.ws,
            transport,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
