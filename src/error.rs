//! Error types for the flowthings client.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use flowthings::{Result, Client};
//!
//! async fn example(client: &Client) -> Result<()> {
//!     let flow = client.flow().read("f554b53a", &Default::default()).await?;
//!     println!("{flow}");
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionClosed`], [`Error::Handshake`] |
//! | Protocol | [`Error::Protocol`], [`Error::Reply`] |
//! | Transport | [`Error::Status`], [`Error::Http`] |
//! | External | [`Error::Json`], [`Error::WebSocket`], [`Error::Url`] |

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use serde_json::Value;
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when client configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument.
    ///
    /// Returned when an operation is called with arguments it cannot use,
    /// e.g. `update` on a model without an `id`.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Session handshake failed.
    ///
    /// Returned when the POST to the session endpoint fails or the
    /// response carries no session id.
    #[error("Handshake failed: {message}")]
    Handshake {
        /// Description of the handshake failure.
        message: String,
    },

    /// WebSocket connection failed.
    ///
    /// Returned when the socket to the session endpoint cannot be opened.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Connection closed while an operation was outstanding.
    ///
    /// Returned to every waiter whose pending reply or subscribe
    /// acknowledgment was discarded by connection cleanup.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected frame shape.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Reply envelope with `head.ok == false`.
    ///
    /// Carries the full envelope, not just the body, so callers can
    /// inspect `head.status` and `head.references`.
    #[error("Reply rejected by server")]
    Reply {
        /// The complete reply envelope as received.
        envelope: Value,
    },

    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP response with a non-success status code.
    #[error("HTTP status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The response body, if it could be read.
        body: Value,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),

    /// URL construction error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a handshake error.
    #[inline]
    pub fn handshake(message: impl Into<String>) -> Self {
        Self::Handshake {
            message: message.into(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a reply error from a full envelope.
    #[inline]
    pub fn reply(envelope: Value) -> Self {
        Self::Reply { envelope }
    }

    /// Creates an HTTP status error.
    #[inline]
    pub fn status(status: u16, body: Value) -> Self {
        Self::Status { status, body }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection-level error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionClosed
                | Self::Handshake { .. }
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this is a server-side reply rejection.
    #[inline]
    #[must_use]
    pub fn is_reply_error(&self) -> bool {
        matches!(self, Self::Reply { .. })
    }

    /// Returns `true` if this is an HTTP transport failure.
    #[inline]
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Http(_))
    }

    /// Returns the rejected reply envelope, if this is a [`Error::Reply`].
    #[inline]
    #[must_use]
    pub fn reply_envelope(&self) -> Option<&Value> {
        match self {
            Self::Reply { envelope } => Some(envelope),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
