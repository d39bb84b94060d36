//! Session negotiation.
//!
//! One POST handshake to the session endpoint yields a session id; the
//! socket is then opened against the session-scoped endpoint. No retry:
//! handshake rejection propagates as rejection of the connect call.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;
use url::Url;

use crate::config::{Credentials, WsOptions};
use crate::error::{Error, Result};
use crate::http::{HttpRequest, HttpTransport};

// ============================================================================
// Types
// ============================================================================

/// The socket type produced by negotiation.
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ============================================================================
// SessionNegotiator
// ============================================================================

/// Performs the handshake and opens the session socket.
///
/// A trait seam so tests can negotiate against a local server without a
/// handshake endpoint.
#[async_trait]
pub trait SessionNegotiator: Send + Sync {
    /// Negotiates a session and resolves with the raw socket.
    ///
    /// # Errors
    ///
    /// - [`Error::Handshake`] if the session POST fails or returns no id
    /// - [`Error::Connection`] if the socket cannot be opened
    async fn connect(&self, credentials: &Credentials) -> Result<WsStream>;
}

// ============================================================================
// Negotiator
// ============================================================================

/// Default negotiator against the platform's session gateway.
pub struct Negotiator {
    options: WsOptions,
    transport: Arc<dyn HttpTransport>,
}

impl Negotiator {
    /// Creates a negotiator over the given transport.
    #[inline]
    #[must_use]
    pub fn new(options: WsOptions, transport: Arc<dyn HttpTransport>) -> Self {
        Self { options, transport }
    }
}

#[async_trait]
impl SessionNegotiator for Negotiator {
    async fn connect(&self, credentials: &Credentials) -> Result<WsStream> {
        let url = Url::parse(&self.options.session_url())?;
        let mut request = HttpRequest::new("POST", url);
        for (name, value) in credentials.headers() {
            request = request.with_header(name, value);
        }

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|e| Error::handshake(e.to_string()))?;

        let session_id = extract_session_id(&response.body)
            .ok_or_else(|| Error::handshake("no session id in handshake response"))?;

        let socket_url = self.options.socket_url(&session_id);
        debug!(%socket_url, "opening session socket");

        let (stream, _) = connect_async(&socket_url)
            .await
            .map_err(|e| Error::connection(e.to_string()))?;
        Ok(stream)
    }
}

/// Pulls the session id out of the handshake envelope (`body.id`), or a
/// bare `id` for servers that skip the envelope.
fn extract_session_id(body: &Value) -> Option<String> {
    let id = body.pointer("/body/id").or_else(|| body.get("id"))?;
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_extract_session_id_from_envelope() {
        let body = json!({"head": {"ok": true}, "body": {"id": "s42"}});
        assert_eq!(extract_session_id(&body), Some("s42".to_string()));
    }

    #[test]
    fn test_extract_bare_session_id() {
        assert_eq!(
            extract_session_id(&json!({"id": 7})),
            Some("7".to_string())
        );
    }

    #[test]
    fn test_extract_missing_session_id() {
        assert_eq!(extract_session_id(&json!({"body": {}})), None);
    }
}
