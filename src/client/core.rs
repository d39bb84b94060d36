//! Core client type.
//!
//! Composes the REST gateway, the resource services, and the
//! WebSocket channel factory behind one handle.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::channel::{MessageChannel, Negotiator};
use crate::config::{ApiOptions, Credentials, WsOptions};
use crate::error::Result;
use crate::http::{ApiReply, HttpTransport, RequestGateway, RequestOptions};
use crate::resource::{DropService, FlowService};

use super::builder::ClientBuilder;

// ============================================================================
// Client
// ============================================================================

/// Entry point for the flowthings platform.
///
/// A `Client` is cheap to clone; all clones share the same transport
/// and credentials. REST calls go through [`Client::request`] or the
/// typed services, and [`Client::channel`] produces an independent
/// WebSocket channel.
#[derive(Clone)]
pub struct Client {
    /// Account and token applied to every request.
    credentials: Credentials,
    /// WebSocket endpoint used by [`Client::channel`].
    ws_options: WsOptions,
    /// Shared REST gateway.
    gateway: Arc<RequestGateway>,
    /// Transport shared between the gateway and session negotiation.
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("ws_options", &self.ws_options)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Client Implementation
// ============================================================================

impl Client {
    /// Returns a builder for configuring a client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with default endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are empty or the transport
    /// cannot be constructed.
    pub fn new(account: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::builder().account(account).token(token).build()
    }

    /// Assembles a client from validated parts.
    pub(crate) fn assemble(
        credentials: Credentials,
        api: ApiOptions,
        ws: WsOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let gateway = Arc::new(RequestGateway::new(
            credentials.clone(),
            api,
            Arc::clone(&transport),
        ));
        Self {
            credentials,
            ws_options: ws,
            gateway,
            transport,
        }
    }

    /// Returns the credentials this client was built with.
    #[inline]
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ========================================================================
    // REST surface
    // ========================================================================

    /// Issues a raw REST request against the versioned, account-scoped
    /// API root.
    ///
    /// `path` is appended to the account base, so `"/flow/f1"` hits
    /// `/v0.1/<account>/flow/f1`. Most callers want the typed services
    /// instead; this is the escape hatch for endpoints they do not
    /// cover.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiReply> {
        self.gateway
            .request(method, path, body.as_ref(), &options)
            .await
    }

    /// Returns the flow service.
    #[must_use]
    pub fn flow(&self) -> FlowService {
        FlowService::new(Arc::clone(&self.gateway))
    }

    /// Returns the drop service scoped to one flow.
    #[must_use]
    pub fn drops(&self, flow_id: &str) -> DropService {
        DropService::new(Arc::clone(&self.gateway), flow_id)
    }

    /// Creates a drop without scoping to a flow first.
    ///
    /// The flow is taken from the model's `flowId` field by the
    /// platform.
    pub async fn create_drop(&self, model: Value, options: RequestOptions) -> Result<Value> {
        let reply = self
            .gateway
            .request("POST", "/drop", Some(&model), &options)
            .await?;
        Ok(reply.body)
    }

    // ========================================================================
    // WebSocket surface
    // ========================================================================

    /// Creates a new message channel bound to this client's
    /// credentials.
    ///
    /// The channel starts disconnected; call
    /// [`MessageChannel::connect`] to bring it up. Each call returns
    /// an independent channel with its own connection.
    #[must_use]
    pub fn channel(&self) -> MessageChannel {
        let negotiator = Negotiator::new(self.ws_options.clone(), Arc::clone(&self.transport));
        MessageChannel::new(self.credentials.clone(), Arc::new(negotiator))
    }
}

// ============================================================================
// Tests
// ============================================================================
