//! Flow resource service.
//!
//! Flows are the platform's named streams. The service surface is
//! read-only here; drops within a flow are managed through
//! [`DropService`](super::DropService).

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::http::RequestGateway;

use super::service::{Findable, Resource, ResourceContext};

// ============================================================================
// FlowService
// ============================================================================

/// Read access to flows, anchored at `/flow`.
///
/// ```ignore
/// let flow = client.flow().read("f554b53a", &Default::default()).await?;
/// ```
#[derive(Clone)]
pub struct FlowService {
    context: ResourceContext,
}

impl FlowService {
    /// Creates the service over a gateway.
    #[inline]
    #[must_use]
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self {
            context: ResourceContext::new(gateway, "/flow"),
        }
    }
}

impl Resource for FlowService {
    fn context(&self) -> &ResourceContext {
        &self.context
    }
}

impl Findable for FlowService {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::config::{ApiOptions, Credentials};
    use crate::http::testing::mock;
    use crate::http::RequestOptions;

    fn service(transport: Arc<crate::http::testing::MockTransport>) -> FlowService {
        let gateway = Arc::new(RequestGateway::new(
            Credentials::new("acct", "tok"),
            ApiOptions::new(),
            transport,
        ));
        FlowService::new(gateway)
    }

    #[tokio::test]
    async fn test_read_targets_flow_path() {
        let transport = mock(json!({"body": {"id": "f1"}}));
        let flows = service(Arc::clone(&transport));

        let flow = flows.read("f1", &RequestOptions::new()).await.expect("read");
        assert_eq!(flow["id"], "f1");

        let sent = transport.take_requests();
        assert_eq!(sent[0].method, "GET");
        assert!(sent[0].url.path().ends_with("/flow/f1"));
    }

    #[tokio::test]
    async fn test_read_many_uses_mget_with_ids_body() {
        let transport = mock(json!({"body": []}));
        let flows = service(Arc::clone(&transport));

        let ids = vec!["a".to_string(), "b".to_string()];
        flows
            .read_many(&ids, &RequestOptions::new())
            .await
            .expect("read_many");

        let sent = transport.take_requests();
        assert_eq!(sent[0].method, "MGET");
        assert!(sent[0].url.path().ends_with("/flow"));
        assert_eq!(sent[0].body, Some(json!(["a", "b"])));
    }

    #[tokio::test]
    async fn test_find_dispatches_by_argument_shape() {
        let transport = mock(json!({"body": []}));
        let flows = service(Arc::clone(&transport));
        let opts = RequestOptions::new();

        flows.find("f1", &opts).await.expect("by id");
        flows.find(vec!["a", "b"], &opts).await.expect("by ids");
        flows
            .find(RequestOptions::new().with_refs(true), &opts)
            .await
            .expect("by query");

        let sent = transport.take_requests();
        assert_eq!(sent[0].method, "GET");
        assert!(sent[0].url.path().ends_with("/flow/f1"));
        assert_eq!(sent[1].method, "MGET");
        assert_eq!(sent[2].method, "GET");
        assert!(sent[2].url.query().expect("query").contains("refs=1"));
    }
}
