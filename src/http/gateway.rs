//! Request gateway: one REST exchange per call.
//!
//! Builds the account-scoped URL, attaches auth headers, encodes query
//! parameters, and unwraps the platform's `{head, body}` response
//! envelope. No retries; transport failures propagate to the caller.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::config::{ApiOptions, Credentials};
use crate::error::Result;

use super::options::RequestOptions;
use super::transport::{HttpRequest, HttpTransport};

// ============================================================================
// ApiReply
// ============================================================================

/// An unwrapped REST response.
///
/// `references` is populated exactly when the `refs` option was set,
/// carrying `head.references` from the envelope.
#[derive(Debug, Clone)]
pub struct ApiReply {
    /// The envelope's `body`.
    pub body: Value,
    /// The envelope's `head.references`, when reference expansion was
    /// requested.
    pub references: Option<Value>,
}

// ============================================================================
// RequestGateway
// ============================================================================

/// Issues single request/response exchanges against the REST API.
pub struct RequestGateway {
    credentials: Credentials,
    options: ApiOptions,
    transport: Arc<dyn HttpTransport>,
}

impl RequestGateway {
    /// Creates a gateway over the given transport.
    #[inline]
    #[must_use]
    pub fn new(
        credentials: Credentials,
        options: ApiOptions,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            credentials,
            options,
            transport,
        }
    }

    /// Issues one exchange.
    ///
    /// `path` is the resource path below the account segment, e.g.
    /// `/flow/f554b53a`.
    ///
    /// # Errors
    ///
    /// - [`Error::Url`](crate::Error::Url) if the configured host and path
    ///   do not form a valid URL
    /// - [`Error::Http`](crate::Error::Http) /
    ///   [`Error::Status`](crate::Error::Status) from the transport
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        opts: &RequestOptions,
    ) -> Result<ApiReply> {
        let url = self.build_url(path, opts)?;

        trace!(method, %url, "API request");

        let mut request = HttpRequest::new(method, url);
        for (name, value) in self.credentials.headers() {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_body(body.clone());
        }
        request.timeout = opts.timeout;
        request.cache = opts.cache;

        let response = self.transport.execute(request).await?;

        let reply_body = response.body.get("body").cloned().unwrap_or(Value::Null);
        let references = if opts.wants_refs() {
            Some(
                response
                    .body
                    .pointer("/head/references")
                    .cloned()
                    .unwrap_or(Value::Null),
            )
        } else {
            None
        };

        Ok(ApiReply {
            body: reply_body,
            references,
        })
    }

    fn build_url(&self, path: &str, opts: &RequestOptions) -> Result<Url> {
        let base = self.options.base_url(&self.credentials.account);
        let mut url = Url::parse(&format!("{base}{path}"))?;

        let pairs = opts.query_pairs();
        if !pairs.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in &pairs {
                query.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    use crate::http::testing::MockTransport;

    fn gateway(transport: Arc<MockTransport>) -> RequestGateway {
        RequestGateway::new(
            Credentials::new("acct", "tok"),
            ApiOptions::new(),
            transport,
        )
    }

    #[tokio::test]
    async fn test_url_headers_and_unwrap() {
        let transport = Arc::new(MockTransport::replying(json!({
            "head": {"ok": true, "status": 200},
            "body": {"id": "f1"}
        })));
        let gw = gateway(Arc::clone(&transport));

        let reply = gw
            .request("GET", "/flow/f1", None, &RequestOptions::new())
            .await
            .expect("request");

        assert_eq!(reply.body, json!({"id": "f1"}));
        assert!(reply.references.is_none());

        let sent = transport.take_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "GET");
        assert_eq!(
            sent[0].url.as_str(),
            "https://api.flowthings.io/v0.1/acct/flow/f1"
        );
        assert!(
            sent[0]
                .headers
                .contains(&("X-Auth-Account".to_string(), "acct".to_string()))
        );
        assert!(
            sent[0]
                .headers
                .contains(&("X-Auth-Token".to_string(), "tok".to_string()))
        );
    }

    #[tokio::test]
    async fn test_refs_pair_unwrap() {
        let transport = Arc::new(MockTransport::replying(json!({
            "head": {"ok": true, "references": {"f1": {"path": "/a"}}},
            "body": []
        })));
        let gw = gateway(Arc::clone(&transport));

        let reply = gw
            .request("GET", "/flow", None, &RequestOptions::new().with_refs(true))
            .await
            .expect("request");

        assert_eq!(reply.body, json!([]));
        assert_eq!(reply.references, Some(json!({"f1": {"path": "/a"}})));

        let sent = transport.take_requests();
        assert!(sent[0].url.query().expect("query").contains("refs=1"));
    }

    #[tokio::test]
    async fn test_query_encoding_and_transport_options() {
        let transport = Arc::new(MockTransport::replying(json!({"body": null})));
        let gw = gateway(Arc::clone(&transport));

        let opts = RequestOptions::new()
            .with_only(["id", "path"])
            .with_filter(crate::filter::Filter::query(json!({"foo": "bar"})))
            .with_timeout(std::time::Duration::from_secs(9))
            .with_cache();

        gw.request("GET", "/flow", None, &opts).await.expect("request");

        let sent = transport.take_requests();
        let query = sent[0].url.query().expect("query");
        assert!(query.contains("only=id%2Cpath"));
        assert!(query.contains("filter="));
        assert!(!query.contains("timeout"));
        assert!(!query.contains("cache"));
        assert_eq!(sent[0].timeout, Some(std::time::Duration::from_secs(9)));
        assert!(sent[0].cache);
    }

    #[tokio::test]
    async fn test_body_forwarded() {
        let transport = Arc::new(MockTransport::replying(json!({"body": {"id": "d1"}})));
        let gw = gateway(Arc::clone(&transport));

        let model = json!({"elems": {"temp": 20}});
        gw.request("POST", "/drop/f1", Some(&model), &RequestOptions::new())
            .await
            .expect("request");

        let sent = transport.take_requests();
        assert_eq!(sent[0].body, Some(model));
    }
}
