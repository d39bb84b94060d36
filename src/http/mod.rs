//! REST request layer.
//!
//! One request/response exchange per call, no retries. The
//! [`RequestGateway`] builds URLs and headers and unwraps the platform's
//! response envelope; the [`HttpTransport`] trait is the seam to the
//! actual network client.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `gateway` | URL/header construction and envelope unwrapping |
//! | `options` | Per-request options and query-parameter encoding |
//! | `transport` | HTTP transport trait and reqwest implementation |

// ============================================================================
// Submodules
// ============================================================================

/// URL/header construction and envelope unwrapping.
pub mod gateway;

/// Per-request options and query encoding.
pub mod options;

/// HTTP transport trait and default implementation.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

pub use gateway::{ApiReply, RequestGateway};
pub use options::RequestOptions;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    //! Captured transport for gateway and resource tests.

    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::Value;

    use crate::error::Result;

    use super::transport::{HttpRequest, HttpResponse, HttpTransport};

    /// Records every request and answers from a fixed queue of bodies,
    /// repeating the last body once the queue is exhausted.
    pub(crate) struct MockTransport {
        requests: Mutex<Vec<HttpRequest>>,
        replies: Mutex<Vec<Value>>,
    }

    impl MockTransport {
        pub(crate) fn replying(body: Value) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                replies: Mutex::new(vec![body]),
            }
        }

        pub(crate) fn take_requests(&self) -> Vec<HttpRequest> {
            std::mem::take(&mut self.requests.lock())
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().push(request);
            let mut replies = self.replies.lock();
            let body = if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies.first().cloned().unwrap_or(Value::Null)
            };
            Ok(HttpResponse { status: 200, body })
        }
    }

    /// Convenience constructor used by resource tests.
    pub(crate) fn mock(body: Value) -> Arc<MockTransport> {
        Arc::new(MockTransport::replying(body))
    }
}
