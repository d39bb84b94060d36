//! Drop resource service.
//!
//! Drops are the data units flowing through a flow. The service is
//! scoped to one flow: all operations target `/drop/<flowId>`.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::http::RequestGateway;

use super::service::{Createable, Findable, Resource, ResourceContext, Updateable};

// ============================================================================
// DropService
// ============================================================================

/// Full CRUD access to one flow's drops.
///
/// ```ignore
/// let drops = client.drops("f554b53a");
/// let drop = drops.save(&json!({"elems": {"temp": 21}}), &Default::default()).await?;
/// ```
#[derive(Clone)]
pub struct DropService {
    context: ResourceContext,
}

impl DropService {
    /// Creates the service scoped to a flow id.
    #[inline]
    #[must_use]
    pub(crate) fn new(gateway: Arc<RequestGateway>, flow_id: &str) -> Self {
        Self {
            context: ResourceContext::new(gateway, format!("/drop/{flow_id}")),
        }
    }
}

impl Resource for DropService {
    fn context(&self) -> &ResourceContext {
        &self.context
    }
}

impl Findable for DropService {}
impl Createable for DropService {}
impl Updateable for DropService {}

// ============================================================================
// Tests
// ============================================================================
