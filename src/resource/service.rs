//! Resource capability traits.
//!
//! CRUD surfaces are composed from capability traits with default
//! methods over a shared [`ResourceContext`], mirroring how the
//! platform's other client libraries build services from mixins. A
//! service type opts into exactly the capabilities its resource kind
//! supports.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{RequestGateway, RequestOptions};

// ============================================================================
// ResourceContext
// ============================================================================

/// A gateway anchored at one resource base path.
#[derive(Clone)]
pub struct ResourceContext {
    gateway: Arc<RequestGateway>,
    base: String,
}

impl ResourceContext {
    /// Creates a context for a base path such as `/flow`.
    #[inline]
    #[must_use]
    pub(crate) fn new(gateway: Arc<RequestGateway>, base: impl Into<String>) -> Self {
        Self {
            gateway,
            base: base.into(),
        }
    }

    /// Issues one exchange below the base path and returns the body.
    pub(crate) async fn request(
        &self,
        method: &str,
        suffix: &str,
        body: Option<&Value>,
        opts: &RequestOptions,
    ) -> Result<Value> {
        let path = format!("{}{suffix}", self.base);
        let reply = self.gateway.request(method, &path, body, opts).await?;
        Ok(reply.body)
    }
}

// ============================================================================
// Resource
// ============================================================================

/// Anchors a service type to its [`ResourceContext`].
pub trait Resource {
    /// The anchored context.
    fn context(&self) -> &ResourceContext;
}

// ============================================================================
// FindQuery
// ============================================================================

/// Argument to the polymorphic [`Findable::find`].
#[derive(Debug, Clone)]
pub enum FindQuery {
    /// A single resource id: dispatches to `read`.
    Id(String),
    /// A sequence of ids: dispatches to `read_many`.
    Ids(Vec<String>),
    /// Query options: dispatches to `find_many`.
    Query(RequestOptions),
}

impl From<&str> for FindQuery {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for FindQuery {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Vec<String>> for FindQuery {
    fn from(ids: Vec<String>) -> Self {
        Self::Ids(ids)
    }
}

impl From<Vec<&str>> for FindQuery {
    fn from(ids: Vec<&str>) -> Self {
        Self::Ids(ids.into_iter().map(str::to_string).collect())
    }
}

impl From<RequestOptions> for FindQuery {
    fn from(opts: RequestOptions) -> Self {
        Self::Query(opts)
    }
}

// ============================================================================
// Findable
// ============================================================================

/// Read access to a resource kind.
pub trait Findable: Resource {
    /// Reads one resource by id: `GET <base>/<id>`.
    async fn read(&self, id: &str, opts: &RequestOptions) -> Result<Value> {
        self.context()
            .request("GET", &format!("/{id}"), None, opts)
            .await
    }

    /// Reads several resources by id in one exchange: `MGET <base>` with
    /// the ids as the request body.
    async fn read_many(&self, ids: &[String], opts: &RequestOptions) -> Result<Value> {
        let body = Value::from(ids.to_vec());
        self.context().request("MGET", "", Some(&body), opts).await
    }

    /// Finds resources matching the options: `GET <base>`.
    async fn find_many(&self, opts: &RequestOptions) -> Result<Value> {
        self.context().request("GET", "", None, opts).await
    }

    /// Polymorphic find: an id reads one resource, a sequence of ids
    /// reads many, and query options search. `opts` applies to the id
    /// forms; the query form carries its own options.
    async fn find(
        &self,
        query: impl Into<FindQuery> + Send,
        opts: &RequestOptions,
    ) -> Result<Value> {
        match query.into() {
            FindQuery::Id(id) => self.read(&id, opts).await,
            FindQuery::Ids(ids) => self.read_many(&ids, opts).await,
            FindQuery::Query(query_opts) => self.find_many(&query_opts).await,
        }
    }
}

// ============================================================================
// Createable
// ============================================================================

/// Create access to a resource kind.
pub trait Createable: Resource {
    /// Creates a resource: `POST <base>` with the model as the body.
    async fn create(&self, model: &Value, opts: &RequestOptions) -> Result<Value> {
        self.context().request("POST", "", Some(model), opts).await
    }
}

// ============================================================================
// Updateable
// ============================================================================

/// Update access to a resource kind; includes create so `save` can
/// dispatch on the model's id.
pub trait Updateable: Createable {
    /// Updates a resource: `PUT <base>/<model.id>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the model has no `id`.
    async fn update(&self, model: &Value, opts: &RequestOptions) -> Result<Value> {
        let id = model_id(model)
            .ok_or_else(|| Error::invalid_argument("update requires a model with an id"))?;
        self.context()
            .request("PUT", &format!("/{id}"), Some(model), opts)
            .await
    }

    /// Updates when the model carries an id, creates otherwise.
    async fn save(&self, model: &Value, opts: &RequestOptions) -> Result<Value> {
        if model_id(model).is_some() {
            self.update(model, opts).await
        } else {
            self.create(model, opts).await
        }
    }
}

/// A model's id, when present and non-empty.
fn model_id(model: &Value) -> Option<&str> {
    model
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_model_id_extraction() {
        assert_eq!(model_id(&json!({"id": "d1"})), Some("d1"));
        assert_eq!(model_id(&json!({"id": ""})), None);
        assert_eq!(model_id(&json!({})), None);
        assert_eq!(model_id(&json!({"id": 7})), None);
    }

    #[test]
    fn test_find_query_dispatch_shapes() {
        assert!(matches!(FindQuery::from("f1"), FindQuery::Id(_)));
        assert!(matches!(
            FindQuery::from(vec!["a", "b"]),
            FindQuery::Ids(_)
        ));
        assert!(matches!(
            FindQuery::from(RequestOptions::new()),
            FindQuery::Query(_)
        ));
    }
}
