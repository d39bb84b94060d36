//! Typed CRUD surfaces over the request gateway.
//!
//! Each resource kind composes capability traits over a path-anchored
//! context:
//!
//! | Type | Base path | Capabilities |
//! |------|-----------|--------------|
//! | [`FlowService`] | `/flow` | read, read_many, find_many, find |
//! | [`DropService`] | `/drop/<flowId>` | all of the above + create, update, save |
//!
//! Bring the capability traits into scope to call their methods:
//!
//! ```ignore
//! use flowthings::resource::{Findable, Updateable};
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Drop resource service.
pub mod drop;

/// Flow resource service.
pub mod flow;

/// Capability traits and shared context.
pub mod service;

// ============================================================================
// Re-exports
// ============================================================================

pub use drop::DropService;
pub use flow::FlowService;
pub use service::{Createable, FindQuery, Findable, Resource, ResourceContext, Updateable};
