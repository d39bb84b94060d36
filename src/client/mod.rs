//! Client composition layer.
//!
//! Ties the REST gateway, the typed resource services, and the
//! WebSocket channel factory together behind a single [`Client`]
//! handle configured through [`ClientBuilder`].
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `builder` | Fluent configuration and validation |
//! | `core` | The client handle itself |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent configuration and validation.
pub mod builder;

/// The client handle.
pub mod core;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::Client;
