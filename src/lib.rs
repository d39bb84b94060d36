//! flowthings - Client library for the flowthings.io platform.
//!
//! This library provides a typed REST client and a multiplexed
//! WebSocket channel for the flowthings drop-streaming platform.
//!
//! # Architecture
//!
//! The client is split into two planes that share credentials and an
//! HTTP transport:
//!
//! - **REST plane**: [`Client`] routes through a request gateway that
//!   builds versioned, account-scoped URLs and unwraps the platform's
//!   `{head, body}` response envelope
//! - **Streaming plane**: [`MessageChannel`] holds one WebSocket
//!   connection and multiplexes request/reply pairs and topic
//!   subscriptions over it
//!
//! Key design principles:
//!
//! - One socket per channel; replies are correlated by `msgId`
//! - Sends while disconnected queue and drain in order on open
//! - Subscriptions fan out to callbacks; the socket-side subscribe is
//!   sent once per topic
//! - Query filters are written as structured documents and compiled to
//!   the platform's filter expression language
//!
//! # Quick Start
//!
//! ```no_run
//! use flowthings::{Client, RequestOptions, Result, Updateable};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = Client::builder()
//!         .account("alice")
//!         .token("s3cr3t")
//!         .build()?;
//!
//!     // REST: create a drop in a flow
//!     let drop = client
//!         .drops("f55b10a540cf27ee5e2525f6c")
//!         .save(&json!({"elems": {"temperature": 21.5}}), &RequestOptions::new())
//!         .await?;
//!     println!("created {}", drop["id"]);
//!
//!     // Streaming: follow new drops on a path
//!     let channel = client.channel();
//!     channel.connect().await?;
//!     let mut sub = channel.subscribe("/alice/sensors", |drop| {
//!         println!("drop: {drop}");
//!     })?;
//!     sub.acknowledged().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`channel`] | WebSocket channel: connection, replies, subscriptions |
//! | [`client`] | Client handle and builder |
//! | [`config`] | Credentials and endpoint options |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`filter`] | Structured query filter compiler |
//! | [`http`] | REST gateway and transport (internal seam) |
//! | [`protocol`] | Socket wire format (internal) |
//! | [`resource`] | Typed services for platform resources |

// ============================================================================
// Modules
// ============================================================================

/// WebSocket channel layer.
///
/// [`MessageChannel`] multiplexes request/reply pairs and topic
/// subscriptions over a single connection, with heartbeats and
/// lifecycle events.
pub mod channel;

/// Client handle and builder.
///
/// Use [`Client::builder()`] to create a configured client instance.
pub mod client;

/// Credentials and endpoint configuration.
pub mod config;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Structured query filter compiler.
pub mod filter;

/// REST request layer.
///
/// The [`http::HttpTransport`] trait is the seam for substituting the
/// network client in tests.
pub mod http;

/// Socket wire format.
///
/// Internal module defining outbound control actions and inbound frame
/// classification.
pub mod protocol;

/// Typed services for platform resources.
pub mod resource;

// ============================================================================
// Re-exports
// ============================================================================

// Client types
pub use client::{Client, ClientBuilder};

// Channel types
pub use channel::{ConnectionState, LifecycleEvent, MessageChannel, Subscription};

// Configuration types
pub use config::{ApiOptions, Credentials, WsOptions};

// Error types
pub use error::{Error, Result};

// Query types
pub use filter::{Filter, RegexFlags};
pub use http::{ApiReply, RequestOptions};

// Resource capabilities
pub use resource::{Createable, FindQuery, Findable, Resource, Updateable};
