//! WebSocket message channel.
//!
//! The core of the crate: a single-connection client multiplexing
//! request/response pairs and topic subscriptions over one socket.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   handshake    ┌──────────────────┐
//! │  MessageChannel  │───────────────►│ Session gateway  │
//! │                  │                └──────────────────┘
//! │  ChannelCore     │    socket      ┌──────────────────┐
//! │  (state machine) │◄──────────────►│ /session/<id>/ws │
//! └──────────────────┘                └──────────────────┘
//! ```
//!
//! # Guarantees
//!
//! - Replies settle exactly once, routed by message identifier.
//! - Pushed events fan out to every callback under the event's flow id
//!   and, independently, its path, in registration order.
//! - Sends while disconnected queue in strict FIFO order and drain once
//!   on the next successful connect.
//! - One heartbeat timer per connection epoch, canceled on teardown.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Connection state machine (internal) |
//! | `handle` | Public channel API, socket task, subscriptions |
//! | `session` | Handshake and socket negotiation |

// ============================================================================
// Submodules
// ============================================================================

/// Connection state machine.
mod core;

/// Public channel API and socket task.
pub mod handle;

/// Session negotiation.
pub mod session;

// ============================================================================
// Re-exports
// ============================================================================

pub use self::core::{ConnectionState, TopicCallback};
pub use handle::{MessageChannel, Subscription};
pub use session::{Negotiator, SessionNegotiator, WsStream};

// ============================================================================
// LifecycleEvent
// ============================================================================

/// Connection lifecycle notification, broadcast to every observer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// The socket opened and the outbound queue was drained.
    Open,
    /// The socket closed, with the peer's close code and reason.
    Close {
        /// WebSocket close code.
        code: u16,
        /// Close reason, possibly empty.
        reason: String,
    },
    /// The socket failed.
    Error,
}
