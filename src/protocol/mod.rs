//! WebSocket control-channel message types.
//!
//! This module defines the JSON frame formats exchanged over the session
//! socket.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Purpose |
//! |---------|-----------|---------|
//! | `ControlAction` | Client → Server | Subscribe/unsubscribe to a topic |
//! | heartbeat | Client → Server | Liveness signal, every 30s |
//! | `Reply` | Server → Client | Answer to a msgId-stamped request |
//! | `PushedEvent` | Server → Client | Topic fan-out, no correlation |
//!
//! Outbound requests expecting a reply are stamped with a monotonically
//! increasing `msgId`, unique for the lifetime of one connection.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `action` | Outbound control messages and msgId stamping |
//! | `frame` | Inbound frame parsing (push vs reply) |

// ============================================================================
// Submodules
// ============================================================================

/// Outbound control messages.
pub mod action;

/// Inbound frame types.
pub mod frame;

// ============================================================================
// Re-exports
// ============================================================================

pub use action::{ControlAction, heartbeat, stamp_msg_id};
pub use frame::{InboundFrame, PushedEvent, Reply, ReplyHead};
