//! Inbound frame parsing.
//!
//! Every inbound text frame is one of two shapes:
//!
//! - a pushed event, `{"type": "message", "value": {...}}`, fanned out to
//!   topic subscribers;
//! - a reply envelope, `{"head": {"ok": bool, "msgId": n, ...}, "body": ...}`,
//!   correlated to a pending request.
//!
//! Anything without `type == "message"` is treated as a reply envelope.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

// ============================================================================
// ReplyHead
// ============================================================================

/// The `head` of a reply envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplyHead {
    /// Whether the request succeeded.
    pub ok: bool,

    /// Identifier of the request this reply answers.
    #[serde(rename = "msgId")]
    pub msg_id: u64,

    /// HTTP-like status code, when the server includes one.
    #[serde(default)]
    pub status: Option<u64>,

    /// Expanded references, when the server includes them.
    #[serde(default)]
    pub references: Option<Value>,
}

// ============================================================================
// Reply
// ============================================================================

/// A reply envelope correlated to an outstanding request.
#[derive(Debug, Clone)]
pub struct Reply {
    /// Parsed envelope head.
    pub head: ReplyHead,
    /// The envelope body.
    pub body: Value,
    /// The complete envelope as received, surfaced on rejection.
    pub envelope: Value,
}

// ============================================================================
// PushedEvent
// ============================================================================

/// An inbound pushed event, not tied to any outstanding request.
///
/// Dispatched independently under both its flow id and its path, so a
/// caller may subscribe to the same logical stream by either key.
#[derive(Debug, Clone)]
pub struct PushedEvent {
    /// Flow id of the originating stream.
    pub flow_id: Option<String>,
    /// Path of the originating stream.
    pub path: Option<String>,
    /// The pushed payload.
    pub value: Value,
}

// ============================================================================
// InboundFrame
// ============================================================================

/// Tagged union over the two inbound frame shapes.
#[derive(Debug, Clone)]
pub enum InboundFrame {
    /// Pushed event for topic fan-out.
    Push(PushedEvent),
    /// Reply envelope for request correlation.
    Reply(Reply),
}

impl InboundFrame {
    /// Parses a raw text frame.
    ///
    /// # Errors
    ///
    /// - [`Error::Json`] if the frame is not valid JSON
    /// - [`Error::Protocol`] if a reply envelope has no parseable head
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;

        if value.get("type").and_then(Value::as_str) == Some("message") {
            let payload = value.get("value").cloned().unwrap_or(Value::Null);
            let flow_id = payload
                .get("flowId")
                .and_then(Value::as_str)
                .map(str::to_string);
            let path = payload
                .get("path")
                .and_then(Value::as_str)
                .map(str::to_string);

            return Ok(Self::Push(PushedEvent {
                flow_id,
                path,
                value: payload,
            }));
        }

        let head = value
            .get("head")
            .cloned()
            .ok_or_else(|| Error::protocol("reply envelope without head"))?;
        let head: ReplyHead = serde_json::from_value(head)
            .map_err(|e| Error::protocol(format!("bad reply head: {e}")))?;
        let body = value.get("body").cloned().unwrap_or(Value::Null);

        Ok(Self::Reply(Reply {
            head,
            body,
            envelope: value,
        }))
    }
}

// ============================================================================
// Tests
// ============================================================================
