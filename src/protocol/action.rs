//! Outbound control messages.
//!
//! Subscribe/unsubscribe actions and the heartbeat frame, plus the
//! message-identifier stamping applied by the channel before transmit.
//!
//! A topic starting with `/` addresses a path; anything else addresses a
//! flow by id. The two are distinct subscription keys on the wire.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde_json::{Value, json};

// ============================================================================
// ControlAction
// ============================================================================

/// A subscribe or unsubscribe control message.
///
/// # Format
///
/// ```json
/// { "object": "drop", "type": "subscribe", "flowId": "f554b53a" }
/// { "object": "drop", "type": "unsubscribe", "path": "/alice/sensors" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ControlAction {
    /// Object kind the action applies to.
    pub object: &'static str,

    /// Action name.
    #[serde(rename = "type")]
    pub action: &'static str,

    /// Topic path, for `/`-prefixed topics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Flow id, for bare-identifier topics.
    #[serde(rename = "flowId", skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
}

impl ControlAction {
    /// Creates a subscribe action for a topic.
    #[inline]
    #[must_use]
    pub fn subscribe(topic: &str) -> Self {
        Self::for_topic("subscribe", topic)
    }

    /// Creates an unsubscribe action for a topic.
    #[inline]
    #[must_use]
    pub fn unsubscribe(topic: &str) -> Self {
        Self::for_topic("unsubscribe", topic)
    }

    fn for_topic(action: &'static str, topic: &str) -> Self {
        let (path, flow_id) = if topic.starts_with('/') {
            (Some(topic.to_string()), None)
        } else {
            (None, Some(topic.to_string()))
        };
        Self {
            object: "drop",
            action,
            path,
            flow_id,
        }
    }

    /// Converts to a JSON value ready for msgId stamping.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        // A struct of strings cannot fail to serialize.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ============================================================================
// Heartbeat
// ============================================================================

/// Builds the liveness frame. Carries no msgId; no reply is tracked.
#[inline]
#[must_use]
pub fn heartbeat() -> Value {
    json!({"type": "heartbeat"})
}

// ============================================================================
// MsgId Stamping
// ============================================================================

/// Stamps a message identifier onto an outgoing message.
///
/// Non-mapping messages are left untouched.
pub fn stamp_msg_id(message: &mut Value, msg_id: u64) {
    if let Value::Object(map) = message {
        map.insert("msgId".to_string(), Value::from(msg_id));
    }
}

// ============================================================================
// Tests
// ============================================================================
