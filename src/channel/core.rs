//! Message-channel state machine.
//!
//! [`ChannelCore`] owns all per-connection state: the
//! connection lifecycle, pending request replies, topic subscription
//! groups, the outbound queue accumulated while disconnected, and the
//! message-identifier counter. The socket task and the public handle hold
//! it behind one `parking_lot::Mutex`, so all transitions are serialized
//! and no inbound frame interleaves with another.
//!
//! Pushed-event dispatch is two-phase: `receive` resolves replies in
//! place but returns the matched callbacks for the caller to invoke after
//! releasing the lock, so a callback may itself subscribe or send.
//!
//! # Epochs
//!
//! Every connection attempt runs under an epoch number; `cleanup` bumps
//! it. A socket task from a torn-down connection carries a stale epoch
//! and its open/close/error events are ignored.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::protocol::{ControlAction, InboundFrame, PushedEvent, Reply, stamp_msg_id};

use super::LifecycleEvent;

// ============================================================================
// Types
// ============================================================================

/// Callback invoked with each pushed value for a subscribed topic.
pub type TopicCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Sender half of one pending reply.
type ReplySender = oneshot::Sender<Result<Value>>;

/// Sender half of one subscribe-acknowledgment waiter.
type AckSender = oneshot::Sender<Result<()>>;

/// Where a correlated reply is routed.
enum ReplyRoute {
    /// An ordinary request; the caller holds the receiver.
    Caller(ReplySender),
    /// A first-time subscribe; the acknowledgment promotes the group.
    SubscribeAck {
        /// Topic whose group is awaiting acknowledgment.
        topic: String,
    },
}

// ============================================================================
// ConnectionState
// ============================================================================

/// Connection lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket; sends are queued.
    Disconnected,
    /// Handshake or socket open in progress; sends are queued.
    Connecting,
    /// Socket open; sends transmit immediately.
    Connected,
}

// ============================================================================
// SubscriptionGroup
// ============================================================================

/// Per-topic subscription bookkeeping.
///
/// At most one group exists per topic. Callbacks registered before the
/// subscribe acknowledgment sit in `deferred` and join the dispatch set
/// (in insertion order) when the acknowledgment arrives.
struct SubscriptionGroup {
    /// Whether the subscribe control message was acknowledged.
    acked: bool,
    /// Active dispatch set; insertion order is dispatch order.
    callbacks: Vec<(u64, TopicCallback)>,
    /// Callbacks awaiting acknowledgment.
    deferred: Vec<(u64, TopicCallback)>,
    /// Waiters for the acknowledgment.
    waiters: Vec<AckSender>,
}

impl SubscriptionGroup {
    fn new() -> Self {
        Self {
            acked: false,
            callbacks: Vec::new(),
            deferred: Vec::new(),
            waiters: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.callbacks.is_empty() && self.deferred.is_empty()
    }
}

// ============================================================================
// ChannelCore
// ============================================================================

/// The channel's mutable state. See the module docs for the ownership
/// and locking model.
pub(crate) struct ChannelCore {
    state: ConnectionState,
    epoch: u64,
    next_msg_id: u64,
    next_callback_id: u64,
    pending: FxHashMap<u64, ReplyRoute>,
    subs: FxHashMap<String, SubscriptionGroup>,
    queue: VecDeque<String>,
    writer: Option<mpsc::UnboundedSender<String>>,
    lifecycle: broadcast::Sender<LifecycleEvent>,
}

impl ChannelCore {
    /// Creates a disconnected core.
    pub(crate) fn new() -> Self {
        let (lifecycle, _) = broadcast::channel(16);
        Self {
            state: ConnectionState::Disconnected,
            epoch: 1,
            next_msg_id: 1,
            next_callback_id: 1,
            pending: FxHashMap::default(),
            subs: FxHashMap::default(),
            queue: VecDeque::new(),
            writer: None,
            lifecycle,
        }
    }

    /// Current connection state.
    pub(crate) fn state(&self) -> ConnectionState {
        self.state
    }

    /// Current connection epoch.
    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Registers a lifecycle observer.
    pub(crate) fn lifecycle_receiver(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle.subscribe()
    }

    /// Number of in-flight requests awaiting replies.
    pub(crate) fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

// ============================================================================
// Connection Lifecycle
// ============================================================================

impl ChannelCore {
    /// Marks a connect attempt as started.
    ///
    /// Returns `false` when already connected; `connect()` is then a
    /// no-op for the caller.
    pub(crate) fn begin_connect(&mut self) -> bool {
        if self.state == ConnectionState::Connected {
            return false;
        }
        self.state = ConnectionState::Connecting;
        true
    }

    /// Rolls back a connect attempt whose handshake failed.
    pub(crate) fn abort_connect(&mut self) {
        if self.state == ConnectionState::Connecting {
            self.state = ConnectionState::Disconnected;
        }
    }

    /// Transitions to Connected: installs the writer, drains the
    /// outbound queue in FIFO order, and broadcasts the open event.
    ///
    /// Ignored when `epoch` is stale.
    pub(crate) fn open(&mut self, epoch: u64, writer: mpsc::UnboundedSender<String>) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "stale open ignored");
            return;
        }

        self.state = ConnectionState::Connected;

        let drained = self.queue.len();
        while let Some(text) = self.queue.pop_front() {
            if writer.send(text).is_err() {
                warn!("writer closed while draining queue");
                break;
            }
        }
        if drained > 0 {
            debug!(drained, "outbound queue drained");
        }

        self.writer = Some(writer);
        let _ = self.lifecycle.send(LifecycleEvent::Open);
    }

    /// Tears down connection state: discards the socket writer, rejects
    /// every pending reply and unacknowledged subscribe with
    /// [`Error::ConnectionClosed`], drops all subscription groups,
    /// clears the outbound queue, and resets the message counter.
    ///
    /// Returns `false` (and does nothing) when `epoch` is stale. The
    /// caller broadcasts the close/error lifecycle event afterwards.
    pub(crate) fn cleanup(&mut self, epoch: u64) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "stale cleanup ignored");
            return false;
        }
        self.epoch += 1;
        self.state = ConnectionState::Disconnected;
        self.writer = None;

        let pending = self.pending.len();
        for (_, route) in self.pending.drain() {
            if let ReplyRoute::Caller(tx) = route {
                let _ = tx.send(Err(Error::ConnectionClosed));
            }
        }
        for (_, mut group) in self.subs.drain() {
            for waiter in group.waiters.drain(..) {
                let _ = waiter.send(Err(Error::ConnectionClosed));
            }
        }
        self.queue.clear();
        self.next_msg_id = 1;

        debug!(pending, "channel cleaned up");
        true
    }

    /// Broadcasts a lifecycle event.
    pub(crate) fn notify(&self, event: LifecycleEvent) {
        let _ = self.lifecycle.send(event);
    }
}

// ============================================================================
// Sending
// ============================================================================

impl ChannelCore {
    fn allocate_msg_id(&mut self) -> u64 {
        let id = self.next_msg_id;
        self.next_msg_id += 1;
        id
    }

    /// Transmits immediately when connected, otherwise appends to the
    /// outbound queue for the next successful connect.
    fn transmit_or_queue(&mut self, text: String) {
        if self.state == ConnectionState::Connected
            && let Some(writer) = &self.writer
        {
            trace!(frame = %text, "transmit");
            if writer.send(text).is_err() {
                warn!("socket writer gone; frame dropped");
            }
        } else {
            trace!(frame = %text, queued = self.queue.len() + 1, "queued while disconnected");
            self.queue.push_back(text);
        }
    }

    /// Sends a message expecting a correlated reply.
    ///
    /// Allocates the next message identifier, registers the pending
    /// reply, stamps the identifier onto the message, and transmits or
    /// queues it. The returned receiver settles exactly once.
    pub(crate) fn send_expect_reply(
        &mut self,
        mut message: Value,
    ) -> Result<oneshot::Receiver<Result<Value>>> {
        let msg_id = self.allocate_msg_id();
        let (tx, rx) = oneshot::channel();
        self.pending.insert(msg_id, ReplyRoute::Caller(tx));

        stamp_msg_id(&mut message, msg_id);
        let text = serde_json::to_string(&message)?;
        self.transmit_or_queue(text);
        Ok(rx)
    }

    /// Sends a message with no reply tracking (heartbeats, unsubscribe
    /// notices).
    pub(crate) fn send_no_reply(&mut self, message: &Value) -> Result<()> {
        let text = serde_json::to_string(message)?;
        self.transmit_or_queue(text);
        Ok(())
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

impl ChannelCore {
    /// Registers a callback for a topic.
    ///
    /// The first registration for a topic transmits one subscribe
    /// control message and creates the topic's group; later
    /// registrations share it. Returns the callback id and, when the
    /// group is not yet acknowledged, a receiver settling on the
    /// acknowledgment.
    pub(crate) fn subscribe(
        &mut self,
        topic: &str,
        callback: TopicCallback,
    ) -> Result<(u64, Option<oneshot::Receiver<Result<()>>>)> {
        let callback_id = self.next_callback_id;
        self.next_callback_id += 1;

        if let Some(group) = self.subs.get_mut(topic) {
            if group.acked {
                group.callbacks.push((callback_id, callback));
                return Ok((callback_id, None));
            }
            let (tx, rx) = oneshot::channel();
            group.deferred.push((callback_id, callback));
            group.waiters.push(tx);
            return Ok((callback_id, Some(rx)));
        }

        debug!(topic, "first subscribe");
        let msg_id = self.allocate_msg_id();
        self.pending.insert(
            msg_id,
            ReplyRoute::SubscribeAck {
                topic: topic.to_string(),
            },
        );

        let mut message = ControlAction::subscribe(topic).into_value();
        stamp_msg_id(&mut message, msg_id);
        let text = serde_json::to_string(&message)?;

        let (tx, rx) = oneshot::channel();
        let mut group = SubscriptionGroup::new();
        group.deferred.push((callback_id, callback));
        group.waiters.push(tx);
        self.subs.insert(topic.to_string(), group);

        self.transmit_or_queue(text);
        Ok((callback_id, Some(rx)))
    }

    /// Removes a callback from a topic's group.
    ///
    /// Deleting the last callback removes the group and transmits one
    /// fire-and-forget unsubscribe control message. Safe to call again;
    /// an unknown topic or callback id is a no-op.
    pub(crate) fn unsubscribe(&mut self, topic: &str, callback_id: u64) {
        let Some(group) = self.subs.get_mut(topic) else {
            return;
        };
        group.callbacks.retain(|(id, _)| *id != callback_id);
        group.deferred.retain(|(id, _)| *id != callback_id);

        if group.is_empty() {
            self.subs.remove(topic);
            debug!(topic, "last callback removed, unsubscribing");
            let message = ControlAction::unsubscribe(topic).into_value();
            if let Err(e) = self.send_no_reply(&message) {
                warn!(topic, error = %e, "failed to send unsubscribe");
            }
        }
    }

    /// Number of live subscription groups.
    pub(crate) fn subscription_count(&self) -> usize {
        self.subs.len()
    }
}

// ============================================================================
// Receiving
// ============================================================================

impl ChannelCore {
    /// Processes one inbound text frame.
    ///
    /// Replies are resolved in place. For pushed events the matched
    /// callbacks are returned with the payload; the caller invokes them
    /// after releasing the lock, as one batch, before processing any
    /// further frame.
    pub(crate) fn receive(&mut self, text: &str) -> Vec<(TopicCallback, Value)> {
        match InboundFrame::parse(text) {
            Ok(InboundFrame::Push(event)) => self.collect_dispatch(&event),
            Ok(InboundFrame::Reply(reply)) => {
                self.resolve_reply(reply);
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "unparseable inbound frame");
                Vec::new()
            }
        }
    }

    /// Gathers the dispatch batch for a pushed event: the callbacks
    /// registered under its flow id and, independently, under its path.
    fn collect_dispatch(&self, event: &PushedEvent) -> Vec<(TopicCallback, Value)> {
        let mut batch = Vec::new();

        for key in [event.flow_id.as_deref(), event.path.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Some(group) = self.subs.get(key) {
                for (_, callback) in &group.callbacks {
                    batch.push((Arc::clone(callback), event.value.clone()));
                }
            }
        }

        trace!(targets = batch.len(), "pushed event");
        batch
    }

    /// Resolves or rejects the pending reply matching an envelope.
    ///
    /// Unmatched identifiers are ignored; a reply settles its pending
    /// entry at most once because the entry is removed here.
    fn resolve_reply(&mut self, reply: Reply) {
        let Some(route) = self.pending.remove(&reply.head.msg_id) else {
            trace!(msg_id = reply.head.msg_id, "reply for unknown request");
            return;
        };

        match route {
            ReplyRoute::Caller(tx) => {
                let outcome = if reply.head.ok {
                    Ok(reply.body)
                } else {
                    Err(Error::reply(reply.envelope))
                };
                let _ = tx.send(outcome);
            }
            ReplyRoute::SubscribeAck { topic } => self.settle_subscribe(&topic, reply),
        }
    }

    /// Settles a topic group on its subscribe acknowledgment.
    ///
    /// On success the deferred callbacks join the dispatch set and every
    /// waiter resolves; on rejection the group is removed so a later
    /// subscribe can retry, and every waiter gets the envelope.
    fn settle_subscribe(&mut self, topic: &str, reply: Reply) {
        if reply.head.ok {
            let Some(group) = self.subs.get_mut(topic) else {
                // All callbacks were unsubscribed before the ack arrived.
                return;
            };
            group.acked = true;
            let deferred = std::mem::take(&mut group.deferred);
            group.callbacks.extend(deferred);
            for waiter in group.waiters.drain(..) {
                let _ = waiter.send(Ok(()));
            }
            debug!(topic, "subscription acknowledged");
        } else if let Some(mut group) = self.subs.remove(topic) {
            warn!(topic, "subscribe rejected");
            for waiter in group.waiters.drain(..) {
                let _ = waiter.send(Err(Error::reply(reply.envelope.clone())));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    fn counter_callback() -> (TopicCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let captured = Arc::clone(&count);
        let callback: TopicCallback = Arc::new(move |_| {
            captured.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    fn noop() -> TopicCallback {
        Arc::new(|_| {})
    }

    /// Connects the core and returns the captured writer end.
    fn connect(core: &mut ChannelCore) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        assert!(core.begin_connect());
        core.open(core.epoch(), tx);
        rx
    }

    fn ack(core: &mut ChannelCore, msg_id: u64) -> Vec<(TopicCallback, Value)> {
        let frame = json!({"head": {"ok": true, "msgId": msg_id}, "body": null});
        core.receive(&frame.to_string())
    }

    fn dispatch(batch: Vec<(TopicCallback, Value)>) {
        for (callback, value) in batch {
            callback(&value);
        }
    }

    #[test]
    fn test_first_subscribe_sends_one_control_message() {
        let mut core = ChannelCore::new();
        let mut wire = connect(&mut core);

        let (_, ack_rx) = core.subscribe("f1", noop()).expect("subscribe");
        assert!(ack_rx.is_some());
        assert_eq!(core.subscription_count(), 1);

        let frame: Value = serde_json::from_str(&wire.try_recv().expect("frame")).expect("json");
        assert_eq!(frame["type"], "subscribe");
        assert_eq!(frame["flowId"], "f1");
        assert_eq!(frame["msgId"], 1);

        // Second subscribe to the same topic reuses the group.
        let (_, second_ack) = core.subscribe("f1", noop()).expect("subscribe");
        assert!(second_ack.is_some());
        assert_eq!(core.subscription_count(), 1);
        assert!(wire.try_recv().is_err());
    }

    #[test]
    fn test_subscribe_after_ack_registers_immediately() {
        let mut core = ChannelCore::new();
        let mut wire = connect(&mut core);

        core.subscribe("f1", noop()).expect("subscribe");
        wire.try_recv().expect("subscribe frame");
        ack(&mut core, 1);

        let (_, ack_rx) = core.subscribe("f1", noop()).expect("subscribe");
        assert!(ack_rx.is_none());
        assert!(wire.try_recv().is_err());
    }

    #[test]
    fn test_unsubscribe_only_on_last_removal() {
        let mut core = ChannelCore::new();
        let mut wire = connect(&mut core);

        let (id_a, _) = core.subscribe("f1", noop()).expect("subscribe");
        let (id_b, _) = core.subscribe("f1", noop()).expect("subscribe");
        let (id_c, _) = core.subscribe("f1", noop()).expect("subscribe");
        wire.try_recv().expect("subscribe frame");
        ack(&mut core, 1);

        core.unsubscribe("f1", id_a);
        core.unsubscribe("f1", id_b);
        assert!(wire.try_recv().is_err(), "no unsubscribe before last removal");

        core.unsubscribe("f1", id_c);
        let frame: Value = serde_json::from_str(&wire.try_recv().expect("frame")).expect("json");
        assert_eq!(frame["type"], "unsubscribe");
        assert_eq!(core.subscription_count(), 0);

        // Idempotent: repeating the removal sends nothing.
        core.unsubscribe("f1", id_c);
        assert!(wire.try_recv().is_err());
    }

    #[test]
    fn test_sends_queue_fifo_while_disconnected() {
        let mut core = ChannelCore::new();

        for tag in ["a", "b", "c"] {
            core.send_expect_reply(json!({"value": tag})).expect("send");
        }
        assert_eq!(core.pending_count(), 3);

        let mut wire = connect(&mut core);
        let order: Vec<String> = std::iter::from_fn(|| wire.try_recv().ok())
            .map(|text| {
                let v: Value = serde_json::from_str(&text).expect("json");
                v["value"].as_str().expect("tag").to_string()
            })
            .collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_reply_resolves_exactly_once() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);

        let mut rx = core.send_expect_reply(json!({"object": "flow"})).expect("send");

        let frame = json!({"head": {"ok": true, "msgId": 1}, "body": {"id": "f1"}});
        core.receive(&frame.to_string());

        let body = rx.try_recv().expect("settled").expect("ok");
        assert_eq!(body, json!({"id": "f1"}));
        assert_eq!(core.pending_count(), 0);

        // A duplicate reply for the same identifier has no effect.
        core.receive(&frame.to_string());
        assert_eq!(core.pending_count(), 0);
    }

    #[test]
    fn test_nack_reply_rejects_with_envelope() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);

        let mut rx = core.send_expect_reply(json!({"object": "flow"})).expect("send");

        let frame = json!({"head": {"ok": false, "msgId": 1, "status": 403}, "body": null});
        core.receive(&frame.to_string());

        let err = rx.try_recv().expect("settled").unwrap_err();
        let envelope = err.reply_envelope().expect("envelope");
        assert_eq!(envelope["head"]["status"], 403);
    }

    #[test]
    fn test_push_dispatches_to_flow_id_and_path_groups() {
        let mut core = ChannelCore::new();
        let mut wire = connect(&mut core);

        let (by_id, id_count) = counter_callback();
        let (by_path, path_count) = counter_callback();
        core.subscribe("f1", by_id).expect("subscribe");
        core.subscribe("/a/b", by_path).expect("subscribe");
        wire.try_recv().expect("frame");
        wire.try_recv().expect("frame");
        ack(&mut core, 1);
        ack(&mut core, 2);

        let push = json!({
            "type": "message",
            "value": {"flowId": "f1", "path": "/a/b", "elems": 1}
        });
        let batch = core.receive(&push.to_string());
        assert_eq!(batch.len(), 2);
        dispatch(batch);

        assert_eq!(id_count.load(Ordering::SeqCst), 1);
        assert_eq!(path_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_push_before_ack_reaches_no_callbacks() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);

        core.subscribe("f1", noop()).expect("subscribe");

        let push = json!({"type": "message", "value": {"flowId": "f1"}});
        assert!(core.receive(&push.to_string()).is_empty());
    }

    #[test]
    fn test_ack_settles_waiters_and_activates_deferred() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);

        let (callback, count) = counter_callback();
        let (_, ack_rx) = core.subscribe("f1", callback).expect("subscribe");
        let mut ack_rx = ack_rx.expect("waiting");
        assert!(ack_rx.try_recv().is_err(), "not settled before ack");

        ack(&mut core, 1);
        ack_rx.try_recv().expect("settled").expect("ok");

        let push = json!({"type": "message", "value": {"flowId": "f1"}});
        dispatch(core.receive(&push.to_string()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_nack_fails_waiters_and_drops_group() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);

        let (_, ack_rx) = core.subscribe("f1", noop()).expect("subscribe");
        let mut ack_rx = ack_rx.expect("waiting");

        let frame = json!({"head": {"ok": false, "msgId": 1}, "body": null});
        core.receive(&frame.to_string());

        let err = ack_rx.try_recv().expect("settled").unwrap_err();
        assert!(err.is_reply_error());
        assert_eq!(core.subscription_count(), 0);
    }

    #[test]
    fn test_cleanup_discards_everything() {
        let mut core = ChannelCore::new();
        let mut wire = connect(&mut core);

        let (callback, count) = counter_callback();
        core.subscribe("f1", callback).expect("subscribe");
        wire.try_recv().expect("frame");
        ack(&mut core, 1);
        let mut reply_rx = core.send_expect_reply(json!({"object": "flow"})).expect("send");

        let epoch = core.epoch();
        assert!(core.cleanup(epoch));

        // Pending replies reject instead of stalling forever.
        let err = reply_rx.try_recv().expect("settled").unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));

        // Replaying the raw frame reaches no discarded callback.
        let push = json!({"type": "message", "value": {"flowId": "f1"}});
        assert!(core.receive(&push.to_string()).is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        // Identifier counter reset: next send is msgId 1 again.
        assert_eq!(core.state(), ConnectionState::Disconnected);
        let mut wire = connect(&mut core);
        core.send_expect_reply(json!({})).expect("send");
        let frame: Value = serde_json::from_str(&wire.try_recv().expect("frame")).expect("json");
        assert_eq!(frame["msgId"], 1);
    }

    #[test]
    fn test_stale_epoch_events_ignored() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);
        let old_epoch = core.epoch();

        assert!(core.cleanup(old_epoch));
        // The same socket reporting close again must not tear down the
        // next connection.
        assert!(!core.cleanup(old_epoch));

        let _wire = connect(&mut core);
        assert_eq!(core.state(), ConnectionState::Connected);
        assert!(!core.cleanup(old_epoch));
        assert_eq!(core.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_connect_is_noop_while_connected() {
        let mut core = ChannelCore::new();
        let _wire = connect(&mut core);
        assert!(!core.begin_connect());
        assert_eq!(core.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_open_lifecycle_broadcast() {
        let mut core = ChannelCore::new();
        let mut events = core.lifecycle_receiver();
        let _wire = connect(&mut core);
        assert_eq!(events.try_recv().expect("event"), LifecycleEvent::Open);
    }

    #[test]
    fn test_queued_subscribe_drains_on_connect() {
        let mut core = ChannelCore::new();

        core.subscribe("/a", noop()).expect("subscribe");
        let mut wire = connect(&mut core);

        let frame: Value = serde_json::from_str(&wire.try_recv().expect("frame")).expect("json");
        assert_eq!(frame["type"], "subscribe");
        assert_eq!(frame["path"], "/a");
    }
}
