//! Message channel: public API and socket task.
//!
//! One [`MessageChannel`] multiplexes request/response pairs and topic
//! subscriptions over a single socket. Sends while disconnected are
//! queued and drained, in order, on the next successful connect. There
//! is no automatic reconnect: connection loss is terminal until the
//! caller connects again, announced through the lifecycle events.
//!
//! # Socket task
//!
//! Each successful connect spawns one task that owns the socket for its
//! epoch. The task `select!`s over:
//!
//! - outbound frames handed over by the state machine,
//! - inbound frames, fed back into the state machine,
//! - the heartbeat timer, a one-shot rearmed after every firing.
//!
//! On socket error or close the task tears down the channel state and
//! broadcasts the matching lifecycle event, then exits. A task from a
//! previous epoch cannot touch the state of a newer connection.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, sleep};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, trace};

use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::protocol;

use super::LifecycleEvent;
use super::core::{ChannelCore, ConnectionState, TopicCallback};
use super::session::{SessionNegotiator, WsStream};

// ============================================================================
// Constants
// ============================================================================

/// Heartbeat period (30s per protocol).
const HEARTBEAT_PERIOD: Duration = Duration::from_millis(30_000);

/// Close code reported when the peer sent no close frame.
const CLOSE_NO_STATUS: u16 = 1005;

/// Close code reported when the stream ended without a close handshake.
const CLOSE_ABNORMAL: u16 = 1006;

// ============================================================================
// MessageChannel
// ============================================================================

/// A stateful, single-connection WebSocket client.
///
/// Cheap to clone; clones share the same connection and state.
#[derive(Clone)]
pub struct MessageChannel {
    core: Arc<Mutex<ChannelCore>>,
    negotiator: Arc<dyn SessionNegotiator>,
    credentials: Credentials,
    heartbeat_period: Duration,
}

impl MessageChannel {
    /// Creates a disconnected channel.
    #[must_use]
    pub fn new(credentials: Credentials, negotiator: Arc<dyn SessionNegotiator>) -> Self {
        Self {
            core: Arc::new(Mutex::new(ChannelCore::new())),
            negotiator,
            credentials,
            heartbeat_period: HEARTBEAT_PERIOD,
        }
    }

    /// Overrides the heartbeat period.
    #[inline]
    #[must_use]
    pub fn with_heartbeat_period(mut self, period: Duration) -> Self {
        self.heartbeat_period = period;
        self
    }

    /// Current connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.core.lock().state()
    }

    /// Registers a lifecycle observer.
    ///
    /// Events: [`LifecycleEvent::Open`] after each successful connect,
    /// [`LifecycleEvent::Close`] with the peer's code and reason, and
    /// [`LifecycleEvent::Error`] on socket failure.
    #[must_use]
    pub fn lifecycle(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.core.lock().lifecycle_receiver()
    }

    /// Connects the channel.
    ///
    /// A no-op when already connected. Otherwise negotiates a session,
    /// spawns the socket task, drains the outbound queue in FIFO order,
    /// and broadcasts [`LifecycleEvent::Open`].
    ///
    /// # Errors
    ///
    /// - [`Error::Handshake`] if session negotiation fails; the channel
    ///   stays disconnected and its queue is preserved
    /// - [`Error::Connection`] if the socket cannot be opened
    pub async fn connect(&self) -> Result<()> {
        if !self.core.lock().begin_connect() {
            trace!("connect: already connected");
            return Ok(());
        }

        let socket = match self.negotiator.connect(&self.credentials).await {
            Ok(socket) => socket,
            Err(e) => {
                self.core.lock().abort_connect();
                return Err(e);
            }
        };

        let epoch = self.core.lock().epoch();
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();

        tokio::spawn(run_socket(
            Arc::clone(&self.core),
            socket,
            writer_rx,
            epoch,
            self.heartbeat_period,
        ));

        self.core.lock().open(epoch, writer_tx);
        debug!(epoch, "channel connected");
        Ok(())
    }

    /// Sends a message and awaits its correlated reply body.
    ///
    /// The message is stamped with the next message identifier. While
    /// disconnected the transmit is queued; the reply then only arrives
    /// after a successful connect.
    ///
    /// # Errors
    ///
    /// - [`Error::Reply`] when the server answers with `head.ok == false`
    /// - [`Error::ConnectionClosed`] when the connection is torn down
    ///   before the reply arrives
    pub async fn send(&self, message: Value) -> Result<Value> {
        let rx = self.core.lock().send_expect_reply(message)?;
        rx.await.map_err(|_| Error::ConnectionClosed)?
    }

    /// Sends a message with no reply tracking.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the message cannot be serialized.
    pub fn send_no_reply(&self, message: &Value) -> Result<()> {
        self.core.lock().send_no_reply(message)
    }

    /// Subscribes a callback to a topic.
    ///
    /// A topic starting with `/` is a path; anything else is a flow id.
    /// The first subscription to a topic transmits one subscribe control
    /// message; the callback joins the dispatch set once that message is
    /// acknowledged ([`Subscription::acknowledged`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the control message cannot be built.
    pub fn subscribe(
        &self,
        topic: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> Result<Subscription> {
        let callback: TopicCallback = Arc::new(callback);
        let (callback_id, ack) = self.core.lock().subscribe(topic, callback)?;

        Ok(Subscription {
            inner: Arc::new(SubscriptionInner {
                core: Arc::clone(&self.core),
                topic: topic.to_string(),
                callback_id,
                active: AtomicBool::new(true),
            }),
            ack,
        })
    }

    /// Subscribes a callback whose lifetime is bound to a cancellation
    /// scope: when `scope` is cancelled, the subscription is removed
    /// exactly once.
    ///
    /// # Errors
    ///
    /// Same as [`MessageChannel::subscribe`].
    pub fn subscribe_scoped(
        &self,
        topic: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
        scope: &CancellationToken,
    ) -> Result<Subscription> {
        let subscription = self.subscribe(topic, callback)?;
        subscription.bind(scope);
        Ok(subscription)
    }
}

// ============================================================================
// Subscription
// ============================================================================

struct SubscriptionInner {
    core: Arc<Mutex<ChannelCore>>,
    topic: String,
    callback_id: u64,
    active: AtomicBool,
}

impl SubscriptionInner {
    fn unsubscribe(&self) {
        // Swap makes removal exactly-once across handle, scope task,
        // and repeated calls.
        if self.active.swap(false, Ordering::SeqCst) {
            self.core.lock().unsubscribe(&self.topic, self.callback_id);
        }
    }
}

/// Handle to one registered topic callback.
///
/// Dropping the handle does NOT unsubscribe; call
/// [`Subscription::unsubscribe`] or bind it to a cancellation scope.
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
    ack: Option<oneshot::Receiver<Result<()>>>,
}

impl Subscription {
    /// The subscribed topic.
    #[inline]
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.inner.topic
    }

    /// Waits for the subscribe acknowledgment.
    ///
    /// Resolves immediately when the topic's registration was already
    /// acknowledged, and on every later call.
    ///
    /// # Errors
    ///
    /// - [`Error::Reply`] when the server rejects the subscribe
    /// - [`Error::ConnectionClosed`] when the connection is torn down
    ///   before the acknowledgment arrives
    pub async fn acknowledged(&mut self) -> Result<()> {
        match self.ack.take() {
            None => Ok(()),
            Some(rx) => rx.await.map_err(|_| Error::ConnectionClosed)?,
        }
    }

    /// Removes the callback from the topic's dispatch set.
    ///
    /// Removing the last callback for a topic transmits one
    /// fire-and-forget unsubscribe control message. Idempotent.
    pub fn unsubscribe(&self) {
        self.inner.unsubscribe();
    }

    /// Binds the subscription to a cancellation scope: cancellation
    /// triggers [`Subscription::unsubscribe`] exactly once.
    pub fn bind(&self, scope: &CancellationToken) {
        let inner = Arc::clone(&self.inner);
        let token = scope.clone();
        tokio::spawn(async move {
            token.cancelled().await;
            inner.unsubscribe();
        });
    }
}

// ============================================================================
// Socket Task
// ============================================================================

/// Owns the socket for one connection epoch.
async fn run_socket(
    core: Arc<Mutex<ChannelCore>>,
    socket: WsStream,
    mut writer_rx: mpsc::UnboundedReceiver<String>,
    epoch: u64,
    heartbeat_period: Duration,
) {
    let (mut sink, mut stream) = socket.split();
    let heartbeat = sleep(heartbeat_period);
    tokio::pin!(heartbeat);

    loop {
        tokio::select! {
            () = heartbeat.as_mut() => {
                trace!("heartbeat");
                let frame = protocol::heartbeat().to_string();
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    error!(error = %e, "heartbeat write failed");
                    fail(&core, epoch);
                    return;
                }
                heartbeat.as_mut().reset(Instant::now() + heartbeat_period);
            }

            outbound = writer_rx.recv() => {
                match outbound {
                    Some(text) => {
                        if let Err(e) = sink.send(Message::Text(text.into())).await {
                            error!(error = %e, "socket write failed");
                            fail(&core, epoch);
                            return;
                        }
                    }
                    // Writer handle discarded by cleanup: this epoch is
                    // over, close the socket quietly.
                    None => {
                        let _ = sink.close().await;
                        return;
                    }
                }
            }

            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let batch = core.lock().receive(text.as_str());
                        for (callback, value) in batch {
                            callback(&value);
                        }
                    }

                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = frame
                            .map(|f| (u16::from(f.code), f.reason.as_str().to_string()))
                            .unwrap_or((CLOSE_NO_STATUS, String::new()));
                        debug!(code, "socket closed by peer");
                        close(&core, epoch, code, reason);
                        return;
                    }

                    Some(Err(e)) => {
                        error!(error = %e, "socket error");
                        fail(&core, epoch);
                        return;
                    }

                    None => {
                        debug!("socket stream ended");
                        close(&core, epoch, CLOSE_ABNORMAL, String::new());
                        return;
                    }

                    // Ignore Binary, Ping, Pong, Frame
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// Cleanup then broadcast the error lifecycle event.
fn fail(core: &Arc<Mutex<ChannelCore>>, epoch: u64) {
    let mut core = core.lock();
    if core.cleanup(epoch) {
        core.notify(LifecycleEvent::Error);
    }
}

/// Cleanup then broadcast the close lifecycle event.
fn close(core: &Arc<Mutex<ChannelCore>>, epoch: u64, code: u16, reason: String) {
    let mut core = core.lock();
    if core.cleanup(epoch) {
        core.notify(LifecycleEvent::Close { code, reason });
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    /// Negotiator that always rejects the handshake.
    struct RefusingNegotiator;

    #[async_trait]
    impl SessionNegotiator for RefusingNegotiator {
        async fn connect(&self, _credentials: &Credentials) -> Result<WsStream> {
            Err(Error::handshake("refused"))
        }
    }

    fn channel() -> MessageChannel {
        MessageChannel::new(
            Credentials::new("acct", "tok"),
            Arc::new(RefusingNegotiator),
        )
    }

    #[tokio::test]
    async fn test_failed_handshake_leaves_channel_disconnected() {
        let channel = channel();

        let err = channel.connect().await.unwrap_err();
        assert!(matches!(err, Error::Handshake { .. }));
        assert_eq!(channel.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent_across_clones() {
        let channel = channel();

        let subscription = channel.subscribe("f1", |_| {}).expect("subscribe");
        assert_eq!(channel.core.lock().subscription_count(), 1);

        subscription.unsubscribe();
        subscription.unsubscribe();
        assert_eq!(channel.core.lock().subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_scope_cancellation_unsubscribes_once() {
        let channel = channel();
        let scope = CancellationToken::new();

        let _subscription = channel
            .subscribe_scoped("f1", |_| {}, &scope)
            .expect("subscribe");
        assert_eq!(channel.core.lock().subscription_count(), 1);

        scope.cancel();
        // The teardown task runs on the same runtime; yield until it has.
        for _ in 0..50 {
            tokio::task::yield_now().await;
            if channel.core.lock().subscription_count() == 0 {
                break;
            }
        }
        assert_eq!(channel.core.lock().subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_send_while_disconnected_queues() {
        let channel = channel();
        // The reply future stays pending; only the queueing is observed.
        let _pending = {
            let mut core = channel.core.lock();
            core.send_expect_reply(serde_json::json!({"object": "flow"}))
                .expect("send")
        };
        assert_eq!(channel.core.lock().pending_count(), 1);
    }
}
