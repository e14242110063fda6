//! Single-producer, multi-consumer event fan-out.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arena_core::{StopHandle, StopSignal};
use crossbeam_channel::{after, bounded, select, tick, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};

use crate::config::BroadcastConfig;
use crate::error::{BroadcastError, BroadcastResult};
use crate::subscription::Subscription;

/// Lifecycle of a broadcaster. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BroadcastState {
    /// Accepting subscribers and queueing events; nothing is dispatched yet.
    Created,
    /// Dispatcher thread is running.
    Running,
    /// Closed, either explicitly or by the stop signal passed to `start`.
    Stopped,
}

/// Registered subscriber, as seen by the dispatcher.
struct Subscriber<T> {
    id: u64,
    relay: Sender<T>,
}

struct Inner<T> {
    config: BroadcastConfig,
    ingress_tx: Sender<T>,
    ingress_rx: Receiver<T>,
    subscribers: RwLock<Vec<Subscriber<T>>>,
    next_id: AtomicU64,
    state: Mutex<BroadcastState>,
    closer: StopHandle,
    closed: StopSignal,
}

/// Fan-out channel with bounded, drop-oldest delivery.
///
/// ```text
///   publish ──▶ [ingress] ──▶ dispatcher ──┬─▶ [relay 1] ──▶ relay thread ──▶ [output 1]
///                                          ├─▶ [relay 2] ──▶ relay thread ──▶ [output 2]
///                                          └─▶ ...
/// ```
///
/// Each subscriber sees events in ingress order. The dispatcher never waits
/// on a subscriber: an event that does not fit a full relay queue is dropped
/// for that subscriber only. A subscriber whose output is full loses its
/// oldest buffered event to make room; if even that does not succeed within
/// the send timeout the new event is dropped.
///
/// Cloning yields another handle to the same broadcaster.
pub struct Broadcaster<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Broadcaster<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + 'static> Broadcaster<T> {
    /// Creates a broadcaster in the `Created` state.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn new(config: BroadcastConfig) -> BroadcastResult<Self> {
        config.validate()?;

        let (ingress_tx, ingress_rx) = bounded(config.ingress_capacity);
        let (closer, closed) = StopHandle::new();

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                ingress_tx,
                ingress_rx,
                subscribers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(0),
                state: Mutex::new(BroadcastState::Created),
                closer,
                closed,
            }),
        })
    }

    /// Queues `event` for every subscriber.
    ///
    /// Blocks until the ingress queue accepts it, the broadcaster closes, or
    /// the send timeout elapses.
    ///
    /// # Errors
    ///
    /// [`BroadcastError::Stopped`] after close, [`BroadcastError::Timeout`]
    /// if the ingress queue stayed full.
    pub fn publish(&self, event: T) -> BroadcastResult<()> {
        let inner = &self.inner;
        if inner.closed.is_stopped() {
            return Err(BroadcastError::Stopped);
        }

        select! {
            send(inner.ingress_tx, event) -> sent => sent.map_err(|_| BroadcastError::Stopped),
            recv(inner.closed.receiver()) -> _ => Err(BroadcastError::Stopped),
            default(inner.config.send_timeout()) => Err(BroadcastError::Timeout {
                timeout_ms: inner.config.send_timeout_ms,
            }),
        }
    }

    /// Queues `event` only if the ingress queue has room right now.
    ///
    /// # Errors
    ///
    /// [`BroadcastError::Stopped`] after close, [`BroadcastError::Full`] if
    /// the ingress queue is full.
    pub fn try_publish(&self, event: T) -> BroadcastResult<()> {
        if self.inner.closed.is_stopped() {
            return Err(BroadcastError::Stopped);
        }
        match self.inner.ingress_tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(BroadcastError::Full),
            Err(TrySendError::Disconnected(_)) => Err(BroadcastError::Stopped),
        }
    }

    /// Starts the dispatcher thread. Only the first call has an effect.
    ///
    /// When `stop` fires the broadcaster closes.
    pub fn start(&self, stop: &StopSignal) {
        {
            let mut state = self.inner.state.lock();
            if *state != BroadcastState::Created {
                return;
            }
            *state = BroadcastState::Running;
        }

        let inner = Arc::clone(&self.inner);
        let stop = stop.clone();
        thread::spawn(move || inner.dispatch(&stop));

        tracing::debug!("broadcaster started");
    }

    /// Registers a subscriber and returns its output channel.
    ///
    /// The output holds at most `capacity` events (at least one). The
    /// subscription ends when `stop` fires, the broadcaster closes or the
    /// returned [`Subscription`] is dropped; the receiver then yields what is
    /// still buffered and disconnects.
    pub fn subscribe(&self, stop: &StopSignal, capacity: usize) -> Subscription<T> {
        let (output_tx, output_rx) = bounded(capacity.max(1));
        let (relay_tx, relay_rx) = bounded(self.inner.config.relay_capacity);
        let (guard, abandoned) = StopHandle::new();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);

        {
            let mut subscribers = self.inner.subscribers.write();
            // Checked under the lock so a concurrent close cannot miss us
            if self.inner.closed.is_stopped() {
                return Subscription::new(output_rx, guard);
            }
            subscribers.push(Subscriber { id, relay: relay_tx });
        }

        let relay = Relay {
            id,
            inner: Arc::clone(&self.inner),
            relay_rx,
            output_tx,
            output_rx: output_rx.clone(),
            stop: stop.clone(),
            abandoned,
        };
        thread::spawn(move || relay.run());

        tracing::debug!(subscriber = id, capacity, "subscriber registered");
        Subscription::new(output_rx, guard)
    }

    /// Closes the broadcaster: stops accepting events and disconnects every
    /// subscriber. Idempotent.
    pub fn close(&self) {
        self.inner.close();
    }
}

impl<T> Broadcaster<T> {
    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> BroadcastState {
        *self.inner.state.lock()
    }

    /// Returns true while the dispatcher is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == BroadcastState::Running
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &BroadcastConfig {
        &self.inner.config
    }
}

impl<T> std::fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<T: Clone> Inner<T> {
    /// Dispatcher thread main loop.
    fn dispatch(&self, stop: &StopSignal) {
        loop {
            select! {
                recv(self.ingress_rx) -> event => match event {
                    Ok(event) => self.fan_out(&event),
                    Err(_) => break,
                },
                recv(stop.receiver()) -> _ => break,
                recv(self.closed.receiver()) -> _ => break,
            }
        }

        self.close();
    }

    /// Pushes one event into every relay queue, in registration order.
    /// Never waits on a subscriber.
    fn fan_out(&self, event: &T) {
        let subscribers = self.subscribers.read();

        for subscriber in subscribers.iter() {
            match subscriber.relay.try_send(event.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    tracing::trace!(subscriber = subscriber.id, "relay queue full, event dropped");
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::trace!(subscriber = subscriber.id, "relay gone, event skipped");
                }
            }
        }
    }
}

impl<T> Inner<T> {
    fn close(&self) {
        {
            let mut state = self.state.lock();
            if *state == BroadcastState::Stopped {
                return;
            }
            *state = BroadcastState::Stopped;
        }
        self.closer.stop();

        let dropped = {
            let mut subscribers = self.subscribers.write();
            let count = subscribers.len();
            // Dropping the relay senders ends every relay thread
            subscribers.clear();
            count
        };

        tracing::debug!(subscribers = dropped, "broadcaster stopped");
    }

    fn unregister(&self, id: u64) {
        self.subscribers.write().retain(|subscriber| subscriber.id != id);
    }
}

/// Per-subscriber relay thread state.
struct Relay<T> {
    id: u64,
    inner: Arc<Inner<T>>,
    relay_rx: Receiver<T>,
    output_tx: Sender<T>,
    /// Used to evict the oldest buffered event.
    output_rx: Receiver<T>,
    stop: StopSignal,
    /// Fires when the caller drops its [`Subscription`].
    abandoned: StopSignal,
}

impl<T> Relay<T> {
    fn run(self) {
        loop {
            select! {
                recv(self.relay_rx) -> event => match event {
                    Ok(event) => {
                        if !self.deliver(event) {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(self.stop.receiver()) -> _ => break,
                recv(self.abandoned.receiver()) -> _ => break,
                recv(self.inner.closed.receiver()) -> _ => break,
            }
        }

        let Self {
            id,
            inner,
            relay_rx,
            output_tx,
            output_rx,
            ..
        } = self;

        let pending = relay_rx.try_iter().count();
        drop(relay_rx);
        drop(output_tx);
        drop(output_rx);
        inner.unregister(id);

        tracing::debug!(subscriber = id, pending, "subscriber removed");
    }

    /// Forwards one event with timeout + overwrite-oldest.
    ///
    /// Returns false if a stop signal fired while waiting.
    fn deliver(&self, event: T) -> bool {
        let mut event = match self.output_tx.try_send(event) {
            Ok(()) => return true,
            Err(TrySendError::Full(event)) => event,
            Err(TrySendError::Disconnected(_)) => return false,
        };

        let timeout = self.inner.config.send_timeout();
        let deadline = after(timeout);
        let sample = tick((timeout / 5).max(Duration::from_micros(100)));

        loop {
            select! {
                recv(sample) -> _ => {
                    if self.output_tx.is_full() {
                        // Make room by discarding the oldest buffered event
                        let _ = self.output_rx.try_recv();
                    }
                    match self.output_tx.try_send(event) {
                        Ok(()) => return true,
                        Err(TrySendError::Full(back)) => event = back,
                        Err(TrySendError::Disconnected(_)) => return false,
                    }
                }
                recv(deadline) -> _ => {
                    tracing::trace!(subscriber = self.id, "output full, event dropped");
                    return true;
                }
                recv(self.stop.receiver()) -> _ => return false,
                recv(self.abandoned.receiver()) -> _ => return false,
                recv(self.inner.closed.receiver()) -> _ => return false,
            }
        }
    }
}
