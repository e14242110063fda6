//! # Stop Signals
//!
//! Cooperative cancellation for every bounded wait in the arena.
//!
//! A [`StopHandle`] owns the sending half of a channel that never carries a
//! message. Stopping drops the sender, which disconnects the channel and
//! wakes every [`StopSignal`] clone at once. Wait sites put the signal's
//! receiver into a `crossbeam_channel::select!` next to their work and a
//! timer, so whichever fires first wins.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use parking_lot::Mutex;

/// Owner side of a stop signal. Dropping it also fires the signal.
pub struct StopHandle {
    tx: Mutex<Option<Sender<()>>>,
    signal: StopSignal,
}

impl StopHandle {
    /// Creates a handle and the signal it controls.
    #[must_use]
    pub fn new() -> (Self, StopSignal) {
        let (tx, rx) = crossbeam_channel::bounded(0);
        let signal = StopSignal { rx };
        let handle = Self {
            tx: Mutex::new(Some(tx)),
            signal: signal.clone(),
        };
        (handle, signal)
    }

    /// Fires the signal. Calling it again is a no-op.
    pub fn stop(&self) {
        self.tx.lock().take();
    }

    /// Returns another clone of the controlled signal.
    #[must_use]
    pub fn signal(&self) -> StopSignal {
        self.signal.clone()
    }

    /// Returns true once [`Self::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.tx.lock().is_none()
    }
}

impl std::fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopHandle")
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Listener side of a stop signal. Cheap to clone.
#[derive(Clone, Debug)]
pub struct StopSignal {
    rx: Receiver<()>,
}

impl StopSignal {
    /// A signal that never fires.
    #[must_use]
    pub fn never() -> Self {
        Self {
            rx: crossbeam_channel::never(),
        }
    }

    /// Returns true if the signal has fired.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Blocks until the signal fires or `timeout` elapses.
    ///
    /// Returns true if the signal fired.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        matches!(self.rx.recv_timeout(timeout), Err(RecvTimeoutError::Disconnected))
    }

    /// Receiver to place in a `crossbeam_channel::select!`.
    ///
    /// It never yields a message; a `recv` arm on it completes with an error
    /// exactly when the signal fires.
    #[must_use]
    pub fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}
