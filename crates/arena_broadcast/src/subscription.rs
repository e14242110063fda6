//! Subscriber side of a broadcaster.

use std::ops::Deref;

use arena_core::StopHandle;
use crossbeam_channel::Receiver;

/// Output channel of one subscriber.
///
/// Dereferences to the underlying [`Receiver`]. Dropping the subscription
/// ends it: the relay thread exits and the subscriber is unregistered.
/// Receivers cloned out of it disconnect at the same moment.
pub struct Subscription<T> {
    rx: Receiver<T>,
    _guard: StopHandle,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: Receiver<T>, guard: StopHandle) -> Self {
        Self { rx, _guard: guard }
    }
}

impl<T> Deref for Subscription<T> {
    type Target = Receiver<T>;

    fn deref(&self) -> &Receiver<T> {
        &self.rx
    }
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("buffered", &self.rx.len())
            .finish()
    }
}

/// Blocking iterator over a subscription; ends when it disconnects.
#[derive(Debug)]
pub struct IntoIter<T> {
    subscription: Subscription<T>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.subscription.rx.recv().ok()
    }
}

impl<T> IntoIterator for Subscription<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter { subscription: self }
    }
}

impl<'a, T> IntoIterator for &'a Subscription<T> {
    type Item = T;
    type IntoIter = crossbeam_channel::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rx.iter()
    }
}
