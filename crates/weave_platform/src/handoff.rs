//! Blocking single-slot handoff between two threads
//!
//! A [`Handoff`] carries exactly one value from a producer thread to a
//! consumer that blocks until it arrives. It is used for the startup
//! rendezvous with the toolkit thread and for returning results computed on
//! that thread to whoever submitted the work.
//!
//! Callers are expected to have at most one outstanding [`Handoff::take`]
//! per instance; the slot may be reused once a take has completed.

use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// Single-slot blocking handoff
pub struct Handoff<T> {
    slot: Mutex<Option<T>>,
    ready: Condvar,
}

impl<T> Handoff<T> {
    /// Create an empty handoff
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        }
    }

    /// Store a value and wake one blocked taker
    ///
    /// Putting into a slot that still holds an untaken value replaces it.
    pub fn put(&self, value: T) {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            tracing::warn!("handoff already held a value, replacing it");
        }
        *slot = Some(value);
        self.ready.notify_one();
    }

    /// Block until a value is present, then consume it
    ///
    /// If the producer never calls [`put`](Self::put) this blocks forever;
    /// use [`take_timeout`](Self::take_timeout) where that must be bounded.
    pub fn take(&self) -> T {
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.take() {
                return value;
            }
            self.ready.wait(&mut slot);
        }
    }

    /// Like [`take`](Self::take), giving up after `timeout`
    pub fn take_timeout(&self, timeout: Duration) -> Option<T> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.take());
        };
        let mut slot = self.slot.lock();
        loop {
            if let Some(value) = slot.take() {
                return Some(value);
            }
            if self.ready.wait_until(&mut slot, deadline).timed_out() {
                return slot.take();
            }
        }
    }

    /// Consume the value if one is present, without blocking
    pub fn try_take(&self) -> Option<T> {
        self.slot.lock().take()
    }

    /// Whether the slot is currently empty
    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }
}

impl<T> Default for Handoff<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Handoff<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handoff")
            .field("filled", &!self.is_empty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_take_returns_value_put_from_other_thread() {
        let handoff = Arc::new(Handoff::new());
        let producer = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                handoff.put(42u32);
            })
        };

        assert_eq!(handoff.take(), 42);
        assert!(handoff.is_empty());
        producer.join().unwrap();
    }

    #[test]
    fn test_take_timeout_expires_when_nothing_is_put() {
        let handoff: Handoff<()> = Handoff::new();
        let started = Instant::now();
        assert!(handoff.take_timeout(Duration::from_millis(30)).is_none());
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_reuse_after_take() {
        let handoff = Handoff::new();
        handoff.put("first");
        assert_eq!(handoff.take(), "first");
        handoff.put("second");
        assert_eq!(handoff.try_take(), Some("second"));
        assert_eq!(handoff.try_take(), None);
    }

    #[test]
    fn test_put_replaces_untaken_value() {
        let handoff = Handoff::new();
        handoff.put(1);
        handoff.put(2);
        assert_eq!(handoff.take(), 2);
    }

    #[test]
    fn test_take_timeout_with_unbounded_wait() {
        let handoff = Handoff::new();
        handoff.put(7u8);
        assert_eq!(handoff.take_timeout(Duration::MAX), Some(7));
    }
}
