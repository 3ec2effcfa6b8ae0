use parking_lot::{Condvar, Mutex};

/// A manual-reset event: a latch that stays signaled until explicitly reset.
///
/// Waiters block while the event is unset and pass through immediately once it
/// is set. A signal issued before any wait is never lost, and a single signal
/// releases every current waiter (the state is sticky, not one-shot).
#[derive(Debug, Default)]
pub struct Event {
    signaled: Mutex<bool>,
    cond: Condvar,
}

impl Event {
    /// Create a new event in the unset state
    pub fn new() -> Self {
        Self {
            signaled: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Set the event and wake all current waiters. Idempotent.
    pub fn signal(&self) {
        let mut signaled = self.signaled.lock();
        *signaled = true;
        self.cond.notify_all();
    }

    /// Clear the event. Waits that already returned are unaffected.
    pub fn reset(&self) {
        *self.signaled.lock() = false;
    }

    /// Block until the event is set. Returns immediately if already set.
    pub fn wait(&self) {
        let mut signaled = self.signaled.lock();
        // Loop guards against spurious wakeups.
        while !*signaled {
            self.cond.wait(&mut signaled);
        }
    }

    /// Whether the event is currently set
    pub fn is_signaled(&self) -> bool {
        *self.signaled.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_signal_before_wait_is_not_lost() {
        let event = Event::new();
        event.signal();
        // Must return without blocking.
        event.wait();
        assert!(event.is_signaled());
    }

    #[test]
    fn test_signal_is_sticky_until_reset() {
        let event = Event::new();
        event.signal();
        event.wait();
        event.wait();
        assert!(event.is_signaled());

        event.reset();
        assert!(!event.is_signaled());
    }

    #[test]
    fn test_signal_is_idempotent() {
        let event = Event::new();
        event.signal();
        event.signal();
        assert!(event.is_signaled());
    }

    #[test]
    fn test_broadcast_releases_all_waiters() {
        let event = Arc::new(Event::new());
        let released = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let event = Arc::clone(&event);
                let released = Arc::clone(&released);
                thread::spawn(move || {
                    event.wait();
                    released.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        // Give the waiters time to block before signaling.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(released.load(Ordering::SeqCst), 0);

        event.signal();
        for waiter in waiters {
            waiter.join().expect("waiter panicked");
        }
        assert_eq!(released.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_wait_blocks_until_signal() {
        let event = Arc::new(Event::new());

        let waiter = {
            let event = Arc::clone(&event);
            thread::spawn(move || {
                event.wait();
            })
        };

        thread::sleep(Duration::from_millis(20));
        event.signal();
        waiter.join().expect("waiter panicked");
    }
}
