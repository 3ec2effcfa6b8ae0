use crate::error::QueueError;
use crate::event::Event;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

/// The literal token that terminates the input stream
pub const SENTINEL: &str = "<END>";

/// An item traveling through the pipeline.
///
/// The end-of-stream marker is a distinct variant rather than a magic string,
/// so transformations can never observe or collide with it. The external
/// protocol still accepts the literal [`SENTINEL`] line; conversion happens at
/// the stage enqueue boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// A line of text owned by whoever currently holds it
    Data(String),
    /// End of stream; always the last item a worker processes
    End,
}

impl WorkItem {
    /// Convert an input line into a work item, recognizing the sentinel
    pub fn from_line(line: &str) -> Self {
        if line == SENTINEL {
            WorkItem::End
        } else {
            WorkItem::Data(line.to_owned())
        }
    }
}

struct Inner {
    items: VecDeque<WorkItem>,
    finished: bool,
}

/// A fixed-capacity FIFO of work items with blocking put and get.
///
/// Producers block while the queue is full; consumers block while it is
/// empty. [`WorkQueue::signal_finished`] flips a monotonic flag that fails all
/// future puts, lets consumers drain what remains, and releases every blocked
/// thread. A capacity of zero yields a permanently empty queue: every put
/// fails, every get returns `None`, finish signaling still works.
pub struct WorkQueue {
    capacity: usize,
    inner: Mutex<Inner>,
    not_full: Condvar,
    not_empty: Condvar,
    finished_event: Event,
}

impl WorkQueue {
    /// Create a queue holding at most `capacity` items
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                finished: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            finished_event: Event::new(),
        }
    }

    /// Maximum number of items the queue can hold
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of queued items
    pub fn len(&self) -> usize {
        self.inner.lock().items.len()
    }

    /// Whether the queue currently holds no items
    pub fn is_empty(&self) -> bool {
        self.inner.lock().items.is_empty()
    }

    /// Whether the queue has been signaled finished
    pub fn is_finished(&self) -> bool {
        self.inner.lock().finished
    }

    /// Add an item, blocking while the queue is full.
    ///
    /// Fails with [`QueueError::Finished`] if the queue is finished (including
    /// while waiting for space), dropping the item. Fails with
    /// [`QueueError::ZeroCapacity`] on a zero-capacity queue.
    pub fn put(&self, item: WorkItem) -> Result<(), QueueError> {
        if self.capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }

        let mut inner = self.inner.lock();
        while inner.items.len() == self.capacity && !inner.finished {
            self.not_full.wait(&mut inner);
        }
        if inner.finished {
            return Err(QueueError::Finished);
        }

        inner.items.push_back(item);
        self.not_empty.notify_all();
        Ok(())
    }

    /// Remove the oldest item, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is finished and drained, or immediately
    /// on a zero-capacity queue. Ownership of the item moves to the caller.
    pub fn get(&self) -> Option<WorkItem> {
        if self.capacity == 0 {
            return None;
        }

        let mut inner = self.inner.lock();
        while inner.items.is_empty() && !inner.finished {
            self.not_empty.wait(&mut inner);
        }

        let item = inner.items.pop_front();
        if item.is_some() {
            self.not_full.notify_all();
        }
        item
    }

    /// Mark the queue finished and release every blocked thread.
    ///
    /// Idempotent and safe to call from multiple threads concurrently.
    pub fn signal_finished(&self) {
        {
            let mut inner = self.inner.lock();
            inner.finished = true;
            self.not_full.notify_all();
            self.not_empty.notify_all();
        }
        self.finished_event.signal();
    }

    /// Block until the queue has been signaled finished
    pub fn wait_finished(&self) {
        self.finished_event.wait();
    }
}
