//! FIFO holding area for requests not yet dispatched

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::request::Request;

/// Thread-safe FIFO of pending [`Request`]s
///
/// `enqueue` is fire-and-forget and never blocks beyond the internal lock;
/// `drain_all` atomically removes and returns the full contents, so an entry
/// is handed out exactly once even with enqueues racing in from worker
/// threads.
#[derive(Debug, Default)]
pub struct RequestQueue {
    entries: Mutex<VecDeque<Request>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a request to the tail
    pub fn enqueue(&self, request: Request) {
        self.lock().push_back(request);
    }

    /// Atomically remove and return the full current contents, in order
    pub fn drain_all(&self) -> Vec<Request> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Request>> {
        // The queue is a leaf lock and nothing can panic while holding it,
        // so poisoning cannot leave partial state behind.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
