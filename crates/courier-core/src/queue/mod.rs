//! Queue module: bounded priority queue shared between submitters and workers.

mod priority;

pub use priority::PriorityQueue;

use std::sync::Arc;

use tokio::sync::{Mutex, Notify};

/// Why `SharedQueue::try_push_with` refused an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PushError {
    #[error("queue is full (capacity {capacity})")]
    Full { capacity: usize },

    #[error("queue is closed")]
    Closed,
}

struct State<T> {
    queue: PriorityQueue<T>,
    closed: bool,
}

/// `PriorityQueue` behind an async mutex, with a `Notify` to wake idle workers.
///
/// Design:
/// - The lock is never held across an `.await` other than acquiring it.
/// - Workers wait on `pop()`; every successful push wakes one of them.
/// - `close()` flips a flag under the same lock pushes take, so no push can
///   land after `close()` returns.
pub struct SharedQueue<T> {
    inner: Arc<Mutex<State<T>>>,
    notify: Arc<Notify>,
}

impl<T> Clone for SharedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            notify: Arc::clone(&self.notify),
        }
    }
}

impl<T: Send> SharedQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                queue: PriorityQueue::new(capacity),
                closed: false,
            })),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Build and push an item only if the queue is open and has room.
    ///
    /// `make` runs under the queue lock, after both checks, so side effects
    /// it performs (creating the status record) never happen for a rejected
    /// submission. Returns whatever `make` returned alongside the item.
    pub async fn try_push_with<R>(
        &self,
        priority: i32,
        make: impl FnOnce() -> (T, R),
    ) -> Result<R, PushError> {
        let mut state = self.inner.lock().await;
        if state.closed {
            return Err(PushError::Closed);
        }
        if state.queue.is_full() {
            return Err(PushError::Full {
                capacity: state.queue.capacity(),
            });
        }
        let (item, out) = make();
        if state.queue.push(priority, item).is_err() {
            return Err(PushError::Full {
                capacity: state.queue.capacity(),
            });
        }
        drop(state);
        self.notify.notify_one();
        Ok(out)
    }

    /// Refuse further pushes. Items already queued stay poppable.
    pub async fn close(&self) {
        self.inner.lock().await.closed = true;
    }

    pub async fn is_closed(&self) -> bool {
        self.inner.lock().await.closed
    }

    /// Wait for the highest-priority item.
    pub async fn pop(&self) -> T {
        loop {
            // register as a waiter before looking, so a push in between wakes us
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(item) = self.inner.lock().await.queue.pop() {
                return item;
            }
            notified.await;
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.queue.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.inner.lock().await.queue.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn rejected_push_skips_the_builder() {
        let q = SharedQueue::new(1);
        q.try_push_with(1, || ("a", ())).await.unwrap();

        let mut built = false;
        let err = q
            .try_push_with(9, || {
                built = true;
                ("b", ())
            })
            .await
            .unwrap_err();

        assert_eq!(err, PushError::Full { capacity: 1 });
        assert!(!built);
        assert_eq!(q.len().await, 1);
    }

    #[tokio::test]
    async fn pop_waits_for_a_push() {
        let q: SharedQueue<u32> = SharedQueue::new(4);
        let waiter = {
            let q = q.clone();
            tokio::spawn(async move { q.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        let id = q.try_push_with(5, || (42, "id-42")).await.unwrap();
        assert_eq!(id, "id-42");

        let got = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got, 42);
        assert!(q.is_empty().await);
    }

    #[tokio::test]
    async fn closed_queue_refuses_pushes_but_keeps_items() {
        let q = SharedQueue::new(4);
        q.try_push_with(3, || ("queued", ())).await.unwrap();
        q.close().await;
        assert!(q.is_closed().await);

        let mut built = false;
        let err = q
            .try_push_with(9, || {
                built = true;
                ("late", ())
            })
            .await
            .unwrap_err();
        assert_eq!(err, PushError::Closed);
        assert!(!built);
        assert_eq!(q.pop().await, "queued");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn every_waiting_pop_gets_an_item() {
        let q: SharedQueue<u32> = SharedQueue::new(4);
        let waiters: Vec<_> = (0..2)
            .map(|_| {
                let q = q.clone();
                tokio::spawn(async move { q.pop().await })
            })
            .collect();
        tokio::time::sleep(Duration::from_millis(20)).await;

        q.try_push_with(1, || (1, ())).await.unwrap();
        q.try_push_with(1, || (2, ())).await.unwrap();

        let mut got = Vec::new();
        for waiter in waiters {
            let item = tokio::time::timeout(Duration::from_secs(1), waiter)
                .await
                .unwrap()
                .unwrap();
            got.push(item);
        }
        got.sort();
        assert_eq!(got, vec![1, 2]);
        assert!(q.is_empty().await);
    }
}
