//! Closable FIFO work queue shared by a producer pool and a consumer pool

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// Error returned by [`WorkQueue::push`] once the queue is closed; the item is handed back
#[derive(Debug)]
pub struct QueueClosed<T>(pub T);

struct QueueState<T> {
    items: VecDeque<T>,
    closed: bool,
}

/// Concurrency-safe FIFO queue with blocking pop and optional capacity
///
/// `pop` waits until an item arrives or the queue is closed; `push` on a full
/// bounded queue waits until a consumer makes room. Closing wakes every waiter.
/// Items still queued at close time are returned by subsequent pops.
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    capacity: Option<usize>,
    item_ready: Notify,
    space_ready: Notify,
}

impl<T> WorkQueue<T> {
    /// Creates a queue with no capacity limit
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    /// Creates a queue holding at most `capacity` items (minimum 1)
    pub fn bounded(capacity: usize) -> Self {
        Self::with_capacity(Some(capacity.max(1)))
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                closed: false,
            }),
            capacity,
            item_ready: Notify::new(),
            space_ready: Notify::new(),
        }
    }

    /// Appends an item, waiting for room when the queue is full
    pub async fn push(&self, item: T) -> Result<(), QueueClosed<T>> {
        loop {
            let notified = self.space_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return Err(QueueClosed(item));
                }
                if self.has_room(state.items.len()) {
                    state.items.push_back(item);
                    drop(state);
                    self.item_ready.notify_one();
                    return Ok(());
                }
            }

            notified.await;
        }
    }

    /// Removes the oldest item, waiting while the queue is empty
    ///
    /// Returns `None` once the queue is closed and drained.
    pub async fn pop(&self) -> Option<T> {
        loop {
            let notified = self.item_ready.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if let Some(item) = state.items.pop_front() {
                    let more = !state.items.is_empty();
                    drop(state);
                    self.space_ready.notify_one();
                    if more {
                        self.item_ready.notify_one();
                    }
                    return Some(item);
                }
                if state.closed {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Closes the queue; pending and future pushes fail, pops drain then return `None`
    pub fn close(&self) {
        self.lock().closed = true;
        self.item_ready.notify_waiters();
        self.space_ready.notify_waiters();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    fn has_room(&self, len: usize) -> bool {
        self.capacity.map_or(true, |capacity| len < capacity)
    }

    fn lock(&self) -> MutexGuard<'_, QueueState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::unbounded();
        queue.push(1).await.unwrap();
        queue.push(2).await.unwrap();
        queue.push(3).await.unwrap();

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().await, Some(1));
        assert_eq!(queue.pop().await, Some(2));
        assert_eq!(queue.pop().await, Some(3));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(WorkQueue::unbounded());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push("late").await.unwrap();

        assert_eq!(consumer.await.unwrap(), Some("late"));
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumers() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::unbounded());
        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { queue.pop().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close();

        for consumer in consumers {
            assert_eq!(consumer.await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_close_drains_remaining_items() {
        let queue = WorkQueue::unbounded();
        queue.push(7).await.unwrap();
        queue.close();

        assert!(queue.is_closed());
        assert_eq!(queue.pop().await, Some(7));
        assert_eq!(queue.pop().await, None);
    }

    #[tokio::test]
    async fn test_push_after_close_returns_item() {
        let queue = WorkQueue::unbounded();
        queue.close();
        let err = queue.push(5).await.unwrap_err();
        assert_eq!(err.0, 5);
    }

    #[tokio::test]
    async fn test_bounded_push_waits_for_room() {
        let queue = Arc::new(WorkQueue::bounded(1));
        queue.push(1).await.unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.push(2).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!producer.is_finished());
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.pop().await, Some(1));
        producer.await.unwrap().unwrap();
        assert_eq!(queue.pop().await, Some(2));
    }

    #[tokio::test]
    async fn test_many_producers_many_consumers() {
        let queue = Arc::new(WorkQueue::bounded(4));
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    for i in 0..50 {
                        queue.push(p * 1000 + i).await.unwrap();
                    }
                })
            })
            .collect();
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Some(item) = queue.pop().await {
                        seen.push(item);
                    }
                    seen
                })
            })
            .collect();

        for producer in producers {
            producer.await.unwrap();
        }
        while !queue.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        queue.close();

        let mut all = Vec::new();
        for consumer in consumers {
            all.extend(consumer.await.unwrap());
        }
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 200);
    }
}
