//! Broadcast feeds with a latest-value cache.
//!
//! A [`Feed`] always holds a value, so late subscribers see the current state
//! immediately. Receivers coalesce: a slow receiver skips intermediate values
//! and only observes the newest one.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct Feed<T> {
    tx: Arc<watch::Sender<Arc<T>>>,
}

impl<T> Clone for Feed<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> Feed<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(initial));
        Self { tx: Arc::new(tx) }
    }

    /// Replace the cached value and wake every receiver.
    pub fn publish(&self, value: T) {
        self.publish_shared(Arc::new(value));
    }

    pub fn publish_shared(&self, value: Arc<T>) {
        self.tx.send_replace(value);
    }

    pub fn latest(&self) -> Arc<T> {
        Arc::clone(&self.tx.borrow())
    }

    /// New receiver; the current value counts as already seen.
    pub fn subscribe(&self) -> FeedReceiver<T> {
        FeedReceiver {
            rx: self.tx.subscribe(),
        }
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Default> Default for Feed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

pub struct FeedReceiver<T> {
    rx: watch::Receiver<Arc<T>>,
}

impl<T> Clone for FeedReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
        }
    }
}

impl<T> FeedReceiver<T> {
    pub fn latest(&self) -> Arc<T> {
        Arc::clone(&self.rx.borrow())
    }

    /// Current value, marking it as seen.
    pub fn take_latest(&mut self) -> Arc<T> {
        Arc::clone(&self.rx.borrow_and_update())
    }

    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for a value newer than the last one seen.
    /// Returns `None` once the feed is gone.
    pub async fn changed(&mut self) -> Option<Arc<T>> {
        self.rx.changed().await.ok()?;
        Some(self.take_latest())
    }
}

/// Cancellation handle for a spawned forwarding or listening task.
///
/// Dropping the handle cancels the task.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Spawn `task` on the current tokio runtime.
    pub fn spawn<F>(task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(task),
        }
    }

    /// Abort the task now.
    pub fn cancel(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
