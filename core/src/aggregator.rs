//! Per-category aggregation lifecycle.
//!
//! An aggregator stays inert until its first [`CategoryAggregator::activate`].
//! From then on it listens to the source's notification channel and
//! recomputes on every relevant notification, whether or not the selector
//! currently forwards it. Each recompute carries a version; a result is only
//! published while its version is still the latest dispatched one, so a slow
//! fetch can never overwrite a newer snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use raidlens_types::{Category, DetailMode, DetailSnapshot, SubjectPoints};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::aggregate;
use crate::error::SourceError;
use crate::feed::{Feed, FeedReceiver, Subscription};
use crate::source::{EventSource, NotificationKind};
use crate::spell::SpellResolver;

/// Notification kinds that invalidate a category's snapshot.
pub fn relevant_kinds(category: Category) -> &'static [NotificationKind] {
    match category {
        Category::Damage
        | Category::Heal
        | Category::Threat
        | Category::Absorb
        | Category::HealAndAbsorb => &[NotificationKind::NewData, NotificationKind::FilterChanged],
    }
}

#[derive(Default)]
struct AggregatorState {
    /// `None` while inert
    mode: Option<DetailMode>,
    listener: Option<Subscription>,
    latest_version: u64,
}

struct Inner {
    category: Category,
    source: Arc<dyn EventSource>,
    resolver: Arc<dyn SpellResolver>,
    fetch_timeout: Option<Duration>,
    snapshot: Feed<DetailSnapshot>,
    state: Mutex<AggregatorState>,
    recomputes: AtomicU64,
}

/// Handle to one category's aggregator. Clones share the same state.
#[derive(Clone)]
pub struct CategoryAggregator {
    inner: Arc<Inner>,
}

impl CategoryAggregator {
    pub fn new(
        category: Category,
        source: Arc<dyn EventSource>,
        resolver: Arc<dyn SpellResolver>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                category,
                source,
                resolver,
                fetch_timeout,
                snapshot: Feed::default(),
                state: Mutex::new(AggregatorState::default()),
                recomputes: AtomicU64::new(0),
            }),
        }
    }

    pub fn category(&self) -> Category {
        self.inner.category
    }

    /// Start (or retarget) the aggregator and return its snapshot feed.
    ///
    /// The first call subscribes to the source and runs an initial recompute.
    /// Later calls with the same mode are free; a different mode triggers an
    /// immediate recompute. Must be called inside a tokio runtime.
    pub fn activate(&self, mode: DetailMode) -> FeedReceiver<DetailSnapshot> {
        let recompute = {
            let mut state = self.inner.lock_state();
            match state.mode {
                None => {
                    let notifications = self.inner.source.notifications();
                    state.listener = Some(self.spawn_listener(notifications));
                    state.mode = Some(mode);
                    tracing::debug!(category = ?self.inner.category, ?mode, "Aggregator initialized");
                    true
                }
                Some(current) if current == mode => false,
                Some(_) => {
                    state.mode = Some(mode);
                    tracing::debug!(category = ?self.inner.category, ?mode, "Aggregator mode changed");
                    true
                }
            }
        };

        if recompute {
            self.schedule_recompute();
        }
        self.inner.snapshot.subscribe()
    }

    /// Detach from the source and go back to the inert state.
    ///
    /// In-flight recomputes are discarded; the last snapshot stays cached.
    pub fn dispose(&self) {
        let listener = {
            let mut state = self.inner.lock_state();
            state.mode = None;
            state.latest_version += 1;
            state.listener.take()
        };
        if listener.is_some() {
            tracing::debug!(category = ?self.inner.category, "Aggregator disposed");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.lock_state().mode.is_some()
    }

    pub fn current_mode(&self) -> Option<DetailMode> {
        self.inner.lock_state().mode
    }

    /// Version of the most recently dispatched recompute.
    pub fn latest_version(&self) -> u64 {
        self.inner.lock_state().latest_version
    }

    /// Number of recomputes dispatched so far.
    pub fn recompute_count(&self) -> u64 {
        self.inner.recomputes.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> Arc<DetailSnapshot> {
        self.inner.snapshot.latest()
    }

    pub fn subscribe(&self) -> FeedReceiver<DetailSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// `None` while inert.
    #[cfg(test)]
    fn listener_finished(&self) -> Option<bool> {
        self.inner
            .lock_state()
            .listener
            .as_ref()
            .map(Subscription::is_finished)
    }

    fn schedule_recompute(&self) {
        Inner::schedule_recompute(&self.inner);
    }

    fn spawn_listener(
        &self,
        mut notifications: broadcast::Receiver<Vec<NotificationKind>>,
    ) -> Subscription {
        // Weak: the listener lives inside `Inner` and must not keep it alive.
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let category = self.inner.category;
        let relevant = relevant_kinds(category);

        Subscription::spawn(async move {
            loop {
                let triggered = match notifications.recv().await {
                    Ok(kinds) => kinds.iter().any(|k| relevant.contains(k)),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(?category, skipped, "Notification listener lagged, recomputing");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if !triggered {
                    continue;
                }
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                Inner::schedule_recompute(&inner);
            }
            tracing::debug!(?category, "Notification listener stopped");
        })
    }
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule_recompute(this: &Arc<Inner>) {
        let (version, mode) = {
            let mut state = this.lock_state();
            let Some(mode) = state.mode else {
                return;
            };
            state.latest_version += 1;
            (state.latest_version, mode)
        };
        this.recomputes.fetch_add(1, Ordering::Relaxed);

        let inner = Arc::clone(this);
        tokio::spawn(async move {
            inner.recompute(version, mode).await;
        });
    }

    async fn fetch(&self, mode: DetailMode) -> Result<Vec<SubjectPoints>, SourceError> {
        let fetch = self.source.fetch_points(self.category, mode);
        match self.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .unwrap_or(Err(SourceError::Timeout(limit))),
            None => fetch.await,
        }
    }

    async fn recompute(&self, version: u64, mode: DetailMode) {
        let subjects = match self.fetch(mode).await {
            Ok(subjects) => subjects,
            Err(e) => {
                tracing::warn!(
                    category = ?self.category,
                    version,
                    error = %e,
                    "Fetch failed, keeping last snapshot"
                );
                return;
            }
        };

        let table = aggregate::build_table(&subjects);
        let abilities = aggregate::ability_options(&table, self.resolver.as_ref());

        let state = self.lock_state();
        if state.latest_version != version {
            tracing::debug!(
                category = ?self.category,
                version,
                latest = state.latest_version,
                "Discarding stale recompute"
            );
            return;
        }
        tracing::debug!(
            category = ?self.category,
            version,
            abilities = abilities.len(),
            "Publishing snapshot"
        );
        self.snapshot.publish(DetailSnapshot {
            version,
            mode: Some(mode),
            abilities,
            table,
        });
    }
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
