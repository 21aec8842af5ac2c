//! Scripted event source for lifecycle tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use hashbrown::HashMap;
use raidlens_types::{Category, DetailMode, EventPoint, HitKind, SubjectPoints};
use tokio::sync::{broadcast, oneshot};

use crate::error::SourceError;
use crate::source::{EventSource, NotificationKind};

pub const NOTIFY_CAPACITY: usize = 16;

pub type FetchResult = Result<Vec<SubjectPoints>, SourceError>;

/// Answers fetches either from a queue of gates (resolved by the test) or,
/// once the queue is empty, with the per-category or default result.
pub struct ScriptedSource {
    gates: Mutex<VecDeque<oneshot::Receiver<FetchResult>>>,
    default: Mutex<FetchResult>,
    per_category: Mutex<HashMap<Category, FetchResult>>,
    /// `None` once the channel was closed
    notifier: Mutex<Option<broadcast::Sender<Vec<NotificationKind>>>>,
    subscriptions: AtomicUsize,
    fetches: Mutex<Vec<(Category, DetailMode)>>,
}

impl ScriptedSource {
    pub fn new(default: Vec<SubjectPoints>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            gates: Mutex::new(VecDeque::new()),
            default: Mutex::new(Ok(default)),
            per_category: Mutex::new(HashMap::new()),
            notifier: Mutex::new(Some(notifier)),
            subscriptions: AtomicUsize::new(0),
            fetches: Mutex::new(Vec::new()),
        }
    }

    /// Queue a gate; the next fetch waits until the returned sender fires.
    pub fn gate(&self) -> oneshot::Sender<FetchResult> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn set_default(&self, result: FetchResult) {
        *self.default.lock().unwrap() = result;
    }

    /// Answer fetches for `category` with `result` instead of the default.
    pub fn set_category_result(&self, category: Category, result: FetchResult) {
        self.per_category.lock().unwrap().insert(category, result);
    }

    pub fn notify(&self, kinds: &[NotificationKind]) {
        if let Some(notifier) = self.notifier.lock().unwrap().as_ref() {
            let _ = notifier.send(kinds.to_vec());
        }
    }

    /// Drop the sender so every listener sees the channel close.
    pub fn close_notifications(&self) {
        self.notifier.lock().unwrap().take();
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> Vec<(Category, DetailMode)> {
        self.fetches.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_points(&self, category: Category, mode: DetailMode) -> FetchResult {
        self.fetches.lock().unwrap().push((category, mode));
        let gate = self.gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(SourceError::Unavailable("gate dropped".to_string()))),
            None => {
                let per_category = self.per_category.lock().unwrap().get(&category).cloned();
                per_category.unwrap_or_else(|| self.default.lock().unwrap().clone())
            }
        }
    }

    fn notifications(&self) -> broadcast::Receiver<Vec<NotificationKind>> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        match self.notifier.lock().unwrap().as_ref() {
            Some(notifier) => notifier.subscribe(),
            None => broadcast::channel(1).1,
        }
    }
}

pub fn point(ability_id: u32, hit_kind: HitKind, amount: f64) -> EventPoint {
    EventPoint {
        ability_id,
        timestamp: 0.0,
        amount,
        hit_kind,
        school_mask: 1,
    }
}

pub fn subject(subject_id: u64, points: Vec<EventPoint>) -> SubjectPoints {
    SubjectPoints { subject_id, points }
}

/// Let every ready task run to its next suspension point.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}
