//! Selection facade over the category aggregators.
//!
//! The selector owns long-lived output feeds that the UI binds to once.
//! Selecting a code re-wires where those feeds get their values from: the
//! previous forwarding link is cancelled before the new one is established.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use raidlens_types::{AbilityOption, AggregationTable, DetailSnapshot, Selection};

use crate::context::AggregationContext;
use crate::feed::{Feed, FeedReceiver, Subscription};
use crate::selection;

/// Feeds shared between the selector and its forwarding task.
struct Outputs {
    abilities: Feed<Vec<AbilityOption>>,
    ability_details: Feed<AggregationTable>,
    snapshots: Feed<DetailSnapshot>,
    /// Id of the link allowed to publish
    active_link: Mutex<u64>,
}

impl Outputs {
    /// Publish `snapshot` if `link` is still the active one.
    fn forward(&self, link: u64, snapshot: &Arc<DetailSnapshot>) -> bool {
        let active = self.active_link.lock().unwrap_or_else(PoisonError::into_inner);
        if *active != link {
            return false;
        }
        self.abilities.publish(snapshot.abilities.clone());
        self.ability_details.publish(snapshot.table.clone());
        self.snapshots.publish_shared(Arc::clone(snapshot));
        true
    }

    fn next_link(&self) -> u64 {
        let mut active = self.active_link.lock().unwrap_or_else(PoisonError::into_inner);
        *active += 1;
        *active
    }
}

pub struct DetailSelector {
    context: AggregationContext,
    outputs: Arc<Outputs>,
    current: Option<(u32, Selection)>,
    link: Option<Subscription>,
}

impl DetailSelector {
    pub fn new(context: AggregationContext) -> Self {
        Self {
            context,
            outputs: Arc::new(Outputs {
                abilities: Feed::default(),
                ability_details: Feed::default(),
                snapshots: Feed::default(),
                active_link: Mutex::new(0),
            }),
            current: None,
            link: None,
        }
    }

    /// Switch the outputs to the aggregator behind `code`.
    ///
    /// Re-selecting the current code and unknown codes are no-ops. Must be
    /// called inside a tokio runtime.
    pub fn select(&mut self, code: u32) {
        if self.current_code() == Some(code) {
            return;
        }
        let Some(selection) = selection::resolve(code) else {
            tracing::warn!(code, "Unknown selection code, keeping previous selection");
            return;
        };

        if let Some(link) = self.link.take() {
            link.cancel();
        }
        let link_id = self.outputs.next_link();

        let aggregator = self.context.aggregator(selection.category);
        let mut upstream = aggregator.activate(selection.mode);

        // Cached snapshot first, so re-selection shows data immediately.
        let cached = upstream.take_latest();
        self.outputs.forward(link_id, &cached);

        let outputs = Arc::clone(&self.outputs);
        self.link = Some(Subscription::spawn(async move {
            while let Some(snapshot) = upstream.changed().await {
                if !outputs.forward(link_id, &snapshot) {
                    break;
                }
            }
        }));

        tracing::info!(code, selection = %selection.describe(), "Detail selection changed");
        self.current = Some((code, selection));
    }

    pub fn current_code(&self) -> Option<u32> {
        self.current.map(|(code, _)| code)
    }

    pub fn current_selection(&self) -> Option<Selection> {
        self.current.map(|(_, selection)| selection)
    }

    pub fn abilities(&self) -> FeedReceiver<Vec<AbilityOption>> {
        self.outputs.abilities.subscribe()
    }

    pub fn ability_details(&self) -> FeedReceiver<AggregationTable> {
        self.outputs.ability_details.subscribe()
    }

    /// Both outputs as the pair the aggregator published.
    pub fn snapshots(&self) -> FeedReceiver<DetailSnapshot> {
        self.outputs.snapshots.subscribe()
    }

    /// Wait until the outputs carry the latest recompute of the current
    /// selection, computed for its mode. `None` if nothing is selected or
    /// `limit` elapses first (e.g. the source keeps failing).
    pub async fn settled(&self, limit: Duration) -> Option<Arc<DetailSnapshot>> {
        let selection = self.current_selection()?;
        let aggregator = self.context.aggregator(selection.category);
        let mut rx = self.snapshots();

        let wait = async {
            loop {
                let snapshot = rx.take_latest();
                if snapshot.mode == Some(selection.mode)
                    && snapshot.version >= aggregator.latest_version()
                {
                    return Some(snapshot);
                }
                rx.changed().await?;
            }
        };
        tokio::time::timeout(limit, wait).await.ok().flatten()
    }

    /// Cancel the forwarding link. Aggregators keep running.
    pub fn dispose(&mut self) {
        if let Some(link) = self.link.take() {
            link.cancel();
        }
        self.outputs.next_link();
        self.current = None;
    }
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
