//! Raw event sources consumed by the aggregators.

mod memory;

pub use memory::{EventDump, EventRecord, MemorySource, RecordFilter, RecordKind};

use async_trait::async_trait;
use raidlens_types::{Category, DetailMode, SubjectPoints};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::SourceError;

/// Change notifications broadcast by a source to every aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationKind {
    /// New events were loaded
    NewData,
    /// The subject/time filter changed
    FilterChanged,
    /// The source started (re)loading; data is not ready yet
    Loading,
}

/// Supplier of per-subject event points.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Points for `category` in `mode`, grouped per subject.
    async fn fetch_points(
        &self,
        category: Category,
        mode: DetailMode,
    ) -> Result<Vec<SubjectPoints>, SourceError>;

    /// Subscribe to the shared notification channel. Each message carries
    /// every kind that happened since the previous one.
    fn notifications(&self) -> broadcast::Receiver<Vec<NotificationKind>>;
}
