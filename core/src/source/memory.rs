//! In-memory event source backed by a list of combat records.
//!
//! Used by the CLI to replay JSON dumps and by tests as a realistic source.

use std::path::Path;

use async_trait::async_trait;
use hashbrown::HashMap;
use raidlens_types::{Category, DetailMode, Direction, EventPoint, HealMode, SubjectPoints};
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, broadcast};

use super::{EventSource, NotificationKind};
use crate::error::{DumpError, SourceError};
use crate::spell::InstanceMeta;

const NOTIFY_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Damage,
    Heal,
    Threat,
    Absorb,
}

/// One combat record: who did what to whom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub kind: RecordKind,
    pub source_id: u64,
    pub target_id: u64,
    #[serde(flatten)]
    pub point: EventPoint,
    /// Healing beyond the target's missing health (heal records only)
    #[serde(default)]
    pub overheal: f64,
}

impl EventRecord {
    fn subject(&self, direction: Direction) -> u64 {
        match direction {
            Direction::Done => self.source_id,
            Direction::Taken => self.target_id,
        }
    }

    /// The point this record contributes to `category` in `mode`, if any.
    fn point_for(&self, category: Category, mode: DetailMode) -> Option<EventPoint> {
        let amount = match (category, self.kind) {
            (Category::Damage, RecordKind::Damage)
            | (Category::Threat, RecordKind::Threat)
            | (Category::Absorb, RecordKind::Absorb)
            | (Category::HealAndAbsorb, RecordKind::Absorb)
            | (Category::HealAndAbsorb, RecordKind::Heal) => self.point.amount,
            (Category::Heal, RecordKind::Heal) => match mode.heal_mode {
                Some(HealMode::Total) => self.point.amount + self.overheal,
                Some(HealMode::Effective) | None => self.point.amount,
                Some(HealMode::Overheal) if self.overheal > 0.0 => self.overheal,
                Some(HealMode::Overheal) => return None,
            },
            _ => return None,
        };
        Some(EventPoint {
            amount,
            ..self.point
        })
    }
}

/// Subject and time window restriction applied on fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// Only these subjects; `None` keeps everyone
    #[serde(default)]
    pub subjects: Option<Vec<u64>>,
    /// Inclusive `(start, end)` in seconds
    #[serde(default)]
    pub time_range: Option<(f64, f64)>,
}

impl RecordFilter {
    pub fn matches(&self, subject_id: u64, timestamp: f64) -> bool {
        let subject_ok = self
            .subjects
            .as_ref()
            .is_none_or(|ids| ids.contains(&subject_id));
        let time_ok = self
            .time_range
            .is_none_or(|(start, end)| timestamp >= start && timestamp <= end);
        subject_ok && time_ok
    }
}

/// Serialized form of a recorded instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDump {
    #[serde(default)]
    pub meta: Option<InstanceMeta>,
    #[serde(default)]
    pub records: Vec<EventRecord>,
}

impl EventDump {
    pub fn from_path(path: &Path) -> Result<Self, DumpError> {
        let contents = std::fs::read_to_string(path).map_err(|e| DumpError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| DumpError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

pub struct MemorySource {
    records: RwLock<Vec<EventRecord>>,
    filter: RwLock<RecordFilter>,
    notifier: broadcast::Sender<Vec<NotificationKind>>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(records: Vec<EventRecord>) -> Self {
        let (notifier, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self {
            records: RwLock::new(records),
            filter: RwLock::new(RecordFilter::default()),
            notifier,
        }
    }

    pub fn from_dump(dump: EventDump) -> Self {
        Self::with_records(dump.records)
    }

    /// Append records and announce [`NotificationKind::NewData`].
    pub async fn push_records(&self, records: impl IntoIterator<Item = EventRecord>) {
        let added = {
            let mut guard = self.records.write().await;
            let before = guard.len();
            guard.extend(records);
            guard.len() - before
        };
        tracing::debug!(added, "Appended records");
        self.notify(vec![NotificationKind::NewData]);
    }

    /// Swap the whole record set (new instance loaded).
    pub async fn replace_records(&self, records: Vec<EventRecord>) {
        self.notify(vec![NotificationKind::Loading]);
        *self.records.write().await = records;
        self.notify(vec![NotificationKind::NewData]);
    }

    pub async fn set_filter(&self, filter: RecordFilter) {
        *self.filter.write().await = filter;
        self.notify(vec![NotificationKind::FilterChanged]);
    }

    pub async fn filter(&self) -> RecordFilter {
        self.filter.read().await.clone()
    }

    pub async fn record_count(&self) -> usize {
        self.records.read().await.len()
    }

    pub fn notify(&self, kinds: Vec<NotificationKind>) {
        if self.notifier.send(kinds).is_err() {
            tracing::trace!("No aggregator listening for notifications");
        }
    }
}

#[async_trait]
impl EventSource for MemorySource {
    async fn fetch_points(
        &self,
        category: Category,
        mode: DetailMode,
    ) -> Result<Vec<SubjectPoints>, SourceError> {
        let filter = self.filter.read().await.clone();
        let records = self.records.read().await;

        let mut by_subject: HashMap<u64, Vec<EventPoint>> = HashMap::new();
        for record in records.iter() {
            let subject_id = record.subject(mode.direction);
            if !filter.matches(subject_id, record.point.timestamp) {
                continue;
            }
            if let Some(point) = record.point_for(category, mode) {
                by_subject.entry(subject_id).or_default().push(point);
            }
        }

        let mut subjects: Vec<SubjectPoints> = by_subject
            .into_iter()
            .map(|(subject_id, points)| SubjectPoints { subject_id, points })
            .collect();
        subjects.sort_by_key(|s| s.subject_id);
        Ok(subjects)
    }

    fn notifications(&self) -> broadcast::Receiver<Vec<NotificationKind>> {
        self.notifier.subscribe()
    }
}
