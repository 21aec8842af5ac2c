use serde::{Deserialize, Serialize};

use crate::selection::DetailMode;

/// Classification of a single combat event.
///
/// Declaration order is the display order of rows inside one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Hit,
    Crit,
    Glancing,
    Crushing,
    Partial,
    Block,
    Miss,
    Dodge,
    Parry,
    Resist,
    Absorb,
    Immune,
    Evade,
    Deflect,
    Interrupt,
}

impl HitKind {
    pub const ALL: [HitKind; 15] = [
        HitKind::Hit,
        HitKind::Crit,
        HitKind::Glancing,
        HitKind::Crushing,
        HitKind::Partial,
        HitKind::Block,
        HitKind::Miss,
        HitKind::Dodge,
        HitKind::Parry,
        HitKind::Resist,
        HitKind::Absorb,
        HitKind::Immune,
        HitKind::Evade,
        HitKind::Deflect,
        HitKind::Interrupt,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HitKind::Hit => "Hit",
            HitKind::Crit => "Crit",
            HitKind::Glancing => "Glancing",
            HitKind::Crushing => "Crushing",
            HitKind::Partial => "Partial",
            HitKind::Block => "Block",
            HitKind::Miss => "Miss",
            HitKind::Dodge => "Dodge",
            HitKind::Parry => "Parry",
            HitKind::Resist => "Resist",
            HitKind::Absorb => "Absorb",
            HitKind::Immune => "Immune",
            HitKind::Evade => "Evade",
            HitKind::Deflect => "Deflect",
            HitKind::Interrupt => "Interrupt",
        }
    }

    /// Avoidance outcomes carry no amount.
    pub fn is_avoidance(self) -> bool {
        matches!(
            self,
            HitKind::Miss
                | HitKind::Dodge
                | HitKind::Parry
                | HitKind::Resist
                | HitKind::Immune
                | HitKind::Evade
                | HitKind::Deflect
        )
    }
}

/// One raw combat-log measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventPoint {
    pub ability_id: u32,
    /// Seconds since the start of the instance
    pub timestamp: f64,
    pub amount: f64,
    pub hit_kind: HitKind,
    #[serde(default)]
    pub school_mask: u8,
}

/// All points belonging to one subject entity, as handed out by an event source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectPoints {
    pub subject_id: u64,
    pub points: Vec<EventPoint>,
}

/// Accumulated statistic for one (ability, hit kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub count: u32,
    pub amount: f64,
    pub min: f64,
    pub max: f64,
    pub school_mask: u8,
    pub first_timestamp: f64,
    pub last_timestamp: f64,
}

impl DetailRow {
    pub fn from_point(point: &EventPoint) -> Self {
        Self {
            count: 1,
            amount: point.amount,
            min: point.amount,
            max: point.amount,
            school_mask: point.school_mask,
            first_timestamp: point.timestamp,
            last_timestamp: point.timestamp,
        }
    }

    pub fn add_point(&mut self, point: &EventPoint) {
        self.merge(&DetailRow::from_point(point));
    }

    /// Fold another row into this one. Every field is a commutative reduction,
    /// so the merge order never changes the result.
    pub fn merge(&mut self, other: &DetailRow) {
        self.count += other.count;
        self.amount += other.amount;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.school_mask |= other.school_mask;
        self.first_timestamp = self.first_timestamp.min(other.first_timestamp);
        self.last_timestamp = self.last_timestamp.max(other.last_timestamp);
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.amount / self.count as f64
        }
    }

    /// Active window between first and last point, floored at one second.
    pub fn active_secs(&self) -> f64 {
        (self.last_timestamp - self.first_timestamp).max(1.0)
    }

    pub fn per_second(&self) -> f64 {
        self.amount / self.active_secs()
    }
}

/// Rows of one ability, ordered by hit kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AbilityRows {
    pub ability_id: u32,
    pub rows: Vec<(HitKind, DetailRow)>,
}

impl AbilityRows {
    pub fn total_amount(&self) -> f64 {
        self.rows.iter().map(|(_, row)| row.amount).sum()
    }

    pub fn total_count(&self) -> u32 {
        self.rows.iter().map(|(_, row)| row.count).sum()
    }

    pub fn row(&self, kind: HitKind) -> Option<&DetailRow> {
        self.rows.iter().find(|(k, _)| *k == kind).map(|(_, row)| row)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectRows {
    pub subject_id: u64,
    pub abilities: Vec<AbilityRows>,
}

/// Full published table for one category + mode.
///
/// `abilities` is the merge over every subject in scope (what the detail
/// table shows); `subjects` keeps the per-subject breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationTable {
    pub abilities: Vec<AbilityRows>,
    pub subjects: Vec<SubjectRows>,
}

impl AggregationTable {
    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    pub fn ability(&self, ability_id: u32) -> Option<&AbilityRows> {
        self.abilities.iter().find(|a| a.ability_id == ability_id)
    }

    pub fn subject(&self, subject_id: u64) -> Option<&SubjectRows> {
        self.subjects.iter().find(|s| s.subject_id == subject_id)
    }

    pub fn total_amount(&self) -> f64 {
        self.abilities.iter().map(AbilityRows::total_amount).sum()
    }
}

/// Entry of the "abilities observed" option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityOption {
    pub ability_id: u32,
    pub label: String,
}

/// The pair an aggregator publishes in one step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSnapshot {
    /// Recompute version that produced this snapshot; 0 before the first publish
    pub version: u64,
    /// Mode the table was computed for; `None` before the first publish
    #[serde(default)]
    pub mode: Option<DetailMode>,
    pub abilities: Vec<AbilityOption>,
    pub table: AggregationTable,
}
