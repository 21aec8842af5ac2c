//! Folding raw event points into ability / hit-kind detail rows.
//!
//! Everything here is pure. Output ordering is fixed: abilities by
//! descending total amount (ties by ascending ability id), rows inside an
//! ability by [`HitKind`] order. Input order never affects the result.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use raidlens_types::{
    AbilityOption, AbilityRows, AggregationTable, DetailRow, EventPoint, HitKind, SubjectPoints,
    SubjectRows,
};

use crate::spell::SpellResolver;

/// Intermediate grouping: ability → hit kind → row.
pub type GroupedRows = HashMap<u32, BTreeMap<HitKind, DetailRow>>;

/// Group points by `(ability_id, hit_kind)`.
pub fn group(points: &[EventPoint]) -> GroupedRows {
    let mut grouped = GroupedRows::new();
    for point in points {
        grouped
            .entry(point.ability_id)
            .or_default()
            .entry(point.hit_kind)
            .and_modify(|row| row.add_point(point))
            .or_insert_with(|| DetailRow::from_point(point));
    }
    grouped
}

/// Fold `from` into `into`, combining rows of the same pair.
pub fn merge(into: &mut GroupedRows, from: &GroupedRows) {
    for (ability_id, rows) in from {
        let target = into.entry(*ability_id).or_default();
        for (kind, row) in rows {
            target
                .entry(*kind)
                .and_modify(|existing| existing.merge(row))
                .or_insert(*row);
        }
    }
}

/// Convert the intermediate map into the final ordered output.
pub fn postprocess(grouped: GroupedRows) -> Vec<AbilityRows> {
    let mut abilities: Vec<AbilityRows> = grouped
        .into_iter()
        .map(|(ability_id, rows)| AbilityRows {
            ability_id,
            rows: rows.into_iter().collect(),
        })
        .collect();

    abilities.sort_by(|a, b| {
        b.total_amount()
            .total_cmp(&a.total_amount())
            .then(a.ability_id.cmp(&b.ability_id))
    });
    abilities
}

/// Build the full table: one grouping per subject plus the scope-wide merge.
pub fn build_table(subjects: &[SubjectPoints]) -> AggregationTable {
    // The same subject may arrive in several chunks.
    let mut per_subject: HashMap<u64, GroupedRows> = HashMap::new();
    for chunk in subjects {
        let grouped = group(&chunk.points);
        merge(per_subject.entry(chunk.subject_id).or_default(), &grouped);
    }

    let mut overall = GroupedRows::new();
    for grouped in per_subject.values() {
        merge(&mut overall, grouped);
    }

    let mut subjects: Vec<SubjectRows> = per_subject
        .into_iter()
        .map(|(subject_id, grouped)| SubjectRows {
            subject_id,
            abilities: postprocess(grouped),
        })
        .collect();
    subjects.sort_by_key(|s| s.subject_id);

    AggregationTable {
        abilities: postprocess(overall),
        subjects,
    }
}

/// One option per distinct ability, in table order.
pub fn ability_options(table: &AggregationTable, resolver: &dyn SpellResolver) -> Vec<AbilityOption> {
    table
        .abilities
        .iter()
        .map(|ability| AbilityOption {
            ability_id: ability.ability_id,
            label: resolver.label_for(ability.ability_id),
        })
        .collect()
}
