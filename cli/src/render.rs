//! Plain-text rendering of detail snapshots.

use std::fmt::Write;

use raidlens_types::formatting::{format_amount, format_duration, format_rate, format_share};
use raidlens_types::{AbilityOption, AbilityRows, DetailSnapshot, Selection};

pub struct RenderOptions {
    pub european: bool,
    /// Only the first `top` abilities; `None` prints all
    pub top: Option<usize>,
    /// Also print the per-subject breakdown
    pub subjects: bool,
}

fn label<'a>(options: &'a [AbilityOption], ability_id: u32) -> &'a str {
    options
        .iter()
        .find(|o| o.ability_id == ability_id)
        .map(|o| o.label.as_str())
        .unwrap_or("?")
}

fn render_ability(
    out: &mut String,
    ability: &AbilityRows,
    labels: &[AbilityOption],
    total: f64,
    european: bool,
    indent: &str,
) {
    let _ = writeln!(
        out,
        "{indent}{} [{}]  {}  {}  ({} events)",
        label(labels, ability.ability_id),
        ability.ability_id,
        format_amount(ability.total_amount(), european),
        format_share(ability.total_amount(), total, european),
        ability.total_count(),
    );
    for (kind, row) in &ability.rows {
        let _ = writeln!(
            out,
            "{indent}    {:<10} {:>6}  {:>9}  min {:>8}  avg {:>8}  max {:>8}  {:>10}  over {}",
            kind.label(),
            row.count,
            format_amount(row.amount, european),
            format_amount(row.min, european),
            format_amount(row.average(), european),
            format_amount(row.max, european),
            format_rate(row.per_second(), european),
            format_duration(row.active_secs()),
        );
    }
}

pub fn render_snapshot(
    code: u32,
    selection: &Selection,
    snapshot: &DetailSnapshot,
    options: &RenderOptions,
) -> String {
    let mut out = String::new();
    let table = &snapshot.table;
    let total = table.total_amount();
    let limit = options.top.unwrap_or(usize::MAX);

    let _ = writeln!(
        out,
        "== [{code}] {}  total {}  ({} abilities, v{})",
        selection.describe(),
        format_amount(total, options.european),
        table.abilities.len(),
        snapshot.version,
    );
    if table.is_empty() {
        let _ = writeln!(out, "  (no events)");
        return out;
    }

    for ability in table.abilities.iter().take(limit) {
        render_ability(&mut out, ability, &snapshot.abilities, total, options.european, "  ");
    }

    if options.subjects {
        for subject in &table.subjects {
            let subject_total: f64 = subject.abilities.iter().map(AbilityRows::total_amount).sum();
            let _ = writeln!(
                out,
                "  -- subject {}  {}",
                subject.subject_id,
                format_amount(subject_total, options.european),
            );
            for ability in subject.abilities.iter().take(limit) {
                render_ability(
                    &mut out,
                    ability,
                    &snapshot.abilities,
                    subject_total,
                    options.european,
                    "    ",
                );
            }
        }
    }
    out
}
