//! Tests for selection switching and forwarding.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use raidlens_types::{Category, DetailMode, Direction, HealMode, HitKind};

use crate::context::AggregationContext;
use crate::error::SourceError;
use crate::source::NotificationKind;
use crate::spell::SpellBook;
use crate::test_support::{ScriptedSource, point, settle, subject};

const DAMAGE_DONE: u32 = 1;
const DAMAGE_TAKEN: u32 = 2;
const HEAL_TOTAL_DONE: u32 = 3;
const OVERHEAL_DONE: u32 = 7;

fn setup() -> (Arc<ScriptedSource>, AggregationContext) {
    let source = Arc::new(ScriptedSource::new(Vec::new()));
    source.set_category_result(
        Category::Damage,
        Ok(vec![subject(1, vec![point(5, HitKind::Hit, 100.0)])]),
    );
    source.set_category_result(
        Category::Heal,
        Ok(vec![subject(2, vec![point(7, HitKind::Crit, 40.0)])]),
    );
    let ctx = AggregationContext::new(source.clone(), Arc::new(SpellBook::empty()));
    (source, ctx)
}

fn ability_ids(table: &raidlens_types::AggregationTable) -> Vec<u32> {
    table.abilities.iter().map(|a| a.ability_id).collect()
}

#[tokio::test]
async fn test_reselect_shows_cached_snapshot_without_resubscribing() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();
    let mut details = selector.ability_details();

    selector.select(DAMAGE_DONE);
    settle().await;
    assert_eq!(ability_ids(&details.take_latest()), vec![5]);

    selector.select(HEAL_TOTAL_DONE);
    settle().await;
    let heal = details.changed().await.unwrap();
    assert_eq!(ability_ids(&heal), vec![7]);

    selector.select(DAMAGE_DONE);
    // Cached snapshot is forwarded synchronously.
    assert!(details.has_changed());
    assert_eq!(ability_ids(&details.take_latest()), vec![5]);

    settle().await;
    assert_eq!(source.subscriptions(), 2);
    assert_eq!(ctx.aggregator(Category::Damage).recompute_count(), 1);
    assert_eq!(ctx.aggregator(Category::Heal).recompute_count(), 1);
}

#[tokio::test]
async fn test_outputs_stay_valid_across_selections() {
    let (_source, ctx) = setup();
    let mut selector = ctx.selector();
    let abilities = selector.abilities();

    selector.select(DAMAGE_DONE);
    settle().await;
    assert_eq!(abilities.latest().len(), 1);
    assert_eq!(abilities.latest()[0].ability_id, 5);

    selector.select(HEAL_TOTAL_DONE);
    settle().await;
    assert_eq!(abilities.latest()[0].ability_id, 7);
}

#[tokio::test]
async fn test_same_code_is_noop() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();

    selector.select(DAMAGE_DONE);
    settle().await;
    selector.select(DAMAGE_DONE);
    settle().await;

    assert_eq!(source.fetches().len(), 1);
    assert_eq!(selector.current_code(), Some(DAMAGE_DONE));
}

#[tokio::test]
async fn test_unknown_code_keeps_previous_selection() {
    let (_source, ctx) = setup();
    let mut selector = ctx.selector();

    selector.select(DAMAGE_DONE);
    settle().await;
    let before = selector.snapshots().latest();

    selector.select(99);
    settle().await;

    assert_eq!(selector.current_code(), Some(DAMAGE_DONE));
    assert_eq!(
        selector.current_selection().map(|s| s.category),
        Some(Category::Damage)
    );
    assert_eq!(selector.snapshots().latest(), before);
}

#[tokio::test]
async fn test_live_updates_are_forwarded() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();
    let mut details = selector.ability_details();

    selector.select(DAMAGE_DONE);
    settle().await;
    details.take_latest();

    source.set_category_result(
        Category::Damage,
        Ok(vec![subject(1, vec![point(9, HitKind::Hit, 500.0)])]),
    );
    source.notify(&[NotificationKind::NewData]);
    let updated = details.changed().await.unwrap();
    assert_eq!(ability_ids(&updated), vec![9]);
}

#[tokio::test]
async fn test_deselected_aggregator_keeps_recomputing_but_is_not_forwarded() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();

    selector.select(DAMAGE_DONE);
    settle().await;
    selector.select(HEAL_TOTAL_DONE);
    settle().await;

    source.set_category_result(
        Category::Damage,
        Ok(vec![subject(1, vec![point(11, HitKind::Hit, 1.0)])]),
    );
    source.notify(&[NotificationKind::FilterChanged]);
    settle().await;

    let damage = ctx.aggregator(Category::Damage);
    assert_eq!(damage.recompute_count(), 2);
    assert_eq!(ability_ids(&damage.snapshot().table), vec![11]);
    assert_eq!(ability_ids(&selector.ability_details().latest()), vec![7]);

    selector.select(DAMAGE_DONE);
    assert_eq!(ability_ids(&selector.ability_details().latest()), vec![11]);
}

#[tokio::test]
async fn test_mode_switch_reuses_aggregator() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();

    selector.select(DAMAGE_DONE);
    settle().await;
    selector.select(DAMAGE_TAKEN);
    settle().await;

    let damage = ctx.aggregator(Category::Damage);
    assert_eq!(source.subscriptions(), 1);
    assert_eq!(damage.recompute_count(), 2);
    assert_eq!(selector.snapshots().latest().version, 2);
}

#[tokio::test]
async fn test_dispose_detaches_outputs_only() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();
    let details = selector.ability_details();

    selector.select(DAMAGE_DONE);
    settle().await;
    selector.dispose();
    assert_eq!(selector.current_code(), None);

    source.set_category_result(
        Category::Damage,
        Ok(vec![subject(1, vec![point(12, HitKind::Hit, 1.0)])]),
    );
    source.notify(&[NotificationKind::NewData]);
    settle().await;

    assert_eq!(ability_ids(&details.latest()), vec![5]);
    assert_eq!(
        ability_ids(&ctx.aggregator(Category::Damage).snapshot().table),
        vec![12]
    );
}

#[tokio::test]
async fn test_dropping_selector_leaves_aggregators_running() {
    let (source, ctx) = setup();
    {
        let mut selector = ctx.selector();
        selector.select(HEAL_TOTAL_DONE);
        settle().await;
    }

    source.notify(&[NotificationKind::NewData]);
    settle().await;
    assert_eq!(ctx.aggregator(Category::Heal).recompute_count(), 2);
}

#[tokio::test]
async fn test_settled_waits_for_current_recompute() {
    let (_source, ctx) = setup();
    let mut selector = ctx.selector();
    assert!(selector.settled(Duration::from_millis(10)).await.is_none());

    selector.select(HEAL_TOTAL_DONE);
    let snapshot = selector
        .settled(Duration::from_secs(1))
        .await
        .expect("recompute lands");
    assert_eq!(snapshot.version, 1);
    assert_eq!(ability_ids(&snapshot.table), vec![7]);
}

#[tokio::test]
async fn test_settled_rejects_snapshot_of_previous_mode() {
    let (source, ctx) = setup();
    let mut selector = ctx.selector();

    selector.select(HEAL_TOTAL_DONE);
    assert!(selector.settled(Duration::from_secs(1)).await.is_some());

    source.set_category_result(
        Category::Heal,
        Err(SourceError::Unavailable("backend down".to_string())),
    );
    selector.select(OVERHEAL_DONE);
    settle().await;

    // Outputs still carry the total-mode table, tagged as such.
    let shown = selector.snapshots().latest();
    assert_eq!(
        shown.mode,
        Some(DetailMode::heal(HealMode::Total, Direction::Done))
    );
    assert!(selector.settled(Duration::from_millis(20)).await.is_none());
}
