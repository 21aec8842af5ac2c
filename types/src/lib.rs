//! Shared types for the raidlens detail breakdowns.
//!
//! Everything here is plain data: the core crate produces these values and
//! any front end (CLI, UI bridge) consumes them.

pub mod detail;
pub mod formatting;
pub mod selection;

pub use detail::{
    AbilityOption, AbilityRows, AggregationTable, DetailRow, DetailSnapshot, EventPoint, HitKind,
    SubjectPoints, SubjectRows,
};
pub use selection::{Category, DetailMode, Direction, HealMode, Selection};
