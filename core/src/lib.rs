pub mod aggregate;
pub mod aggregator;
pub mod config;
pub mod context;
pub mod error;
pub mod feed;
pub mod selection;
pub mod selector;
pub mod source;
pub mod spell;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use aggregator::CategoryAggregator;
pub use config::ViewerConfig;
pub use context::AggregationContext;
pub use error::{ConfigError, DumpError, SourceError};
pub use feed::{Feed, FeedReceiver, Subscription};
pub use selector::DetailSelector;
pub use source::{EventSource, MemorySource, NotificationKind};
pub use spell::{SpellBook, SpellResolver};
pub use raidlens_types as types;
pub use raidlens_types::{
    AbilityOption, AbilityRows, AggregationTable, Category, DetailMode, DetailRow, DetailSnapshot,
    Direction, EventPoint, HealMode, HitKind, Selection, SubjectPoints, SubjectRows,
};
