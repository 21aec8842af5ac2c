use std::sync::Arc;
use std::time::Duration;

use raidlens_types::Category;

use crate::aggregator::CategoryAggregator;
use crate::selector::DetailSelector;
use crate::source::EventSource;
use crate::spell::SpellResolver;

/// Owns one aggregator per category. Built once at startup and handed to
/// every selector; clones share the same aggregators.
#[derive(Clone)]
pub struct AggregationContext {
    /// Indexed by `Category as usize`
    aggregators: Arc<[CategoryAggregator; 5]>,
}

impl AggregationContext {
    pub fn new(source: Arc<dyn EventSource>, resolver: Arc<dyn SpellResolver>) -> Self {
        Self::with_fetch_timeout(source, resolver, None)
    }

    pub fn with_fetch_timeout(
        source: Arc<dyn EventSource>,
        resolver: Arc<dyn SpellResolver>,
        fetch_timeout: Option<Duration>,
    ) -> Self {
        let aggregators = Category::ALL.map(|category| {
            CategoryAggregator::new(
                category,
                Arc::clone(&source),
                Arc::clone(&resolver),
                fetch_timeout,
            )
        });
        Self {
            aggregators: Arc::new(aggregators),
        }
    }

    pub fn aggregator(&self, category: Category) -> &CategoryAggregator {
        &self.aggregators[category as usize]
    }

    pub fn aggregators(&self) -> impl Iterator<Item = &CategoryAggregator> {
        self.aggregators.iter()
    }

    /// New selector bound to this context.
    pub fn selector(&self) -> DetailSelector {
        DetailSelector::new(self.clone())
    }

    /// Detach every aggregator from the source.
    pub fn dispose(&self) {
        for aggregator in self.aggregators.iter() {
            aggregator.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spell::SpellBook;
    use crate::test_support::ScriptedSource;

    #[test]
    fn test_dispatch_table_matches_categories() {
        let ctx = AggregationContext::new(
            Arc::new(ScriptedSource::new(Vec::new())),
            Arc::new(SpellBook::empty()),
        );
        for category in Category::ALL {
            assert_eq!(ctx.aggregator(category).category(), category);
        }
        assert!(ctx.aggregators().all(|a| !a.is_initialized()));
    }
}
