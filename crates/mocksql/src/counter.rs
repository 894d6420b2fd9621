use std::collections::HashMap;

/// Per-query invocation counts, keyed by normalized query.
#[derive(Debug, Default)]
pub(crate) struct CallCounter {
    counts: HashMap<String, u64>,
}

impl CallCounter {
    /// Records one invocation and returns the new count.
    pub(crate) fn record(&mut self, query: &str) -> u64 {
        let count = self.counts.entry(query.to_owned()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Resets the count for `query` to zero.
    pub(crate) fn reset(&mut self, query: &str) {
        self.counts.insert(query.to_owned(), 0);
    }

    /// Returns the count for `query`; unknown queries read as zero.
    #[must_use]
    pub(crate) fn get(&self, query: &str) -> u64 {
        self.counts.get(query).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_and_reset() {
        let mut counter = CallCounter::default();
        assert_eq!(counter.get("select 1"), 0);
        assert_eq!(counter.record("select 1"), 1);
        assert_eq!(counter.record("select 1"), 2);
        counter.reset("select 1");
        assert_eq!(counter.get("select 1"), 0);
        assert_eq!(counter.get("select 2"), 0);
    }
}
