//! Atomic publication of compiled pattern tables.
//!
//! Analyses take an `Arc` snapshot with [`PatternStore::current`] and never
//! hold the lock while matching. Retraining builds a fresh table and swaps it
//! in with [`PatternStore::publish`]; snapshots already handed out keep
//! pointing at the table they started with.

use std::sync::{Arc, RwLock};

use tracing::info;

use crate::pattern::PatternTable;

#[derive(Debug)]
pub struct PatternStore {
    table: RwLock<Arc<PatternTable>>,
}

impl PatternStore {
    pub fn new(table: PatternTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Snapshot of the currently published table.
    pub fn current(&self) -> Arc<PatternTable> {
        match self.table.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the published table, returning the previous one.
    pub fn publish(&self, table: PatternTable) -> Arc<PatternTable> {
        let next = Arc::new(table);
        info!(
            patterns = next.len(),
            origin = ?next.origin(),
            "publishing pattern table"
        );
        let mut guard = match self.table.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::baseline_table;
    use crate::pattern::TableOrigin;

    #[test]
    fn publish_swaps_without_touching_snapshots() {
        let store = PatternStore::new(baseline_table());
        let before = store.current();
        assert_eq!(before.origin(), TableOrigin::Baseline);

        let replacement = PatternTable::new(TableOrigin::Mined, Vec::new());
        let previous = store.publish(replacement);

        assert!(Arc::ptr_eq(&previous, &before));
        assert_eq!(before.origin(), TableOrigin::Baseline);
        assert!(!before.is_empty());
        assert_eq!(store.current().origin(), TableOrigin::Mined);
        assert!(store.current().is_empty());
    }

    #[test]
    fn snapshots_are_shareable_across_threads() {
        let store = Arc::new(PatternStore::new(baseline_table()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.current().len())
            })
            .collect();
        let expected = baseline_table().len();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    }
}
