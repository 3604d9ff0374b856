//! Shared, reloadable mapping table
//!
//! Readers take a snapshot (`Arc`) of the whole table; a reload builds a new table
//! off to the side and swaps the pointer, so no reader ever sees a partial table.

use std::sync::{Arc, PoisonError, RwLock};

use crate::model::{MappingTable, Term};

/// Concurrent tag-to-term store with atomic whole-table replacement
#[derive(Debug, Default)]
pub struct MappingStore {
    table: RwLock<Arc<MappingTable>>,
}

impl MappingStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given table
    pub fn with_table(table: MappingTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Current table. Lookups against the returned snapshot are unaffected by later reloads.
    pub fn snapshot(&self) -> Arc<MappingTable> {
        // The lock only guards a pointer swap, so a poisoned lock still holds a whole table.
        Arc::clone(&self.table.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Exact, case-sensitive lookup against the current table
    pub fn lookup(&self, key: &str) -> Option<Term> {
        self.snapshot().get(key).cloned()
    }

    /// Replace the whole table, returning the number of entries in the previous one
    pub fn replace_all(&self, table: MappingTable) -> usize {
        let next = Arc::new(table);
        let previous = {
            let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        previous.len()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
