//! Catalog load and reload use case

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    catalog::{ParsedCatalog, build_table},
    ports::{CatalogError, CatalogSource},
    store::MappingStore,
};

/// Counts reported after a successful reload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSummary {
    pub entries: usize,
    pub rejected: usize,
    pub previous_entries: usize,
}

/// Loads the term catalog and swaps it into the mapping store
pub struct CatalogReloader<S: ?Sized> {
    source: Arc<S>,
    store: Arc<MappingStore>,
    reload_lock: Mutex<()>,
}

impl<S: CatalogSource + ?Sized> CatalogReloader<S> {
    pub fn new(source: Arc<S>, store: Arc<MappingStore>) -> Self {
        Self {
            source,
            store,
            reload_lock: Mutex::new(()),
        }
    }

    /// Fetch and parse the catalog without touching the store
    pub async fn load_table(&self) -> Result<ParsedCatalog, CatalogError> {
        let records = self.source.fetch_records().await?;

        tracing::info!(records = records.len(), "Processing mappings");

        Ok(build_table(&records))
    }

    /// Reload the catalog into the store.
    ///
    /// Reloads are serialized; on failure the current table stays in place.
    pub async fn reload(&self) -> Result<ReloadSummary, CatalogError> {
        let _guard = self.reload_lock.lock().await;

        let parsed = self.load_table().await?;
        let entries = parsed.table.len();
        let previous_entries = self.store.replace_all(parsed.table);

        tracing::info!(
            entries,
            rejected = parsed.rejected,
            previous_entries,
            "Mappings loaded"
        );

        Ok(ReloadSummary {
            entries,
            rejected: parsed.rejected,
            previous_entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogRecord, MappingTable, Term};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeCatalogSource {
        records: Vec<CatalogRecord>,
        fail: bool,
    }

    #[async_trait]
    impl CatalogSource for FakeCatalogSource {
        async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
            if self.fail {
                return Err(CatalogError::Status(503));
            }
            Ok(self.records.clone())
        }
    }

    /// Tracks how many fetches overlap
    struct SlowCatalogSource {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl CatalogSource for SlowCatalogSource {
        async fn fetch_records(&self) -> Result<Vec<CatalogRecord>, CatalogError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![])
        }
    }

    fn record(search_term: &str, stream_url: &str) -> CatalogRecord {
        [
            ("brightcovesearchterm".to_string(), search_term.to_string()),
            ("streamurl".to_string(), stream_url.to_string()),
        ]
        .into_iter()
        .collect()
    }

    fn existing_store() -> Arc<MappingStore> {
        let mut table = MappingTable::new();
        table.insert("old".to_string(), Term::new("MA==-U2VjdGlvbnM=", "Sections"));
        Arc::new(MappingStore::with_table(table))
    }

    #[tokio::test]
    async fn test_reload_replaces_table() {
        let store = existing_store();
        let source = Arc::new(FakeCatalogSource {
            records: vec![
                record("World", "/stream/sectionsId/MQ==-U2VjdGlvbnM="),
                record("Broken", "/stream/sectionsId/"),
            ],
            fail: false,
        });
        let reloader = CatalogReloader::new(source, store.clone());

        let summary = reloader.reload().await.unwrap();

        assert_eq!(
            summary,
            ReloadSummary {
                entries: 1,
                rejected: 1,
                previous_entries: 1
            }
        );
        assert!(store.lookup("old").is_none());
        assert_eq!(store.lookup("World").unwrap().id, "MQ==-U2VjdGlvbnM=");
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_existing_table() {
        let store = existing_store();
        let source = Arc::new(FakeCatalogSource {
            records: vec![],
            fail: true,
        });
        let reloader = CatalogReloader::new(source, store.clone());

        let result = reloader.reload().await;

        assert!(matches!(result, Err(CatalogError::Status(503))));
        assert_eq!(store.len(), 1);
        assert!(store.lookup("old").is_some());
    }

    #[tokio::test]
    async fn test_load_table_does_not_touch_store() {
        let store = existing_store();
        let source = Arc::new(FakeCatalogSource {
            records: vec![record("World", "/stream/sectionsId/MQ==-U2VjdGlvbnM=")],
            fail: false,
        });
        let reloader = CatalogReloader::new(source, store.clone());

        let parsed = reloader.load_table().await.unwrap();

        assert_eq!(parsed.table.len(), 1);
        assert!(store.lookup("World").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reloads_are_serialized() {
        let source = Arc::new(SlowCatalogSource {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let reloader = Arc::new(CatalogReloader::new(
            source.clone(),
            Arc::new(MappingStore::new()),
        ));

        let handles: Vec<_> = (0..5)
            .map(|_| {
                let reloader = Arc::clone(&reloader);
                tokio::spawn(async move { reloader.reload().await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), 1);
    }
}
