//! The loaded dashboard data, built once and passed to every handler.

use std::sync::Arc;

use crate::cache::{SourceCache, SourceKey};
use crate::config::AppConfig;
use crate::error::LoadResult;
use crate::models::{ClusterRecord, StoreRecord, Table};
use crate::parser::{LoadReport, Loaded};
use crate::transform::filter::present_stores;

/// Immutable store and cluster tables.
///
/// Cloning is cheap; all clones share the same tables.
#[derive(Debug, Clone)]
pub struct DataStore {
    stores: Arc<Loaded<StoreRecord>>,
    /// Rows of `stores` flagged as present, derived once
    present: Arc<Table<StoreRecord>>,
    clusters: Arc<Loaded<ClusterRecord>>,
}

impl DataStore {
    /// Load both sources named by `config`, reusing anything in `cache`.
    ///
    /// Fails if either source fails; nothing partial is returned.
    pub fn open(config: &AppConfig, cache: &SourceCache) -> LoadResult<Self> {
        let stores = cache.stores.get_or_load(&SourceKey::new(
            &config.stores_csv,
            &config.store_columns,
            config.max_rows,
        ))?;
        let clusters = cache.clusters.get_or_load(&SourceKey::new(
            &config.clusters_csv,
            &config.cluster_columns,
            config.max_rows,
        ))?;

        Ok(Self::assemble(stores, clusters))
    }

    /// Wrap tables that are already in memory.
    pub fn from_tables(stores: Table<StoreRecord>, clusters: Table<ClusterRecord>) -> Self {
        Self::assemble(
            Arc::new(in_memory("stores", stores)),
            Arc::new(in_memory("clusters", clusters)),
        )
    }

    fn assemble(stores: Arc<Loaded<StoreRecord>>, clusters: Arc<Loaded<ClusterRecord>>) -> Self {
        let present = Arc::new(present_stores(&stores.table));
        Self {
            stores,
            present,
            clusters,
        }
    }

    pub fn stores(&self) -> &Table<StoreRecord> {
        &self.stores.table
    }

    /// Store rows with `Starbucks_INDICATOR == 1`.
    pub fn present_stores(&self) -> &Table<StoreRecord> {
        &self.present
    }

    pub fn clusters(&self) -> &Table<ClusterRecord> {
        &self.clusters.table
    }

    /// Load reports, stores first.
    pub fn reports(&self) -> [&LoadReport; 2] {
        [&self.stores.report, &self.clusters.report]
    }
}

fn in_memory<R>(source: &str, table: Table<R>) -> Loaded<R> {
    let report = LoadReport {
        source: source.to_string(),
        encoding: "utf-8".to_string(),
        source_width: table.columns().len(),
        rows_read: table.len(),
        rows_excluded: 0,
    };
    Loaded { table, report }
}
