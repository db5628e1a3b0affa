//! Table cache - load each source once and share it.
//!
//! Entries are keyed by source identity (path, column selection, row cap).
//! A failed load is never inserted, so a later call retries the source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::api::logs::log_info;
use crate::error::LoadResult;
use crate::models::{ClusterRecord, ColumnSelection, Record, StoreRecord};
use crate::parser::{load_table, Loaded};

/// Identity of a loaded source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub path: PathBuf,
    pub selection: ColumnSelection,
    pub max_rows: usize,
}

impl SourceKey {
    pub fn new(path: impl AsRef<Path>, selection: &ColumnSelection, max_rows: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            selection: selection.clone(),
            max_rows,
        }
    }
}

/// Immutable loaded tables of one record type, by source.
pub struct TableCache<R> {
    entries: RwLock<HashMap<SourceKey, Arc<Loaded<R>>>>,
}

impl<R: Record> TableCache<R> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached table for `key`, loading it on first use.
    pub fn get_or_load(&self, key: &SourceKey) -> LoadResult<Arc<Loaded<R>>> {
        if let Some(hit) = self.get(key) {
            log_info(format!("Using cached table for '{}'", key.path.display()));
            return Ok(hit);
        }

        let loaded = Arc::new(load_table::<R>(&key.path, &key.selection, key.max_rows)?);

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // Another caller may have loaded the same source meanwhile; keep the first.
        Ok(entries.entry(key.clone()).or_insert(loaded).clone())
    }

    pub fn get(&self, key: &SourceKey) -> Option<Arc<Loaded<R>>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R: Record> Default for TableCache<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Caches for both dashboard sources.
#[derive(Default)]
pub struct SourceCache {
    pub stores: TableCache<StoreRecord>,
    pub clusters: TableCache<ClusterRecord>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }
}
