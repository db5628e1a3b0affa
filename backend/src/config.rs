//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary via
//! `dotenvy`); CLI flags override them in `main.rs`.
//!
//! | Variable                  | Default                                 |
//! |---------------------------|-----------------------------------------|
//! | `STOREMAP_STORES_CSV`     | `Final_Counties_Starbucks_dataset.csv`  |
//! | `STOREMAP_CLUSTERS_CSV`   | `county_clustering.csv`                 |
//! | `STOREMAP_MAX_ROWS`       | `100000`                                |
//! | `STOREMAP_PORT`           | `3000`                                  |
//! | `STOREMAP_STORE_COLUMNS`  | `Name=index,...` overrides              |
//! | `STOREMAP_CLUSTER_COLUMNS`| `Name=index,...` overrides              |

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, ConfigResult};
use crate::models::{ClusterColumn, ClusterRecord, ColumnSelection, StoreColumn, StoreRecord};
use crate::parser::DEFAULT_MAX_ROWS;

pub const DEFAULT_STORES_CSV: &str = "Final_Counties_Starbucks_dataset.csv";
pub const DEFAULT_CLUSTERS_CSV: &str = "county_clustering.csv";
pub const DEFAULT_PORT: u16 = 3000;

/// Where the tables come from and how the server listens.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub stores_csv: PathBuf,
    pub clusters_csv: PathBuf,
    pub max_rows: usize,
    pub port: u16,
    pub store_columns: ColumnSelection,
    pub cluster_columns: ColumnSelection,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stores_csv: PathBuf::from(DEFAULT_STORES_CSV),
            clusters_csv: PathBuf::from(DEFAULT_CLUSTERS_CSV),
            max_rows: DEFAULT_MAX_ROWS,
            port: DEFAULT_PORT,
            store_columns: StoreRecord::default_selection(),
            cluster_columns: ClusterRecord::default_selection(),
        }
    }
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("STOREMAP_STORES_CSV") {
            config.stores_csv = PathBuf::from(path);
        }
        if let Some(path) = lookup("STOREMAP_CLUSTERS_CSV") {
            config.clusters_csv = PathBuf::from(path);
        }
        if let Some(raw) = lookup("STOREMAP_MAX_ROWS") {
            config.max_rows = parse_value("STOREMAP_MAX_ROWS", &raw)?;
        }
        if let Some(raw) = lookup("STOREMAP_PORT") {
            config.port = parse_value("STOREMAP_PORT", &raw)?;
        }
        if let Some(raw) = lookup("STOREMAP_STORE_COLUMNS") {
            for (column, index) in parse_column_overrides::<StoreColumn>(&raw)? {
                config.store_columns.set(column.as_str(), index);
            }
        }
        if let Some(raw) = lookup("STOREMAP_CLUSTER_COLUMNS") {
            for (column, index) in parse_column_overrides::<ClusterColumn>(&raw)? {
                config.cluster_columns.set(column.as_str(), index);
            }
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    })
}

/// Parse `Name=index` pairs separated by commas, e.g. `County=3,City=10`.
pub fn parse_column_overrides<C: FromStr>(raw: &str) -> ConfigResult<Vec<(C, usize)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| -> ConfigResult<(C, usize)> {
            let (name, index) = pair.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
                key: "column override".to_string(),
                value: pair.to_string(),
            })?;
            let column = name
                .trim()
                .parse::<C>()
                .map_err(|_| ConfigError::UnknownColumn(name.trim().to_string()))?;
            Ok((column, parse_value("column index", index)?))
        })
        .collect()
}
