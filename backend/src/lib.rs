//! # Storemap - store-location dashboards from CSV
//!
//! Storemap loads a store table and a county-clustering table from CSV,
//! filters them by a selector (a state or a cluster name) and computes the
//! aggregates a map dashboard needs: the centroid to center on and grouped
//! counts for the bar chart.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Loader    │────▶│   Filter    │────▶│  Aggregate  │
//! │  (ISO/UTF8) │     │  (once)     │     │  (selector) │     │ (centroid)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storemap::{build_view, find_page, AppConfig, CountOrder, DataStore, SourceCache};
//!
//! let config = AppConfig::from_env()?;
//! let store = DataStore::open(&config, &SourceCache::new())?;
//! let view = build_view(&store, find_page("overall")?, Some("CA"), CountOrder::Lexical);
//! println!("centered on {:?}", view.centroid);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Tables, records and aggregate outputs
//! - [`parser`] - CSV loading with encoding detection
//! - [`transform`] - Filter, aggregate and page pipeline
//! - [`cache`] - Loaded-table cache
//! - [`store`] - The immutable data both pages read
//! - [`config`] - Environment configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Loading
pub mod config;
pub mod parser;

// Transformation
pub mod transform;

// Caching
pub mod cache;
pub mod store;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AggregationError, ConfigError, LoadError, PipelineError, RowError, ServerError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CategoryCount, Centroid, ClusterColumn, ClusterRecord, ColumnSelection, CountOrder, Record,
    StoreColumn, StoreRecord, Table,
};

// =============================================================================
// Re-exports - Loading
// =============================================================================

pub use config::AppConfig;
pub use parser::{load_table, load_table_from_bytes, LoadReport, Loaded};

// =============================================================================
// Re-exports - Filter / Aggregate
// =============================================================================

pub use transform::{centroid, count_by, distinct_values, filter, present_stores};

// =============================================================================
// Re-exports - Cache / Store
// =============================================================================

pub use cache::{SourceCache, TableCache};
pub use store::DataStore;

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_view, category_fallbacks, find_page, page_counts, pages, selector_domain, PageConfig,
    PageView,
};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
