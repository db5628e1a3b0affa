//! Page pipeline: select → filter → aggregate, for each dashboard page.
//!
//! Every page runs the same sequence over an immutable [`DataStore`]; a
//! [`PageConfig`] only says which table, which discriminator column and which
//! category column to use.
//!
//! # Example
//!
//! ```rust,ignore
//! use storemap::{build_view, find_page, CountOrder, DataStore};
//!
//! let page = find_page("overall")?;
//! let view = build_view(&store, page, Some("CA"), CountOrder::Lexical);
//! println!("{} stores around {:?}", view.rows.len(), view.centroid);
//! ```

use serde::Serialize;
use std::str::FromStr;

use super::aggregate::{centroid, count_by};
use super::filter::{distinct_values, filter};
use crate::api::logs::{log_info, log_warning};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{
    CategoryCount, Centroid, ClusterColumn, ClusterRecord, CountOrder, Record, StoreColumn,
    StoreRecord, Table,
};
use crate::store::DataStore;

// =============================================================================
// Page configuration
// =============================================================================

/// Which table a page reads and the columns it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSource {
    Stores {
        selector: StoreColumn,
        category: StoreColumn,
        presence_only: bool,
    },
    Clusters {
        selector: ClusterColumn,
        category: ClusterColumn,
    },
}

/// Whether grouped counts cover the selection or the whole page table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CountScope {
    Selection,
    All,
}

/// One dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub slug: &'static str,
    pub title: &'static str,
    pub source: PageSource,
    pub count_scope: CountScope,
}

impl PageConfig {
    /// Query parameter carrying the selector; also the discriminator column.
    pub fn selector_param(&self) -> &'static str {
        match self.source {
            PageSource::Stores { selector, .. } => selector.as_str(),
            PageSource::Clusters { selector, .. } => selector.as_str(),
        }
    }

    pub fn dataset(&self) -> &'static str {
        match self.source {
            PageSource::Stores { .. } => "stores",
            PageSource::Clusters { .. } => "clusters",
        }
    }
}

/// Store locations by state; bar chart of stores per county.
pub const OVERALL_PAGE: PageConfig = PageConfig {
    slug: "overall",
    title: "Starbucks Store Locator Dashboard",
    source: PageSource::Stores {
        selector: StoreColumn::State,
        category: StoreColumn::County,
        presence_only: true,
    },
    count_scope: CountScope::Selection,
};

/// County clusters by cluster name; counts form the all-clusters legend.
pub const CLASSIFIER_PAGE: PageConfig = PageConfig {
    slug: "classifier",
    title: "Starbucks Store Clusters Dashboard",
    source: PageSource::Clusters {
        selector: ClusterColumn::ClusterName,
        category: ClusterColumn::ClusterName,
    },
    count_scope: CountScope::All,
};

static PAGES: [PageConfig; 2] = [OVERALL_PAGE, CLASSIFIER_PAGE];

/// All built-in pages.
pub fn pages() -> &'static [PageConfig] {
    &PAGES
}

pub fn find_page(slug: &str) -> PipelineResult<&'static PageConfig> {
    PAGES
        .iter()
        .find(|p| p.slug == slug)
        .ok_or_else(|| PipelineError::UnknownPage(slug.to_string()))
}

// =============================================================================
// Page view
// =============================================================================

/// Filtered rows of either table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewRows {
    Stores(Table<StoreRecord>),
    Clusters(Table<ClusterRecord>),
}

impl ViewRows {
    pub fn len(&self) -> usize {
        match self {
            ViewRows::Stores(t) => t.len(),
            ViewRows::Clusters(t) => t.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything the presentation layer needs for one page interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    pub page: String,
    pub title: String,
    pub selector_param: String,
    /// Selector in effect; the first domain value when none was given
    pub selected: Option<String>,
    /// Valid selector values, first-occurrence order
    pub selectors: Vec<String>,
    pub rows: ViewRows,
    /// Centroid of `rows`; `None` when the selection has no coordinates
    pub centroid: Option<Centroid>,
    /// Centroid of the whole page table
    pub overall_centroid: Option<Centroid>,
    pub count_column: String,
    pub count_scope: CountScope,
    pub counts: Vec<CategoryCount>,
    /// Rows in the page table before selection
    pub total_rows: usize,
}

/// Intermediate result shared by both record types.
struct Parts<R> {
    selected: Option<String>,
    selectors: Vec<String>,
    rows: Table<R>,
    centroid: Option<Centroid>,
    overall_centroid: Option<Centroid>,
    count_column: String,
    counts: Vec<CategoryCount>,
    total_rows: usize,
}

/// The page table: the loaded table, or its present stores if asked.
fn page_table(store: &DataStore, presence_only: bool) -> &Table<StoreRecord> {
    if presence_only {
        store.present_stores()
    } else {
        store.stores()
    }
}

/// The category column to count by, or the selector when it was not loaded.
fn resolve_category<R: Record>(table: &Table<R>, category: R::Column, selector: R::Column) -> R::Column {
    let name = category.to_string();
    if table.columns().iter().any(|c| *c == name) {
        category
    } else {
        selector
    }
}

fn run<R: Record>(
    table: &Table<R>,
    selector_col: R::Column,
    category: R::Column,
    selector: Option<&str>,
    scope: CountScope,
    order: CountOrder,
) -> Parts<R> {
    let selectors = distinct_values(table, selector_col);
    let selected = selector
        .map(str::to_string)
        .or_else(|| selectors.first().cloned());

    let rows = match &selected {
        Some(value) => filter(table, selector_col, value),
        None => table.derive(Vec::new()),
    };

    let category = resolve_category(table, category, selector_col);
    let counts = match scope {
        CountScope::Selection => count_by(&rows, category, order),
        CountScope::All => count_by(table, category, order),
    };

    Parts {
        centroid: centroid(&rows).ok(),
        overall_centroid: centroid(table).ok(),
        count_column: category.to_string(),
        counts,
        total_rows: table.len(),
        selected,
        selectors,
        rows,
    }
}

fn assemble<R>(page: &PageConfig, parts: Parts<R>, rows: impl FnOnce(Table<R>) -> ViewRows) -> PageView {
    PageView {
        page: page.slug.to_string(),
        title: page.title.to_string(),
        selector_param: page.selector_param().to_string(),
        selected: parts.selected,
        selectors: parts.selectors,
        rows: rows(parts.rows),
        centroid: parts.centroid,
        overall_centroid: parts.overall_centroid,
        count_column: parts.count_column,
        count_scope: page.count_scope,
        counts: parts.counts,
        total_rows: parts.total_rows,
    }
}

/// Run one page interaction.
///
/// A selector outside the domain is not an error: it yields an empty
/// selection with no centroid.
pub fn build_view(
    store: &DataStore,
    page: &PageConfig,
    selector: Option<&str>,
    order: CountOrder,
) -> PageView {
    let view = match page.source {
        PageSource::Stores {
            selector: col,
            category,
            presence_only,
        } => {
            let table = page_table(store, presence_only);
            let parts = run(table, col, category, selector, page.count_scope, order);
            assemble(page, parts, ViewRows::Stores)
        }
        PageSource::Clusters {
            selector: col,
            category,
        } => {
            let parts = run(store.clusters(), col, category, selector, page.count_scope, order);
            assemble(page, parts, ViewRows::Clusters)
        }
    };

    log_info(format!(
        "Page '{}': {}={} → {} of {} rows",
        page.slug,
        view.selector_param,
        view.selected.as_deref().unwrap_or("<none>"),
        view.rows.len(),
        view.total_rows
    ));
    if view.centroid.is_none() {
        log_warning("Selection has no coordinates; centroid omitted");
    }

    view
}

/// Pages whose category column is not loaded, so their counts fall back to
/// the selector column. Each one is logged as a warning.
pub fn category_fallbacks(store: &DataStore) -> Vec<&'static PageConfig> {
    let fallbacks: Vec<&'static PageConfig> = PAGES
        .iter()
        .filter(|page| match page.source {
            PageSource::Stores { selector, category, .. } => {
                resolve_category(store.stores(), category, selector) != category
            }
            PageSource::Clusters { selector, category } => {
                resolve_category(store.clusters(), category, selector) != category
            }
        })
        .collect();

    for page in &fallbacks {
        log_warning(format!(
            "Page '{}': category column not loaded, counting by '{}' instead",
            page.slug,
            page.selector_param()
        ));
    }
    fallbacks
}

/// Selector domain of a page.
pub fn selector_domain(store: &DataStore, page: &PageConfig) -> Vec<String> {
    match page.source {
        PageSource::Stores {
            selector,
            presence_only,
            ..
        } => distinct_values(page_table(store, presence_only), selector),
        PageSource::Clusters { selector, .. } => distinct_values(store.clusters(), selector),
    }
}

/// Grouped counts of any column of a page's table.
///
/// `column` defaults to the page's category column.
pub fn page_counts(
    store: &DataStore,
    page: &PageConfig,
    column: Option<&str>,
    order: CountOrder,
) -> PipelineResult<Vec<CategoryCount>> {
    match page.source {
        PageSource::Stores {
            selector,
            category,
            presence_only,
        } => {
            let table = page_table(store, presence_only);
            let col = match column {
                Some(name) => parse_column::<StoreColumn>(page, name)?,
                None => resolve_category(table, category, selector),
            };
            Ok(count_by(table, col, order))
        }
        PageSource::Clusters { selector, category } => {
            let table = store.clusters();
            let col = match column {
                Some(name) => parse_column::<ClusterColumn>(page, name)?,
                None => resolve_category(table, category, selector),
            };
            Ok(count_by(table, col, order))
        }
    }
}

fn parse_column<C: FromStr>(page: &PageConfig, name: &str) -> PipelineResult<C> {
    name.parse().map_err(|_| PipelineError::UnknownColumn {
        page: page.slug.to_string(),
        column: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DataStore {
        let mut store_columns = StoreRecord::default_selection();
        store_columns.set("County", 3);
        let stores = Table::new(
            store_columns.names(),
            vec![
                StoreRecord::new("CA", Some(-120.0), Some(37.0)).with_county("Fresno"),
                StoreRecord::new("CA", Some(-121.0), Some(38.0)).with_county("Marin"),
                StoreRecord::new("NY", Some(-74.0), Some(40.7)).with_county("Kings"),
                StoreRecord::new("CA", Some(-118.0), Some(34.0))
                    .with_county("Fresno")
                    .with_indicator(0),
                StoreRecord::new("TX", None, None).with_county("Travis"),
            ],
        );
        let clusters = Table::new(
            ClusterRecord::default_selection().names(),
            vec![
                ClusterRecord::new("WA", -121.8, 47.5, 0, "Urban Core"),
                ClusterRecord::new("TX", -97.8, 30.3, 1, "Suburban"),
                ClusterRecord::new("OR", -122.6, 45.5, 0, "Urban Core"),
            ],
        );
        DataStore::from_tables(stores, clusters)
    }

    #[test]
    fn test_overall_page_scenario() {
        let view = build_view(&store(), &OVERALL_PAGE, Some("CA"), CountOrder::Lexical);

        assert_eq!(view.selected.as_deref(), Some("CA"));
        assert_eq!(view.rows.len(), 2);
        assert_eq!(
            view.centroid,
            Some(Centroid { longitude: -120.5, latitude: 37.5 })
        );
        assert_eq!(view.count_column, "County");
        assert_eq!(
            view.counts,
            vec![
                CategoryCount { category: Some("Fresno".into()), count: 1 },
                CategoryCount { category: Some("Marin".into()), count: 1 },
            ]
        );
        // The indicator-0 row is outside the page table.
        assert_eq!(view.total_rows, 4);
    }

    #[test]
    fn test_default_selection_is_first_selector() {
        let view = build_view(&store(), &OVERALL_PAGE, None, CountOrder::Lexical);
        assert_eq!(view.selectors, vec!["CA", "NY", "TX"]);
        assert_eq!(view.selected.as_deref(), Some("CA"));
    }

    #[test]
    fn test_selector_without_coordinates() {
        let view = build_view(&store(), &OVERALL_PAGE, Some("TX"), CountOrder::Lexical);
        assert!(view.rows.is_empty());
        assert_eq!(view.centroid, None);
        assert!(view.overall_centroid.is_some());
        assert!(view.counts.is_empty());
    }

    #[test]
    fn test_unknown_selector_is_empty_view() {
        let view = build_view(&store(), &OVERALL_PAGE, Some("ca"), CountOrder::Lexical);
        assert_eq!(view.selected.as_deref(), Some("ca"));
        assert!(view.rows.is_empty());
        assert_eq!(view.centroid, None);
    }

    #[test]
    fn test_classifier_page_counts_full_table() {
        let view = build_view(&store(), &CLASSIFIER_PAGE, Some("Suburban"), CountOrder::Lexical);

        assert_eq!(view.selector_param, "Cluster_Names");
        assert_eq!(view.rows.len(), 1);
        assert_eq!(
            view.counts,
            vec![
                CategoryCount { category: Some("Suburban".into()), count: 1 },
                CategoryCount { category: Some("Urban Core".into()), count: 2 },
            ]
        );
    }

    #[test]
    fn test_category_falls_back_to_selector() {
        let stores = Table::new(
            StoreRecord::default_selection().names(),
            vec![StoreRecord::new("CA", Some(-120.0), Some(37.0))],
        );
        let store = DataStore::from_tables(stores, Table::new(Vec::new(), Vec::new()));

        let view = build_view(&store, &OVERALL_PAGE, None, CountOrder::Lexical);
        assert_eq!(view.count_column, "State");
        assert_eq!(view.counts[0].count, 1);
    }

    #[test]
    fn test_category_fallbacks_reported() {
        assert!(category_fallbacks(&store()).is_empty());

        let stores = Table::new(StoreRecord::default_selection().names(), Vec::new());
        let clusters = Table::new(ClusterRecord::default_selection().names(), Vec::new());
        let fallbacks = category_fallbacks(&DataStore::from_tables(stores, clusters));

        assert_eq!(fallbacks.len(), 1);
        assert_eq!(fallbacks[0].slug, "overall");
    }

    #[test]
    fn test_empty_cluster_table() {
        let store = DataStore::from_tables(Table::new(Vec::new(), Vec::new()), Table::new(Vec::new(), Vec::new()));
        let view = build_view(&store, &CLASSIFIER_PAGE, None, CountOrder::Lexical);
        assert_eq!(view.selected, None);
        assert!(view.rows.is_empty());
        assert_eq!(view.overall_centroid, None);
    }

    #[test]
    fn test_find_page() {
        assert_eq!(find_page("classifier").unwrap().slug, "classifier");
        assert_eq!(
            find_page("overview"),
            Err(PipelineError::UnknownPage("overview".into()))
        );
    }

    #[test]
    fn test_page_counts_column_override() {
        let store = store();
        let states = page_counts(&store, &OVERALL_PAGE, Some("State"), CountOrder::FirstSeen).unwrap();
        assert_eq!(states[0], CategoryCount { category: Some("CA".into()), count: 2 });

        let groups = page_counts(&store, &CLASSIFIER_PAGE, Some("Cluster_Groups"), CountOrder::Lexical).unwrap();
        assert_eq!(groups.len(), 2);

        let err = page_counts(&store, &CLASSIFIER_PAGE, Some("lon"), CountOrder::Lexical).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn { .. }));
    }

    #[test]
    fn test_selector_domain() {
        assert_eq!(selector_domain(&store(), &CLASSIFIER_PAGE), vec!["Urban Core", "Suburban"]);
    }

    #[test]
    fn test_view_serializes_for_presentation() {
        let view = build_view(&store(), &OVERALL_PAGE, Some("NY"), CountOrder::Lexical);
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["selectorParam"], "State");
        assert_eq!(json["rows"]["rows"][0]["State"], "NY");
        assert_eq!(json["centroid"]["longitude"], -74.0);
        assert_eq!(json["countScope"], "selection");
    }
}
