//! Selector filtering and selector domains.
//!
//! Matching is exact string equality on the discriminator column: no trimming,
//! no case folding. A selector that matches nothing yields an empty table.

use std::collections::HashSet;

use crate::models::{Record, StoreRecord, Table};

/// Rows with both coordinates whose `column` equals `selector`.
///
/// Row order and the column set of `table` are preserved.
pub fn filter<R: Record>(table: &Table<R>, column: R::Column, selector: &str) -> Table<R> {
    table.select(|row| {
        row.position().is_some() && row.value(column).as_deref() == Some(selector)
    })
}

/// Rows with both coordinates, regardless of any selector.
pub fn with_coordinates<R: Record>(table: &Table<R>) -> Table<R> {
    table.select(|row| row.position().is_some())
}

/// Store rows flagged as actual store locations.
pub fn present_stores(table: &Table<StoreRecord>) -> Table<StoreRecord> {
    table.select(StoreRecord::is_present)
}

/// Distinct non-null values of `column`, in first-occurrence order.
pub fn distinct_values<R: Record>(table: &Table<R>, column: R::Column) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut values = Vec::new();

    for row in table.iter() {
        if let Some(value) = row.value(column) {
            if !seen.contains(&*value) {
                seen.insert(value.to_string());
                values.push(value.into_owned());
            }
        }
    }

    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterColumn, ClusterRecord, StoreColumn};

    fn stores() -> Table<StoreRecord> {
        let columns = StoreRecord::default_selection().names();
        Table::new(
            columns,
            vec![
                StoreRecord::new("CA", Some(-120.0), Some(37.0)),
                StoreRecord::new("CA", Some(-121.0), Some(38.0)),
                StoreRecord::new("NY", Some(-74.0), Some(40.7)),
            ],
        )
    }

    fn with_gaps() -> Table<StoreRecord> {
        let mut rows = stores().rows().to_vec();
        rows.insert(1, StoreRecord::new("CA", None, Some(36.0)));
        rows.push(StoreRecord::new("NY", Some(-73.9), None));
        rows.push(StoreRecord::new("WA", None, None).with_indicator(0));
        stores().derive(rows)
    }

    #[test]
    fn test_filter_scenario() {
        let table = stores();
        let ca = filter(&table, StoreColumn::State, "CA");

        assert_eq!(ca.rows(), &table.rows()[..2]);
        assert_eq!(ca.columns(), table.columns());
    }

    #[test]
    fn test_null_longitude_always_dropped() {
        let table = with_gaps();
        let ca = filter(&table, StoreColumn::State, "CA");

        assert_eq!(ca.len(), 2);
        assert!(ca.iter().all(|r| r.longitude.is_some()));
        assert!(filter(&table, StoreColumn::State, "NY")
            .iter()
            .all(|r| r.latitude.is_some()));
    }

    #[test]
    fn test_absent_selector_is_empty() {
        let tx = filter(&stores(), StoreColumn::State, "TX");
        assert!(tx.is_empty());
        assert_eq!(tx.columns(), stores().columns());
    }

    #[test]
    fn test_exact_match_no_case_folding() {
        assert!(filter(&stores(), StoreColumn::State, "ca").is_empty());
        assert!(filter(&stores(), StoreColumn::State, "CA ").is_empty());
    }

    #[test]
    fn test_filter_idempotent() {
        let once = filter(&with_gaps(), StoreColumn::State, "CA");
        let twice = filter(&once, StoreColumn::State, "CA");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_partition_property() {
        let table = with_gaps();
        let dropped = table.len() - with_coordinates(&table).len();

        let mut total = 0;
        for state in distinct_values(&table, StoreColumn::State) {
            let part = filter(&table, StoreColumn::State, &state);
            assert!(part.iter().all(|r| r.state == state));
            total += part.len();
        }
        assert_eq!(total + dropped, table.len());
    }

    #[test]
    fn test_distinct_values_first_seen_order() {
        let table = with_gaps();
        let states = distinct_values(&table, StoreColumn::State);
        assert_eq!(states, vec!["CA", "NY", "WA"]);
        assert_eq!(states, distinct_values(&table, StoreColumn::State));
    }

    #[test]
    fn test_distinct_skips_nulls() {
        let table = stores();
        assert!(distinct_values(&table, StoreColumn::County).is_empty());
    }

    #[test]
    fn test_present_stores() {
        let present = present_stores(&with_gaps());
        assert_eq!(present.len(), 5);
        assert!(present.iter().all(StoreRecord::is_present));
    }

    #[test]
    fn test_filter_clusters_by_name() {
        let table = Table::new(
            ClusterRecord::default_selection().names(),
            vec![
                ClusterRecord::new("WA", -121.8, 47.5, 0, "Urban Core"),
                ClusterRecord::new("TX", -97.8, 30.3, 1, "Suburban"),
                ClusterRecord::new("OR", -122.6, 45.5, 0, "Urban Core"),
            ],
        );

        let urban = filter(&table, ClusterColumn::ClusterName, "Urban Core");
        assert_eq!(urban.len(), 2);
        assert_eq!(urban.rows()[1].state, "OR");

        let group = filter(&table, ClusterColumn::ClusterGroup, "1");
        assert_eq!(group.rows()[0].cluster_name, "Suburban");
    }
}
