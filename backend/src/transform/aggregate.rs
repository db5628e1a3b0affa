//! Centroids and grouped counts.
//!
//! ```text
//! rows (filtered)               →  counts (Lexical)
//! ┌──────────────────────────┐    ┌──────────────────┐
//! │ County: Kings            │    │ Fresno   1       │
//! │ County: Fresno           │ →  │ Kings    2       │
//! │ County: Kings            │    └──────────────────┘
//! └──────────────────────────┘
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::error::{AggregationError, AggregationResult};
use crate::models::{CategoryCount, Centroid, CountOrder, Record, Table};

/// Mean longitude and mean latitude, each over its own non-null values.
///
/// Fails with [`AggregationError::Empty`] when either column has no values.
pub fn centroid<R: Record>(table: &Table<R>) -> AggregationResult<Centroid> {
    Ok(Centroid {
        longitude: mean(table.iter().filter_map(R::longitude))?,
        latitude: mean(table.iter().filter_map(R::latitude))?,
    })
}

fn mean(values: impl Iterator<Item = f64>) -> AggregationResult<f64> {
    let (n, sum) = values.fold((0usize, 0.0), |(n, sum), v| (n + 1, sum + v));
    if n == 0 {
        return Err(AggregationError::Empty);
    }
    Ok(sum / n as f64)
}

/// Number of rows per distinct value of `column`.
///
/// Null values form their own group, so the counts always sum to
/// `table.len()`.
pub fn count_by<R: Record>(
    table: &Table<R>,
    column: R::Column,
    order: CountOrder,
) -> Vec<CategoryCount> {
    let keys = table
        .iter()
        .map(|row| row.value(column).map(|v| v.into_owned()));

    match order {
        CountOrder::Lexical => {
            let mut counts: BTreeMap<Option<String>, usize> = BTreeMap::new();
            for key in keys {
                *counts.entry(key).or_insert(0) += 1;
            }
            counts
                .into_iter()
                .map(|(category, count)| CategoryCount { category, count })
                .collect()
        }
        CountOrder::FirstSeen => {
            let mut slots: HashMap<Option<String>, usize> = HashMap::new();
            let mut counts: Vec<CategoryCount> = Vec::new();
            for key in keys {
                match slots.get(&key) {
                    Some(&i) => counts[i].count += 1,
                    None => {
                        slots.insert(key.clone(), counts.len());
                        counts.push(CategoryCount {
                            category: key,
                            count: 1,
                        });
                    }
                }
            }
            counts
        }
    }
}
