//! Transformation module.
//!
//! - Filter: selector matching and selector domains
//! - Aggregate: centroids and grouped counts
//! - Pipeline: per-page select → filter → aggregate

pub mod aggregate;
pub mod filter;
pub mod pipeline;

pub use aggregate::{centroid, count_by};
pub use filter::{distinct_values, filter, present_stores, with_coordinates};
pub use pipeline::*;
