//! Store and cluster rows.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use super::{ColumnSelection, Record, RowCells};
use crate::error::RowError;

// =============================================================================
// Store Columns
// =============================================================================

/// Canonical columns of the store table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreColumn {
    State,
    Longitude,
    Latitude,
    StarbucksIndicator,
    County,
    OwnershipType,
    StreetAddress,
    City,
}

impl StoreColumn {
    pub const ALL: [StoreColumn; 8] = [
        Self::State,
        Self::Longitude,
        Self::Latitude,
        Self::StarbucksIndicator,
        Self::County,
        Self::OwnershipType,
        Self::StreetAddress,
        Self::City,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::Longitude => "lon",
            Self::Latitude => "lat",
            Self::StarbucksIndicator => "Starbucks_INDICATOR",
            Self::County => "County",
            Self::OwnershipType => "Ownership_Type",
            Self::StreetAddress => "Street_Address",
            Self::City => "City",
        }
    }
}

impl fmt::Display for StoreColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoreColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// Store Record
// =============================================================================

/// One store row. Only rows with `starbucks_indicator == 1` are mapped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreRecord {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "County", skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(rename = "Ownership_Type", skip_serializing_if = "Option::is_none")]
    pub ownership_type: Option<String>,
    #[serde(rename = "Street_Address", skip_serializing_if = "Option::is_none")]
    pub street_address: Option<String>,
    #[serde(rename = "City", skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(rename = "lon")]
    pub longitude: Option<f64>,
    #[serde(rename = "lat")]
    pub latitude: Option<f64>,
    #[serde(rename = "Starbucks_INDICATOR")]
    pub starbucks_indicator: i64,
}

impl StoreRecord {
    /// A present store at the given position; other fields empty.
    pub fn new(state: impl Into<String>, longitude: Option<f64>, latitude: Option<f64>) -> Self {
        Self {
            state: state.into(),
            county: None,
            ownership_type: None,
            street_address: None,
            city: None,
            longitude,
            latitude,
            starbucks_indicator: 1,
        }
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_indicator(mut self, indicator: i64) -> Self {
        self.starbucks_indicator = indicator;
        self
    }

    pub fn is_present(&self) -> bool {
        self.starbucks_indicator == 1
    }

    /// Positions of `Final_Counties_Starbucks_dataset.csv`.
    pub fn default_selection() -> ColumnSelection {
        ColumnSelection::new()
            .column(2, StoreColumn::State.as_str())
            .column(43, StoreColumn::Longitude.as_str())
            .column(44, StoreColumn::Latitude.as_str())
            .column(45, StoreColumn::StarbucksIndicator.as_str())
    }
}

impl Record for StoreRecord {
    type Column = StoreColumn;

    const REQUIRED: &'static [&'static str] = &["State", "lon", "lat", "Starbucks_INDICATOR"];

    fn from_row(row: &RowCells<'_>) -> Result<Option<Self>, RowError> {
        let Some(state) = row.owned_text(StoreColumn::State.as_str()) else {
            return Ok(None);
        };
        Ok(Some(Self {
            state,
            county: row.owned_text(StoreColumn::County.as_str()),
            ownership_type: row.owned_text(StoreColumn::OwnershipType.as_str()),
            street_address: row.owned_text(StoreColumn::StreetAddress.as_str()),
            city: row.owned_text(StoreColumn::City.as_str()),
            longitude: row.float(StoreColumn::Longitude.as_str())?,
            latitude: row.float(StoreColumn::Latitude.as_str())?,
            // A blank flag never equals 1, so it reads as "no store".
            starbucks_indicator: row
                .integer(StoreColumn::StarbucksIndicator.as_str())?
                .unwrap_or(0),
        }))
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn value(&self, column: StoreColumn) -> Option<Cow<'_, str>> {
        match column {
            StoreColumn::State => Some(Cow::Borrowed(&self.state)),
            StoreColumn::County => self.county.as_deref().map(Cow::Borrowed),
            StoreColumn::OwnershipType => self.ownership_type.as_deref().map(Cow::Borrowed),
            StoreColumn::StreetAddress => self.street_address.as_deref().map(Cow::Borrowed),
            StoreColumn::City => self.city.as_deref().map(Cow::Borrowed),
            StoreColumn::Longitude => self.longitude.map(|v| Cow::Owned(v.to_string())),
            StoreColumn::Latitude => self.latitude.map(|v| Cow::Owned(v.to_string())),
            StoreColumn::StarbucksIndicator => {
                Some(Cow::Owned(self.starbucks_indicator.to_string()))
            }
        }
    }
}

// =============================================================================
// Cluster Columns
// =============================================================================

/// Canonical columns of the county-clustering table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterColumn {
    State,
    Latitude,
    Longitude,
    ClusterGroup,
    ClusterName,
}

impl ClusterColumn {
    pub const ALL: [ClusterColumn; 5] = [
        Self::State,
        Self::Latitude,
        Self::Longitude,
        Self::ClusterGroup,
        Self::ClusterName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "State",
            Self::Latitude => "Latitude",
            Self::Longitude => "Longitude",
            Self::ClusterGroup => "Cluster_Groups",
            Self::ClusterName => "Cluster_Names",
        }
    }
}

impl fmt::Display for ClusterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

// =============================================================================
// Cluster Record
// =============================================================================

/// One county of the clustering output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterRecord {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Latitude")]
    pub latitude: Option<f64>,
    #[serde(rename = "Longitude")]
    pub longitude: Option<f64>,
    #[serde(rename = "Cluster_Groups")]
    pub cluster_group: i64,
    #[serde(rename = "Cluster_Names")]
    pub cluster_name: String,
}

impl ClusterRecord {
    pub fn new(
        state: impl Into<String>,
        longitude: f64,
        latitude: f64,
        cluster_group: i64,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            state: state.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
            cluster_group,
            cluster_name: cluster_name.into(),
        }
    }

    /// Positions of `county_clustering.csv`.
    pub fn default_selection() -> ColumnSelection {
        ColumnSelection::new()
            .column(0, ClusterColumn::State.as_str())
            .column(2, ClusterColumn::Latitude.as_str())
            .column(3, ClusterColumn::Longitude.as_str())
            .column(4, ClusterColumn::ClusterGroup.as_str())
            .column(5, ClusterColumn::ClusterName.as_str())
    }
}

impl Record for ClusterRecord {
    type Column = ClusterColumn;

    const REQUIRED: &'static [&'static str] = &[
        "State",
        "Latitude",
        "Longitude",
        "Cluster_Groups",
        "Cluster_Names",
    ];

    fn from_row(row: &RowCells<'_>) -> Result<Option<Self>, RowError> {
        let (Some(state), Some(cluster_name)) = (
            row.owned_text(ClusterColumn::State.as_str()),
            row.owned_text(ClusterColumn::ClusterName.as_str()),
        ) else {
            return Ok(None);
        };
        let group_col = ClusterColumn::ClusterGroup.as_str();
        let cluster_group = row.integer(group_col)?.ok_or_else(|| {
            RowError::new(row.line(), "missing value").with_column(group_col)
        })?;

        Ok(Some(Self {
            state,
            latitude: row.float(ClusterColumn::Latitude.as_str())?,
            longitude: row.float(ClusterColumn::Longitude.as_str())?,
            cluster_group,
            cluster_name,
        }))
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    fn value(&self, column: ClusterColumn) -> Option<Cow<'_, str>> {
        match column {
            ClusterColumn::State => Some(Cow::Borrowed(&self.state)),
            ClusterColumn::ClusterName => Some(Cow::Borrowed(&self.cluster_name)),
            ClusterColumn::ClusterGroup => Some(Cow::Owned(self.cluster_group.to_string())),
            ClusterColumn::Latitude => self.latitude.map(|v| Cow::Owned(v.to_string())),
            ClusterColumn::Longitude => self.longitude.map(|v| Cow::Owned(v.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_store_from_row() {
        let names = strings(&["State", "lon", "lat", "Starbucks_INDICATOR", "County"]);
        let cells = strings(&["CA", "-120.0", "37.0", "1", "Fresno"]);
        let rec = StoreRecord::from_row(&RowCells::new(2, &names, &cells))
            .unwrap()
            .unwrap();

        assert_eq!(rec.state, "CA");
        assert_eq!(rec.longitude, Some(-120.0));
        assert_eq!(rec.county.as_deref(), Some("Fresno"));
        assert!(rec.is_present());
        assert_eq!(rec.city, None);
    }

    #[test]
    fn test_store_null_state_excluded() {
        let names = strings(&["State", "lon", "lat", "Starbucks_INDICATOR"]);
        let cells = strings(&["", "-120.0", "37.0", "1"]);
        let rec = StoreRecord::from_row(&RowCells::new(2, &names, &cells)).unwrap();
        assert!(rec.is_none());
    }

    #[test]
    fn test_store_blank_indicator_is_absent() {
        let names = strings(&["State", "lon", "lat", "Starbucks_INDICATOR"]);
        let cells = strings(&["NY", "", "", ""]);
        let rec = StoreRecord::from_row(&RowCells::new(2, &names, &cells))
            .unwrap()
            .unwrap();
        assert!(!rec.is_present());
        assert_eq!(rec.position(), None);
    }

    #[test]
    fn test_cluster_missing_group_is_error() {
        let names = strings(&["State", "Latitude", "Longitude", "Cluster_Groups", "Cluster_Names"]);
        let cells = strings(&["TX", "31.0", "-97.0", "", "Suburban"]);
        let err = ClusterRecord::from_row(&RowCells::new(9, &names, &cells)).unwrap_err();
        assert_eq!(err.line, 9);
        assert_eq!(err.column.as_deref(), Some("Cluster_Groups"));
    }

    #[test]
    fn test_column_names_roundtrip() {
        for col in StoreColumn::ALL {
            assert_eq!(col.as_str().parse::<StoreColumn>(), Ok(col));
        }
        for col in ClusterColumn::ALL {
            assert_eq!(col.to_string().parse::<ClusterColumn>(), Ok(col));
        }
        assert!("state".parse::<StoreColumn>().is_err());
    }

    #[test]
    fn test_value_formats_numbers() {
        let rec = ClusterRecord::new("WA", -122.3, 47.6, 2, "Urban Core");
        assert_eq!(rec.value(ClusterColumn::ClusterGroup).as_deref(), Some("2"));
        assert_eq!(rec.value(ClusterColumn::ClusterName).as_deref(), Some("Urban Core"));
    }

    #[test]
    fn test_store_serializes_canonical_names() {
        let rec = StoreRecord::new("CA", Some(-120.0), Some(37.0));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["State"], "CA");
        assert_eq!(json["lon"], -120.0);
        assert_eq!(json["Starbucks_INDICATOR"], 1);
        assert!(json.get("County").is_none());
    }
}
