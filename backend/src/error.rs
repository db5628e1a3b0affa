//! Error types for the storemap pipeline.
//!
//! - [`RowError`] - a single bad cell, with line/column/value context
//! - [`LoadError`] - the source could not be turned into a table
//! - [`AggregationError`] - an aggregate is undefined for the input
//! - [`ConfigError`] - invalid environment or CLI configuration
//! - [`PipelineError`] - a page request names something that does not exist
//! - [`ServerError`] - HTTP/CLI edge errors
//!
//! Conversions are provided via `From` so `?` works across layers.

use thiserror::Error;

// =============================================================================
// Row Errors
// =============================================================================

/// A malformed cell, located by source line and canonical column.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub column: Option<String>,
    pub value: Option<String>,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.column, &self.value) {
            (Some(col), Some(val)) => {
                write!(f, "Line {}, column '{}' (value '{}'): {}", self.line, col, val, self.message)
            }
            (Some(col), None) => {
                write!(f, "Line {}, column '{}': {}", self.line, col, self.message)
            }
            _ => write!(f, "Line {}: {}", self.line, self.message),
        }
    }
}

impl std::error::Error for RowError {}

impl RowError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column: None,
            value: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

// =============================================================================
// Load Errors
// =============================================================================

/// Errors while loading a source into a table.
///
/// A load either yields a complete table or one of these; there is no
/// partially loaded result.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read the source.
    #[error("Failed to read source '{source_name}': {reason}")]
    Unreadable { source_name: String, reason: String },

    /// Source has no header row.
    #[error("Source '{0}' is empty")]
    EmptySource(String),

    /// A requested column index does not exist in the source.
    #[error("Column '{name}' requests index {index}, but the source has {width} columns")]
    ColumnOutOfRange { name: String, index: usize, width: usize },

    /// The same canonical name was requested twice.
    #[error("Canonical column '{0}' is selected more than once")]
    DuplicateColumn(String),

    /// A column the record type needs is not part of the selection.
    #[error("Required column '{0}' is not selected")]
    MissingColumn(String),

    /// Invalid CSV framing.
    #[error("Invalid CSV: {0}")]
    Csv(String),

    /// A cell could not be interpreted.
    #[error("Malformed row: {0}")]
    Row(#[from] RowError),
}

impl From<csv::Error> for LoadError {
    fn from(e: csv::Error) -> Self {
        LoadError::Csv(e.to_string())
    }
}

// =============================================================================
// Aggregation Errors
// =============================================================================

/// Errors from aggregate computations.
#[derive(Debug, Error, PartialEq)]
pub enum AggregationError {
    /// No row carries usable coordinates.
    #[error("Cannot aggregate an empty table")]
    Empty,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but unparsable.
    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    /// Column override names a column the table does not have.
    #[error("Unknown column in override: '{0}'")]
    UnknownColumn(String),
}

// =============================================================================
// Pipeline Errors
// =============================================================================

/// Errors resolving a page request.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// No page with this slug.
    #[error("Unknown page: '{0}'")]
    UnknownPage(String),

    /// The page's table has no such column.
    #[error("Page '{page}' has no column '{column}'")]
    UnknownColumn { page: String, column: String },
}

// =============================================================================
// Server Errors
// =============================================================================

/// Errors surfaced at the HTTP and CLI edge.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Loading failed.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Configuration invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Page request error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ServerError {
    fn from(e: std::io::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::Internal(e.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for aggregate operations.
pub type AggregationResult<T> = Result<T, AggregationError>;

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for page requests.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
