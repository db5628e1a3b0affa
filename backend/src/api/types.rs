//! REST API response types.
//!
//! Every body carries a `requestId` and a `generatedAt` timestamp; the
//! payload fields sit next to them at the top level.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::CategoryCount;
use crate::parser::LoadReport;
use crate::transform::pipeline::{CountScope, PageConfig, PageView};

/// Identity and time of one response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub request_id: String,
    pub generated_at: DateTime<Utc>,
}

impl ResponseMetadata {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            generated_at: Utc::now(),
        }
    }
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    pub status: String,
    pub service: String,
    pub version: String,
    pub sources: Vec<LoadReport>,
}

/// Page listing entry.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub slug: String,
    pub title: String,
    pub dataset: String,
    pub selector_param: String,
    pub count_scope: CountScope,
}

impl From<&PageConfig> for PageInfo {
    fn from(page: &PageConfig) -> Self {
        Self {
            slug: page.slug.to_string(),
            title: page.title.to_string(),
            dataset: page.dataset().to_string(),
            selector_param: page.selector_param().to_string(),
            count_scope: page.count_scope,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagesResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    pub pages: Vec<PageInfo>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    /// "ready", or "empty" when the selection matched no mappable row
    pub status: String,
    #[serde(flatten)]
    pub view: PageView,
}

impl From<PageView> for ViewResponse {
    fn from(view: PageView) -> Self {
        let status = if view.rows.is_empty() { "empty" } else { "ready" };
        Self {
            metadata: ResponseMetadata::new(),
            status: status.to_string(),
            view,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorsResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    pub page: String,
    pub selector_param: String,
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountsResponse {
    #[serde(flatten)]
    pub metadata: ResponseMetadata,
    pub page: String,
    pub counts: Vec<CategoryCount>,
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    let metadata = ResponseMetadata::new();
    json!({
        "requestId": metadata.request_id,
        "generatedAt": metadata.generated_at,
        "status": "error",
        "error": error,
    })
}
