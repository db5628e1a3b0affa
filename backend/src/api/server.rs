//! HTTP server for the store dashboards.
//!
//! Tables are loaded once before the server starts; handlers only read them.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                          |
//! |--------|-------------------------|--------------------------------------|
//! | GET    | `/health`               | Health check and load reports        |
//! | GET    | `/api/pages`            | Page list                            |
//! | GET    | `/api/pages/{page}`     | Page view, `?<selector_param>=value` |
//! | GET    | `/api/selectors/{page}` | Selector domain                      |
//! | GET    | `/api/counts/{page}`    | Grouped counts, `?column=&order=`    |
//! | GET    | `/api/logs`             | SSE stream for real-time logs        |

use axum::{
    extract::{Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::Value;
use std::{collections::HashMap, convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{
    error_response, CountsResponse, HealthResponse, PageInfo, PagesResponse, ResponseMetadata,
    SelectorsResponse, ViewResponse,
};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::models::CountOrder;
use crate::store::DataStore;
use crate::transform::pipeline::{build_view, find_page, page_counts, pages, selector_domain};

type ApiError = (StatusCode, Json<Value>);

/// Build the application router over a loaded store.
pub fn router(store: DataStore) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/pages", get(list_pages))
        .route("/api/pages/{page}", get(view_page))
        .route("/api/selectors/{page}", get(page_selectors))
        .route("/api/counts/{page}", get(counts))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(store)
}

/// Start the HTTP server
pub async fn start_server(store: DataStore, port: u16) -> ServerResult<()> {
    let app = router(store);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log_info(format!("storemap server running on http://localhost:{}", port));
    for page in pages() {
        log_info(format!(
            "GET /api/pages/{}?{}=...  {}",
            page.slug,
            page.selector_param(),
            page.title
        ));
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Map an error to its status code and JSON body.
fn reject(err: ServerError) -> ApiError {
    let status = match &err {
        ServerError::Pipeline(PipelineError::UnknownPage(_)) => StatusCode::NOT_FOUND,
        ServerError::Pipeline(PipelineError::UnknownColumn { .. }) => StatusCode::BAD_REQUEST,
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Load(_) | ServerError::Config(_) | ServerError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    if status.is_server_error() {
        log_error(err.to_string());
    }
    (status, Json(error_response(&err.to_string())))
}

fn parse_order(raw: Option<&String>) -> ServerResult<CountOrder> {
    match raw.map(String::as_str) {
        None | Some("lexical") => Ok(CountOrder::Lexical),
        Some("first-seen") => Ok(CountOrder::FirstSeen),
        Some(other) => Err(ServerError::BadRequest(format!(
            "order must be 'lexical' or 'first-seen', got '{}'",
            other
        ))),
    }
}

async fn health(State(store): State<DataStore>) -> Json<HealthResponse> {
    Json(HealthResponse {
        metadata: ResponseMetadata::new(),
        status: "ok".to_string(),
        service: "storemap".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        sources: store.reports().into_iter().cloned().collect(),
    })
}

async fn list_pages() -> Json<PagesResponse> {
    Json(PagesResponse {
        metadata: ResponseMetadata::new(),
        pages: pages().iter().map(PageInfo::from).collect(),
    })
}

/// Page view; the selector is read from the query parameter named after the
/// page's discriminator column, e.g. `/api/pages/overall?State=CA`.
async fn view_page(
    State(store): State<DataStore>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ViewResponse>, ApiError> {
    let page = find_page(&slug).map_err(|e| reject(e.into()))?;
    let order = parse_order(params.get("order")).map_err(reject)?;
    let selector = params.get(page.selector_param()).map(String::as_str);

    let view = build_view(&store, page, selector, order);
    Ok(Json(ViewResponse::from(view)))
}

async fn page_selectors(
    State(store): State<DataStore>,
    Path(slug): Path<String>,
) -> Result<Json<SelectorsResponse>, ApiError> {
    let page = find_page(&slug).map_err(|e| reject(e.into()))?;

    Ok(Json(SelectorsResponse {
        metadata: ResponseMetadata::new(),
        page: page.slug.to_string(),
        selector_param: page.selector_param().to_string(),
        selectors: selector_domain(&store, page),
    }))
}

async fn counts(
    State(store): State<DataStore>,
    Path(slug): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CountsResponse>, ApiError> {
    let page = find_page(&slug).map_err(|e| reject(e.into()))?;
    let order = parse_order(params.get("order")).map_err(reject)?;
    let counts = page_counts(&store, page, params.get("column").map(String::as_str), order)
        .map_err(|e| reject(e.into()))?;

    Ok(Json(CountsResponse {
        metadata: ResponseMetadata::new(),
        page: page.slug.to_string(),
        counts,
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers skip the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ClusterRecord, StoreRecord, Table};

    fn store() -> DataStore {
        let stores = Table::new(
            StoreRecord::default_selection().names(),
            vec![
                StoreRecord::new("CA", Some(-120.0), Some(37.0)),
                StoreRecord::new("CA", Some(-121.0), Some(38.0)),
                StoreRecord::new("NY", Some(-74.0), Some(40.7)),
                StoreRecord::new("TX", None, None),
            ],
        );
        let clusters = Table::new(
            ClusterRecord::default_selection().names(),
            vec![ClusterRecord::new("WA", -121.8, 47.5, 0, "Urban Core")],
        );
        DataStore::from_tables(stores, clusters)
    }

    fn query(pairs: &[(&str, &str)]) -> Query<HashMap<String, String>> {
        Query(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_view_page_reads_selector_param() {
        let Json(resp) = view_page(
            State(store()),
            Path("overall".to_string()),
            query(&[("State", "CA")]),
        )
        .await
        .unwrap();

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "ready");
        assert_eq!(json["rows"]["rows"].as_array().unwrap().len(), 2);
        assert_eq!(json["centroid"]["longitude"], -120.5);
        assert_eq!(json["centroid"]["latitude"], 37.5);
    }

    #[tokio::test]
    async fn test_view_page_without_coordinates() {
        let Json(resp) = view_page(
            State(store()),
            Path("overall".to_string()),
            query(&[("State", "TX")]),
        )
        .await
        .unwrap();

        assert_eq!(resp.status, "empty");
        assert!(resp.view.centroid.is_none());
    }

    #[tokio::test]
    async fn test_unknown_page_is_404() {
        let err = view_page(State(store()), Path("nope".to_string()), query(&[]))
            .await
            .unwrap_err();

        assert_eq!(err.0, StatusCode::NOT_FOUND);
        assert_eq!(err.1 .0["status"], "error");
    }

    #[tokio::test]
    async fn test_bad_order_is_400() {
        let err = view_page(
            State(store()),
            Path("overall".to_string()),
            query(&[("order", "random")]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_counts_unknown_column_is_400() {
        let err = counts(
            State(store()),
            Path("classifier".to_string()),
            query(&[("column", "County")]),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_counts_first_seen() {
        let Json(resp) = counts(
            State(store()),
            Path("overall".to_string()),
            query(&[("column", "State"), ("order", "first-seen")]),
        )
        .await
        .unwrap();

        let categories: Vec<_> = resp
            .counts
            .iter()
            .map(|c| c.category.as_deref().unwrap_or(""))
            .collect();
        assert_eq!(categories, vec!["CA", "NY", "TX"]);
    }

    #[tokio::test]
    async fn test_selectors_and_pages() {
        let Json(sel) = page_selectors(State(store()), Path("classifier".to_string()))
            .await
            .unwrap();
        assert_eq!(sel.selectors, vec!["Urban Core"]);
        assert_eq!(sel.selector_param, "Cluster_Names");

        let Json(list) = list_pages().await;
        assert_eq!(list.pages.len(), 2);
    }

    #[tokio::test]
    async fn test_health_reports_sources() {
        let Json(resp) = health(State(store())).await;
        assert_eq!(resp.status, "ok");
        assert_eq!(resp.sources[0].rows_read, 4);
        assert_eq!(resp.sources[1].rows_read, 1);
    }

    #[test]
    fn test_router_builds() {
        let _app = router(store());
    }
}
