//! Web server for the earthquake dashboard.
//!
//! Serves three pages plus a not-found view:
//! - `/` landing page
//! - `/map` recent earthquakes on a Leaflet map
//! - `/visualize` seismic-pattern charts and the largest-events table
//!
//! Each page renders a loading shell; HTMX then requests the page's data
//! fragment once. Fragments fetch from USGS on every request and keep
//! nothing between requests.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::aggregate::{Dashboard, DisplayZone, SortOrder};
use crate::client::{Endpoint, FeedSource};
use crate::errors::QuakeviewError;
use crate::models::EventRecord;
use crate::pages;
use crate::state::LoadState;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Zone used for chart times and table dates
    pub zone: DisplayZone,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            zone: DisplayZone::Local,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Where feeds come from
    source: Arc<dyn FeedSource>,
    /// Zone used for chart times and table dates
    zone: DisplayZone,
}

impl AppState {
    pub fn new(source: Arc<dyn FeedSource>, zone: DisplayZone) -> Self {
        Self { source, zone }
    }
}

/// Query string accepted by the dashboard routes.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    order: Option<SortOrder>,
}

impl OrderQuery {
    fn order(&self) -> SortOrder {
        self.order.unwrap_or_default()
    }
}

impl IntoResponse for QuakeviewError {
    fn into_response(self) -> Response {
        warn!("request failed: {self}");
        let status = StatusCode::BAD_GATEWAY;
        let body = serde_json::json!({
            "error": self.user_message(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/map", get(map_handler))
        .route("/map/data", get(map_data_handler))
        .route("/visualize", get(visualize_handler))
        .route("/visualize/data", get(visualize_data_handler))
        .route("/api/events", get(api_events_handler))
        .route("/api/dashboard", get(api_dashboard_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig, source: Arc<dyn FeedSource>) -> anyhow::Result<()> {
    let app = create_router(AppState::new(source, config.zone));

    let addr = format!("{}:{}", config.host, config.port);
    info!("🌍 Earthquake Visualizer starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

/// Fetch one endpoint on the blocking pool and flatten it to records.
async fn fetch_records(
    source: Arc<dyn FeedSource>,
    endpoint: Endpoint,
) -> Result<Vec<EventRecord>, QuakeviewError> {
    let records = tokio::task::spawn_blocking(move || {
        source.fetch(endpoint).map(|feed| feed.records())
    })
    .await??;
    debug!(feed = endpoint.as_str(), "loaded {} events", records.len());
    Ok(records)
}

/// Load state of the map page.
async fn load_map(state: &AppState) -> LoadState<Vec<EventRecord>> {
    let loading = LoadState::Idle.begin();
    let outcome = fetch_records(state.source.clone(), Endpoint::AllDay).await;
    loading.resolve(outcome, Vec::is_empty)
}

/// Load state of the dashboard page.
///
/// Both feeds must succeed. Only an empty recent feed counts as no data;
/// an empty historical query just leaves the table empty.
async fn load_dashboard(state: &AppState, order: SortOrder) -> LoadState<Dashboard> {
    let loading = LoadState::Idle.begin();
    let outcome = async {
        let recent = fetch_records(state.source.clone(), Endpoint::Mag25Day).await?;
        let historical = fetch_records(state.source.clone(), Endpoint::Largest).await?;
        Ok::<_, QuakeviewError>((recent, historical))
    }
    .await;

    loading
        .resolve(outcome, |(recent, _)| recent.is_empty())
        .map(|(recent, historical)| Dashboard::build(&recent, &historical, order, &state.zone))
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn index_handler() -> Html<String> {
    Html(pages::landing_page())
}

async fn map_handler() -> Html<String> {
    Html(pages::map_shell())
}

/// Map fragment - fetches the day feed.
async fn map_data_handler(State(state): State<AppState>) -> Html<String> {
    Html(pages::map_fragment(&load_map(&state).await))
}

async fn visualize_handler(Query(query): Query<OrderQuery>) -> Html<String> {
    Html(pages::visualize_shell(query.order()))
}

/// Dashboard fragment - fetches the recent feed and the historical query.
async fn visualize_data_handler(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Html<String> {
    let order = query.order();
    Html(pages::dashboard_fragment(&load_dashboard(&state, order).await, order))
}

/// Day-feed events as JSON.
async fn api_events_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventRecord>>, QuakeviewError> {
    let records = fetch_records(state.source.clone(), Endpoint::AllDay).await?;
    Ok(Json(records))
}

/// Dashboard aggregates as JSON.
async fn api_dashboard_handler(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Dashboard>, QuakeviewError> {
    let recent = fetch_records(state.source.clone(), Endpoint::Mag25Day).await?;
    let historical = fetch_records(state.source.clone(), Endpoint::Largest).await?;
    Ok(Json(Dashboard::build(
        &recent,
        &historical,
        query.order(),
        &state.zone,
    )))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html(pages::not_found_page()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::Request;
    use chrono::FixedOffset;
    use tower::ServiceExt;

    use crate::errors::FETCH_FAILED_MESSAGE;
    use crate::models::FeatureCollection;
    use crate::models::tests::SAMPLE_FEED;

    const EMPTY_FEED: &str = r#"{"type": "FeatureCollection", "features": []}"#;

    /// Canned responses per endpoint. `None` answers with HTTP 500.
    struct StubSource {
        recent: Option<&'static str>,
        largest: Option<&'static str>,
    }

    impl StubSource {
        fn all(body: Option<&'static str>) -> Self {
            Self {
                recent: body,
                largest: body,
            }
        }
    }

    impl FeedSource for StubSource {
        fn fetch(&self, endpoint: Endpoint) -> Result<FeatureCollection, QuakeviewError> {
            let body = match endpoint {
                Endpoint::AllDay | Endpoint::Mag25Day => self.recent,
                Endpoint::Largest => self.largest,
            };
            match body {
                Some(json) => Ok(serde_json::from_str(json)?),
                None => Err(QuakeviewError::Api {
                    status: 500,
                    message: "Internal Server Error".into(),
                }),
            }
        }
    }

    fn router(source: StubSource) -> Router {
        let zone = DisplayZone::Fixed(FixedOffset::east_opt(0).unwrap());
        create_router(AppState::new(Arc::new(source), zone))
    }

    async fn get_text(router: Router, uri: &str) -> (StatusCode, String) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_landing_page() {
        let (status, body) = get_text(router(StubSource::all(None)), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Track Earthquakes in Real Time"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_page() {
        let (status, body) = get_text(router(StubSource::all(None)), "/no/such/page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Oops! Page Not Found"));
    }

    #[tokio::test]
    async fn test_shells_do_not_fetch() {
        // A failing source must not affect the shells.
        let (status, body) = get_text(router(StubSource::all(None)), "/map").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Loading earthquake data..."));

        let (status, body) = get_text(router(StubSource::all(None)), "/visualize?order=asc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("/visualize/data?order=asc"));
    }

    #[tokio::test]
    async fn test_map_data_ready() {
        let (status, body) = get_text(router(StubSource::all(Some(SAMPLE_FEED))), "/map/data").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("L.marker"));
        assert!(body.contains("10km SE of Springfield, IL"));
    }

    #[tokio::test]
    async fn test_map_data_empty_is_not_error() {
        let (_, body) = get_text(router(StubSource::all(Some(EMPTY_FEED))), "/map/data").await;
        assert!(body.contains("No earthquake data available right now."));
        assert!(!body.contains(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_map_data_server_error_is_generic_failure() {
        let (_, body) = get_text(router(StubSource::all(None)), "/map/data").await;
        assert!(body.contains(FETCH_FAILED_MESSAGE));
        assert!(!body.contains("No earthquake data available"));
    }

    #[tokio::test]
    async fn test_visualize_data_ready() {
        let (status, body) = get_text(
            router(StubSource::all(Some(SAMPLE_FEED))),
            "/visualize/data",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("chart-frequency"));
        assert!(body.contains("20 Largest Earthquakes"));
    }

    #[tokio::test]
    async fn test_visualize_data_empty_recent() {
        let source = StubSource {
            recent: Some(EMPTY_FEED),
            largest: Some(SAMPLE_FEED),
        };
        let (_, body) = get_text(router(source), "/visualize/data").await;
        assert!(body.contains("No earthquake data available."));
    }

    #[tokio::test]
    async fn test_visualize_data_historical_failure_fails_page() {
        let source = StubSource {
            recent: Some(SAMPLE_FEED),
            largest: None,
        };
        let (_, body) = get_text(router(source), "/visualize/data").await;
        assert!(body.contains(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_api_dashboard_json() {
        let (status, body) = get_text(
            router(StubSource::all(Some(SAMPLE_FEED))),
            "/api/dashboard?order=asc",
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let regions: Vec<&str> = value["count_by_region"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["region"].as_str().unwrap())
            .collect();
        assert_eq!(regions, vec!["IL", "NV", "Unknown"]);
        assert_eq!(value["largest"][0]["magnitude"], 0.0);
    }

    #[tokio::test]
    async fn test_api_events_failure_is_bad_gateway() {
        let (status, body) = get_text(router(StubSource::all(None)), "/api/events").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains(FETCH_FAILED_MESSAGE));
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_text(router(StubSource::all(None)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }
}
