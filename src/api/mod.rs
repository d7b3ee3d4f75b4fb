//! Traffic Trends REST API
//!
//! HTTP API layer, built with Axum. Every handler shares the dataset
//! read-only and recomputes aggregates per request.
//!
//! # Endpoints
//!
//! ## Dashboard
//! - `GET /api/v1/filters` - Title and dropdown options
//! - `GET /api/v1/aggregate` - Aggregate tables for a query-string filter
//! - `POST /api/v1/aggregate` - Aggregate tables for a JSON filter
//! - `GET /api/v1/charts` - Chart payloads for a query-string filter
//!
//! ## Export
//! - `GET /api/v1/export` - Filtered records as csv, json or ndjson
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use traffic_trends::api::{serve, AppState};
//! use traffic_trends::config::ApiConfig;
//! use traffic_trends::dataset::{DataSource, SyntheticSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dataset = SyntheticSource::default().load()?;
//!     let config = ApiConfig::default();
//!
//!     serve(AppState::new(dataset, config.clone()), &config).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/filters", get(routes::filters::list_filters))
        .route(
            "/aggregate",
            get(routes::aggregate::aggregate_query).post(routes::aggregate::aggregate_body),
        )
        .route("/charts", get(routes::charts::get_charts))
        .route("/export", get(routes::export::export_data));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Traffic Trends API listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Traffic Trends API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{AggregateResponse, FilterOptionsResponse, HealthResponse};
    use crate::dataset::{DataSource, Dataset, Record, SyntheticSource};
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use chrono::NaiveDate;
    use tower::util::ServiceExt;

    fn example_dataset() -> Dataset {
        let day = |d| NaiveDate::from_ymd_opt(2025, 7, d).unwrap();
        Dataset::new(vec![
            Record::new(day(1), "Home", 10, "Desktop", "USA"),
            Record::new(day(1), "Products", 5, "Mobile", "USA"),
            Record::new(day(2), "Home", 20, "Desktop", "UK"),
        ])
        .unwrap()
    }

    fn create_test_app() -> Router {
        build_router(AppState::new(example_dataset(), ApiConfig::default()))
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let response = get(create_test_app(), "/health/live").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let response = get(create_test_app(), "/health/ready").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let response = get(create_test_app(), "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let health: HealthResponse = json_body(response).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.records, 3);
        assert_eq!(health.source, "synthetic");
    }

    #[tokio::test]
    async fn test_filter_options() {
        let response = get(create_test_app(), "/api/v1/filters").await;
        assert_eq!(response.status(), StatusCode::OK);

        let options: FilterOptionsResponse = json_body(response).await;
        assert_eq!(options.title, "Website Traffic Trend Analyzer");
        assert_eq!(options.devices, vec!["Desktop", "Mobile"]);
        assert_eq!(options.locations, vec!["USA", "UK"]);
    }

    #[tokio::test]
    async fn test_aggregate_query_string() {
        let response = get(create_test_app(), "/api/v1/aggregate?device=Desktop").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: AggregateResponse = json_body(response).await;
        let trend: Vec<_> = body.trend.iter().map(|p| (p.date.as_str(), p.visits)).collect();
        assert_eq!(trend, vec![("2025-07-01", 10), ("2025-07-02", 20)]);
        assert_eq!(body.top_pages.len(), 1);
        assert_eq!(body.top_pages[0].label, "Home");
        assert_eq!(body.top_pages[0].visits, 30);
        assert_eq!(body.device_share[0].label, "Desktop");
        assert_eq!(body.meta.matched_records, 2);
        assert_eq!(body.meta.total_records, 3);
        assert_eq!(body.meta.total_visits, 30);
    }

    #[tokio::test]
    async fn test_aggregate_repeated_query_keys() {
        let response = get(
            create_test_app(),
            "/api/v1/aggregate?device=Desktop&device=Mobile&location=USA",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: AggregateResponse = json_body(response).await;
        assert_eq!(body.meta.filter.devices, vec!["Desktop", "Mobile"]);
        assert_eq!(body.meta.filter.locations, vec!["USA"]);
        assert_eq!(body.meta.matched_records, 2);
        assert_eq!(body.meta.total_visits, 15);
    }

    #[tokio::test]
    async fn test_aggregate_unfiltered() {
        let response = get(create_test_app(), "/api/v1/aggregate").await;
        let body: AggregateResponse = json_body(response).await;
        assert_eq!(body.meta.total_visits, 35);
        assert_eq!(body.device_share.len(), 2);
    }

    #[tokio::test]
    async fn test_aggregate_unknown_location_is_empty() {
        let response = get(create_test_app(), "/api/v1/aggregate?location=Mars").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: AggregateResponse = json_body(response).await;
        assert!(body.trend.is_empty());
        assert!(body.top_pages.is_empty());
        assert!(body.device_share.is_empty());
        assert_eq!(body.meta.total_visits, 0);
    }

    #[tokio::test]
    async fn test_aggregate_post_body() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/aggregate")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"devices": ["Mobile"], "locations": null}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: AggregateResponse = json_body(response).await;
        assert_eq!(body.meta.total_visits, 5);
        assert_eq!(body.top_pages[0].label, "Products");
        assert_eq!(body.meta.filter.devices, vec!["Mobile"]);
    }

    #[tokio::test]
    async fn test_aggregate_invalid_json() {
        let response = create_test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/aggregate")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_charts() {
        let response = get(create_test_app(), "/api/v1/charts?location=USA").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = json_body(response).await;
        let charts = body["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 3);
        assert_eq!(charts[0]["id"], "traffic_trend");
        assert_eq!(charts[0]["values"], serde_json::json!([15]));
        assert_eq!(charts[1]["labels"], serde_json::json!(["Home", "Products"]));
        assert_eq!(charts[2]["kind"], "donut");
    }

    #[tokio::test]
    async fn test_export_csv() {
        let response = get(create_test_app(), "/api/v1/export?format=csv&device=Mobile").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/csv");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            text,
            "date,page,visits,device,location\n2025-07-01,Products,5,Mobile,USA\n"
        );
    }

    #[tokio::test]
    async fn test_export_repeated_query_keys() {
        let response = get(
            create_test_app(),
            "/api/v1/export?device=Mobile&device=Desktop&location=UK",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(
            text,
            "date,page,visits,device,location\n2025-07-02,Home,20,Desktop,UK\n"
        );
    }

    #[tokio::test]
    async fn test_export_disabled() {
        let config = ApiConfig {
            enable_export: false,
            ..ApiConfig::default()
        };
        let app = build_router(AppState::new(example_dataset(), config));

        let response = get(app, "/api/v1/export").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_synthetic_dataset_serves() {
        let dataset = SyntheticSource::default().load().unwrap();
        let app = build_router(AppState::new(dataset, ApiConfig::default()));

        let response = get(app, "/api/v1/aggregate?device=Mobile,Tablet&location=USA").await;
        let body: AggregateResponse = json_body(response).await;
        // Mobile rows are always USA in the fixture, Tablet rows never are
        assert_eq!(body.meta.matched_records, 30);
        assert_eq!(body.device_share.len(), 1);
    }
}
