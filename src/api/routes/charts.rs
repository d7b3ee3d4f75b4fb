//! Chart Routes
//!
//! - GET /api/v1/charts?device=..&location=.. - The three dashboard charts

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::aggregate::build_charts;
use crate::api::dto::{ChartsResponse, FilterParams, QueryPairs};
use crate::api::routes::aggregate::timed_aggregate;
use crate::api::state::AppState;

/// GET /api/v1/charts
///
/// Trend line, top-pages bar and device donut for the given filter.
pub async fn get_charts(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<QueryPairs>,
) -> Json<ChartsResponse> {
    let (tables, _) = timed_aggregate(&state, &FilterParams::from_pairs(&pairs).to_filter());

    Json(ChartsResponse {
        title: state.config.title.clone(),
        charts: build_charts(&tables),
    })
}
