//! Filter Routes
//!
//! - GET /api/v1/filters - Dropdown options for device and location

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::FilterOptionsResponse;
use crate::api::state::AppState;

/// GET /api/v1/filters
///
/// Distinct device and location values, in dataset order.
pub async fn list_filters(State(state): State<Arc<AppState>>) -> Json<FilterOptionsResponse> {
    Json(FilterOptionsResponse {
        title: state.config.title.clone(),
        devices: state.dataset.devices(),
        locations: state.dataset.locations(),
    })
}
