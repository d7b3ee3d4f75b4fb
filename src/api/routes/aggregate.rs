//! Aggregate Routes
//!
//! Recompute the dashboard tables for a device/location filter.
//!
//! - GET /api/v1/aggregate?device=..&location=.. - Filter from the query string
//!   (keys may repeat, values may be comma separated)
//! - POST /api/v1/aggregate - Filter from a JSON body

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;
use std::time::Instant;

use crate::aggregate::{aggregate, AggregateTables};
use crate::api::dto::{AggregateMeta, AggregateResponse, FilterParams, QueryPairs};
use crate::api::state::AppState;
use crate::dataset::FilterSpec;

/// GET /api/v1/aggregate
pub async fn aggregate_query(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<QueryPairs>,
) -> Json<AggregateResponse> {
    Json(run(&state, FilterParams::from_pairs(&pairs).to_filter()))
}

/// POST /api/v1/aggregate
///
/// Body is a FilterSpec, e.g. `{"devices": ["Mobile"], "locations": null}`.
pub async fn aggregate_body(
    State(state): State<Arc<AppState>>,
    Json(filter): Json<FilterSpec>,
) -> Json<AggregateResponse> {
    Json(run(&state, filter))
}

fn run(state: &AppState, filter: FilterSpec) -> AggregateResponse {
    let (tables, elapsed_us) = timed_aggregate(state, &filter);

    let meta = AggregateMeta {
        matched_records: tables.matched_records,
        total_records: state.dataset.len(),
        total_visits: tables.grand_total(),
        execution_time_us: elapsed_us,
        filter,
    };

    AggregateResponse::new(&tables, meta)
}

/// Aggregate and report how long it took, in microseconds
pub(crate) fn timed_aggregate(state: &AppState, filter: &FilterSpec) -> (AggregateTables, u64) {
    let start = Instant::now();
    let tables = aggregate(&state.dataset, filter);
    let elapsed_us = start.elapsed().as_micros() as u64;

    tracing::debug!(
        devices = ?filter.devices,
        locations = ?filter.locations,
        matched = tables.matched_records,
        elapsed_us,
        "Aggregated traffic"
    );

    if tables.is_empty() && !filter.is_unrestricted() {
        tracing::info!(
            devices = ?filter.devices,
            locations = ?filter.locations,
            "Filter matched no records"
        );
    }

    (tables, elapsed_us)
}
