//! Export Routes
//!
//! Download the records behind the current filter.
//!
//! - GET /api/v1/export?format=csv|json|ndjson&device=..&location=..

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{ExportParams, QueryPairs};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::dataset::{write_csv, Record};

/// Supported export encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
    Ndjson,
}

impl ExportFormat {
    /// Unknown formats fall back to ndjson
    fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "csv" => ExportFormat::Csv,
            "json" => ExportFormat::Json,
            _ => ExportFormat::Ndjson,
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Ndjson => "application/x-ndjson",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Ndjson => "ndjson",
        }
    }
}

/// GET /api/v1/export
pub async fn export_data(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<QueryPairs>,
) -> ApiResult<Response> {
    if !state.config.enable_export {
        return Err(ApiError::Validation(
            "Export feature is disabled".to_string(),
        ));
    }

    let params = ExportParams::from_pairs(&pairs);
    let filter = params.filter.to_filter();
    let records: Vec<&Record> = state.dataset.select(&filter).collect();
    let format = ExportFormat::parse(&params.format);

    let body = match format {
        ExportFormat::Csv => format_csv(&records)?,
        ExportFormat::Json => format_json(&records)?,
        ExportFormat::Ndjson => format_ndjson(&records)?,
    };

    tracing::info!(
        format = format.extension(),
        records = records.len(),
        "Exported traffic records"
    );

    let filename = format!(
        "traffic_export_{}.{}",
        Utc::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        Body::from(body),
    )
        .into_response())
}

/// Format as CSV
fn format_csv(records: &[&Record]) -> ApiResult<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(&mut buf, records.iter().copied())?;
    Ok(buf)
}

/// Format as JSON array
fn format_json(records: &[&Record]) -> ApiResult<Vec<u8>> {
    serde_json::to_vec_pretty(records)
        .map_err(|e| ApiError::Internal(format!("JSON encoding failed: {}", e)))
}

/// Format as newline-delimited JSON
fn format_ndjson(records: &[&Record]) -> ApiResult<Vec<u8>> {
    let mut buf = Vec::new();
    for record in records {
        serde_json::to_writer(&mut buf, record)
            .map_err(|e| ApiError::Internal(format!("JSON encoding failed: {}", e)))?;
        buf.push(b'\n');
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> Record {
        Record::new(
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            "Home",
            10,
            "Desktop",
            "USA",
        )
    }

    #[test]
    fn test_export_format_parse() {
        assert_eq!(ExportFormat::parse("CSV"), ExportFormat::Csv);
        assert_eq!(ExportFormat::parse("json"), ExportFormat::Json);
        assert_eq!(ExportFormat::parse("xml"), ExportFormat::Ndjson);
    }

    #[test]
    fn test_format_csv() {
        let r = record();
        let out = String::from_utf8(format_csv(&[&r]).unwrap()).unwrap();
        assert_eq!(
            out,
            "date,page,visits,device,location\n2025-07-01,Home,10,Desktop,USA\n"
        );
    }

    #[test]
    fn test_format_ndjson() {
        let r = record();
        let out = String::from_utf8(format_ndjson(&[&r, &r]).unwrap()).unwrap();
        assert_eq!(out.lines().count(), 2);
        let first: Record = serde_json::from_str(out.lines().next().unwrap()).unwrap();
        assert_eq!(first, r);
    }
}
