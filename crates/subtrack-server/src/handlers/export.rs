//! Export and backup import handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        rejection::{QueryRejection, StringRejection},
        Query, State,
    },
    http::{header, Response, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{AppError, AppState};
use subtrack_core::export::{ExportFormat, ImportStats, SubscriptionBackup};

/// Query parameters for subscription export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Output format (default: csv)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// GET /api/export/subscriptions - Download all subscriptions as CSV or JSON
pub async fn export_subscriptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ExportQuery>, QueryRejection>,
) -> Result<Response<Body>, AppError> {
    let Query(params) = query?;
    let format: ExportFormat = params
        .format
        .parse()
        .map_err(|e: String| AppError::validation(&e))?;

    let body = match format {
        ExportFormat::Csv => {
            let csv = state.db.export_subscriptions_csv()?;
            info!(
                "Exported {} subscriptions to CSV",
                csv.lines().count().saturating_sub(1)
            );
            csv
        }
        ExportFormat::Json => {
            let backup = state.db.export_backup()?;
            info!(
                "Exported {} subscriptions to JSON",
                backup.metadata.total_records
            );
            backup.to_json_pretty()?
        }
    };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, format.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "attachment; filename=\"subtrack-{}.{}\"",
                chrono::Utc::now().format("%Y-%m-%d"),
                format.as_str()
            ),
        )
        .body(Body::from(body))
        .map_err(|e| AppError::internal(&e.to_string()))
}

/// Query parameters for backup import
#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    /// Clear existing subscriptions before import
    #[serde(default)]
    pub clear: bool,
}

/// Response for backup import
#[derive(Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub stats: ImportStats,
}

/// POST /api/import/subscriptions - Restore a JSON backup
pub async fn import_subscriptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ImportQuery>, QueryRejection>,
    body: Result<String, StringRejection>,
) -> Result<Json<ImportResponse>, AppError> {
    let Query(params) = query?;
    let body = body?;
    let backup = SubscriptionBackup::from_json(&body)?;

    info!(
        "Importing backup: version={}, records={}, clear={}",
        backup.metadata.version, backup.metadata.total_records, params.clear
    );

    let stats = state.db.import_backup(&backup, params.clear)?;

    Ok(Json(ImportResponse {
        success: true,
        stats,
    }))
}
