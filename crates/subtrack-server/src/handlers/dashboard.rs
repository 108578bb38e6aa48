//! Dashboard handler

use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{resolve_today, AppError, AppState};
use subtrack_core::accounting;
use subtrack_core::insights::{self, Insight};
use subtrack_core::models::{SpendSummary, Subscription};

use super::due::window_days;

/// Query params for the dashboard
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub days: Option<i64>,
    pub as_of: Option<NaiveDate>,
}

/// Everything the dashboard's landing view shows
#[derive(Serialize)]
pub struct DashboardResponse {
    pub date: NaiveDate,
    pub summary: SpendSummary,
    pub due_today: Vec<Subscription>,
    pub due_soon: Vec<Subscription>,
    pub insights: Vec<Insight>,
}

/// GET /api/dashboard - Spend summary, due lists and insights
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardResponse>, AppError> {
    let Query(query) = query?;
    let days = window_days(query.days, state.config.due_soon_days)?;
    let today = resolve_today(query.as_of);

    let subscriptions = state.db.list_subscriptions()?;

    Ok(Json(DashboardResponse {
        date: today,
        summary: accounting::spend_summary(&subscriptions, today, days),
        due_today: accounting::due_today(&subscriptions, today)
            .into_iter()
            .cloned()
            .collect(),
        due_soon: accounting::due_within(&subscriptions, today, days)
            .into_iter()
            .cloned()
            .collect(),
        insights: insights::dashboard_insights(&subscriptions, today),
    }))
}
