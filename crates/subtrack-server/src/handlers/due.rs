//! Due-date handlers

use std::sync::Arc;

use axum::extract::{rejection::QueryRejection, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{resolve_today, AppError, AppState};
use subtrack_core::accounting;
use subtrack_core::models::Subscription;

use super::AsOfQuery;

/// Response for subscriptions due today
#[derive(Serialize)]
pub struct DueTodayResponse {
    pub date: NaiveDate,
    pub count: usize,
    pub subscriptions: Vec<Subscription>,
}

/// GET /api/subscriptions/due/today - Subscriptions due on the current date
pub async fn due_today(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<DueTodayResponse>, AppError> {
    let Query(query) = query?;
    let today = resolve_today(query.as_of);

    let subscriptions = state.db.subscriptions_due_on(today)?;

    Ok(Json(DueTodayResponse {
        date: today,
        count: subscriptions.len(),
        subscriptions,
    }))
}

/// Query params for the due-soon window
#[derive(Debug, Deserialize)]
pub struct DueSoonQuery {
    /// Window length in days (default from server config)
    pub days: Option<i64>,
    pub as_of: Option<NaiveDate>,
}

/// Response for subscriptions due soon
#[derive(Serialize)]
pub struct DueSoonResponse {
    pub date: NaiveDate,
    pub days: u32,
    pub count: usize,
    pub subscriptions: Vec<Subscription>,
}

/// Validate a requested window length
pub(crate) fn window_days(requested: Option<i64>, default: u32) -> Result<u32, AppError> {
    match requested {
        None => Ok(default),
        Some(days) if days < 0 => Err(AppError::validation("days must be non-negative")),
        Some(days) => u32::try_from(days).map_err(|_| AppError::validation("days is too large")),
    }
}

/// GET /api/subscriptions/due/soon - Subscriptions due after today within N days
pub async fn due_soon(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DueSoonQuery>, QueryRejection>,
) -> Result<Json<DueSoonResponse>, AppError> {
    let Query(query) = query?;
    let days = window_days(query.days, state.config.due_soon_days)?;
    let today = resolve_today(query.as_of);

    let subscriptions = state
        .db
        .subscriptions_due_between(today, accounting::window_end(today, days))?;

    Ok(Json(DueSoonResponse {
        date: today,
        days,
        count: subscriptions.len(),
        subscriptions,
    }))
}
