//! Spend summary handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{AppError, AppState};
use subtrack_core::accounting;
use subtrack_core::models::CategoryDetail;

/// Monthly spend per category
#[derive(Serialize)]
pub struct MonthlySummaryResponse {
    pub by_category: BTreeMap<String, Decimal>,
    pub total_monthly: Decimal,
    pub total_annual: Decimal,
}

/// GET /api/subscriptions/summary/monthly - Category breakdown with totals
pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonthlySummaryResponse>, AppError> {
    let subscriptions = state.db.list_subscriptions()?;

    let by_category = accounting::category_breakdown(&subscriptions);
    let total_monthly = by_category.values().sum::<Decimal>().normalize();

    Ok(Json(MonthlySummaryResponse {
        total_annual: (total_monthly * Decimal::from(12)).normalize(),
        total_monthly,
        by_category,
    }))
}

/// GET /api/subscriptions/summary/categories - Per-category analytics rows
pub async fn category_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CategoryDetail>>, AppError> {
    let subscriptions = state.db.list_subscriptions()?;
    Ok(Json(accounting::category_details(&subscriptions)))
}
