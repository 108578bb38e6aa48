//! Insight handlers
//!
//! Insights are templated sentences computed from stored amounts.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Serialize;

use crate::{resolve_today, AppError, AppState};
use subtrack_core::insights::{self, Insight};

use super::AsOfQuery;

/// GET /api/insights - Dashboard insight sentences
pub async fn list_insights(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<Vec<Insight>>, AppError> {
    let Query(query) = query?;
    let subscriptions = state.db.list_subscriptions()?;
    Ok(Json(insights::dashboard_insights(
        &subscriptions,
        resolve_today(query.as_of),
    )))
}

/// Response for a single subscription insight
#[derive(Serialize)]
pub struct SubscriptionInsightResponse {
    pub subscription_id: i64,
    pub insight: String,
}

/// GET /api/insights/:id - Category spend sentence for one subscription
pub async fn get_subscription_insight(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<SubscriptionInsightResponse>, AppError> {
    let Path(id) = id?;
    let sub = state.db.get_subscription(id)?;
    let same_category = state.db.list_subscriptions_by_category(&sub.category)?;

    Ok(Json(SubscriptionInsightResponse {
        subscription_id: id,
        insight: insights::insight_for(&sub, &same_category),
    }))
}
