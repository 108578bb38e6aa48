//! Subscription CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{resolve_today, AppError, AppState};
use subtrack_core::models::{NewSubscription, Subscription, SubscriptionUpdate};

/// Query params for listing subscriptions
#[derive(Debug, Default, Deserialize)]
pub struct ListSubscriptionsQuery {
    /// Case-insensitive match on name or category
    pub q: Option<String>,
    /// Exact category label
    pub category: Option<String>,
}

/// GET /api/subscriptions - List subscriptions, soonest due first
pub async fn list_subscriptions(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListSubscriptionsQuery>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, AppError> {
    let Query(query) = query?;

    let mut subscriptions = match query.q.as_deref() {
        Some(term) => state.db.search_subscriptions(term)?,
        None => state.db.list_subscriptions()?,
    };
    if let Some(category) = query.category.as_deref() {
        subscriptions.retain(|s| s.category == category);
    }

    Ok(Json(subscriptions))
}

/// POST /api/subscriptions - Create a subscription
pub async fn create_subscription(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewSubscription>, JsonRejection>,
) -> Result<(StatusCode, Json<Subscription>), AppError> {
    let Json(new) = body?;
    let created = state.db.create_subscription(&new)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/subscriptions/:id - Fetch one subscription
pub async fn get_subscription(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Subscription>, AppError> {
    let Path(id) = id?;
    Ok(Json(state.db.get_subscription(id)?))
}

/// PUT/PATCH /api/subscriptions/:id - Partial update
pub async fn update_subscription(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<SubscriptionUpdate>, JsonRejection>,
) -> Result<Json<Subscription>, AppError> {
    let Path(id) = id?;
    let Json(update) = body?;
    Ok(Json(state.db.update_subscription(id, &update)?))
}

/// Response for deleting a subscription
#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

/// DELETE /api/subscriptions/:id - Delete a subscription
pub async fn delete_subscription(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let Path(id) = id?;
    state.db.delete_subscription(id)?;
    Ok(Json(DeleteResponse {
        message: "Subscription deleted".to_string(),
        id,
    }))
}

/// Query params for date-dependent endpoints
#[derive(Debug, Default, Deserialize)]
pub struct AsOfQuery {
    /// Evaluate against this date instead of the server's today
    pub as_of: Option<NaiveDate>,
}

/// POST /api/subscriptions/:id/paid - Advance the due date by one cycle
pub async fn mark_subscription_paid(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<AsOfQuery>, QueryRejection>,
) -> Result<Json<Subscription>, AppError> {
    let Path(id) = id?;
    let Query(query) = query?;

    let updated = state
        .db
        .mark_subscription_paid(id, resolve_today(query.as_of))?;
    info!("Subscription {} next due {}", id, updated.next_due);

    Ok(Json(updated))
}
