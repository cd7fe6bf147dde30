use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::badges::evaluator::evaluate;
use crate::errors::AppError;
use crate::models::badge::{Badge, EarnedBadge};
use crate::state::{AppState, UserIdQuery};

/// GET /api/v1/badges
/// Runs an evaluation pass first, so the list includes anything just earned.
pub async fn handle_user_badges(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<EarnedBadge>>, AppError> {
    let store = state.store.as_ref();
    evaluate(store, params.user_id, Utc::now()).await?;
    Ok(Json(store.earned_badges(params.user_id).await?))
}

/// GET /api/v1/badges/catalog
pub async fn handle_badge_catalog(
    State(state): State<AppState>,
) -> Result<Json<Vec<Badge>>, AppError> {
    Ok(Json(state.store.badge_catalog().await?))
}
