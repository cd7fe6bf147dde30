use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ledger::service::{leaderboard, user_profile, LeaderboardEntry, UserProfile};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub country: Option<String>,
}

/// GET /api/v1/users/:id
pub async fn handle_user_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(user_profile(state.store.as_ref(), user_id).await?))
}

/// GET /api/v1/leaderboard
pub async fn handle_leaderboard(
    State(state): State<AppState>,
    Query(params): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, AppError> {
    let entries = leaderboard(
        state.store.as_ref(),
        params.country.as_deref(),
        state.config.leaderboard_limit,
    )
    .await?;
    Ok(Json(entries))
}
