use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::challenges::pipeline::{submit_challenge, SubmissionResult};
use crate::errors::AppError;
use crate::models::challenge::{Challenge, UserChallenge};
use crate::state::{AppState, UserIdQuery};
use crate::store::user_not_found;

#[derive(Debug, Deserialize)]
pub struct SubmitChallengeRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub proof: Option<String>,
}

/// POST /api/v1/challenges/:id/submit
pub async fn handle_submit_challenge(
    State(state): State<AppState>,
    Path(challenge_id): Path<Uuid>,
    Json(req): Json<SubmitChallengeRequest>,
) -> Result<Json<SubmissionResult>, AppError> {
    let result = submit_challenge(
        state.store.as_ref(),
        req.user_id,
        challenge_id,
        req.proof.as_deref(),
        Utc::now(),
    )
    .await?;
    Ok(Json(result))
}

/// GET /api/v1/challenges
pub async fn handle_list_challenges(
    State(state): State<AppState>,
) -> Result<Json<Vec<Challenge>>, AppError> {
    Ok(Json(state.store.list_challenges().await?))
}

/// GET /api/v1/challenges/history
pub async fn handle_challenge_history(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<UserChallenge>>, AppError> {
    if state.store.find_user(params.user_id).await?.is_none() {
        return Err(user_not_found(params.user_id));
    }
    Ok(Json(state.store.user_challenges(params.user_id).await?))
}
