use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::quiz::service::{list_quizzes_for_user, submit_quiz, QuizListing, QuizSubmissionResult};
use crate::state::{AppState, UserIdQuery};

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub user_id: Uuid,
    /// Selected option index per question, in question order.
    #[serde(default)]
    pub answers: Vec<i64>,
}

/// POST /api/v1/quizzes/:id/submit
pub async fn handle_submit_quiz(
    State(state): State<AppState>,
    Path(quiz_id): Path<Uuid>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<Json<QuizSubmissionResult>, AppError> {
    let result = submit_quiz(
        state.store.as_ref(),
        req.user_id,
        quiz_id,
        &req.answers,
        Utc::now(),
    )
    .await?;
    Ok(Json(result))
}

/// GET /api/v1/quizzes
pub async fn handle_list_quizzes(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<QuizListing>>, AppError> {
    let listing =
        list_quizzes_for_user(state.store.as_ref(), params.user_id, Utc::now(), &state.gate)
            .await?;
    Ok(Json(listing))
}
