use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::actions::service::record_action;
use crate::badges::evaluator::EvaluationOutcome;
use crate::errors::AppError;
use crate::models::action::NewAction;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecordActionRequest {
    pub user_id: Uuid,
    pub action_type: String,
    #[serde(default)]
    pub action_data: Value,
}

/// POST /api/v1/actions
pub async fn handle_record_action(
    State(state): State<AppState>,
    Json(req): Json<RecordActionRequest>,
) -> Result<Json<EvaluationOutcome>, AppError> {
    let action = NewAction::new(req.action_type, req.action_data);
    let outcome = record_action(state.store.as_ref(), req.user_id, action, Utc::now()).await?;
    Ok(Json(outcome))
}
