use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::badges::evaluator::{evaluate, EvaluationOutcome};
use crate::errors::AppError;
use crate::models::action::NewAction;
use crate::store::ProgressStore;

/// Appends one action to the user's log, then runs an evaluation pass.
///
/// A missing or null payload is stored as `{}`. The append and the badge
/// grants are separate batches: a failed evaluation leaves the action logged,
/// and the next pass picks it up.
pub async fn record_action(
    store: &dyn ProgressStore,
    user_id: Uuid,
    mut action: NewAction,
    now: DateTime<Utc>,
) -> Result<EvaluationOutcome, AppError> {
    action.validate().map_err(AppError::Validation)?;
    action.action_type = action.action_type.trim().to_string();
    if action.action_data.is_null() {
        action.action_data = Value::Object(Map::new());
    }

    let logged = store.append_action(user_id, &action, now).await?;
    debug!("User {user_id} logged '{}' ({})", logged.action_type, logged.id);

    evaluate(store, user_id, now).await
}
