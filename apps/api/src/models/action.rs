use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Logged after every graded quiz submission. Payload: `{quiz_id, score, total}`.
pub const QUIZ_COMPLETE: &str = "quiz_complete";
pub const FORUM_POST: &str = "forum_post";
pub const FORUM_REPLY: &str = "forum_reply";
pub const CLEAN_FRIDGE: &str = "clean_fridge";
pub const NO_OLD_APPLIANCES: &str = "no_old_appliances";
pub const LED_LIGHTING: &str = "led_lighting";
pub const THERMOSTAT_ADJUST: &str = "thermostat_adjust";
pub const UNPLUG_DEVICES: &str = "unplug_devices";
/// Fallback tag for challenges whose title matches no keyword.
pub const CHALLENGE_COMPLETE: &str = "challenge_complete";

/// Household actions counted by the `action_home_general` criterion.
pub const HOME_ACTION_TYPES: &[&str] = &[
    CLEAN_FRIDGE,
    NO_OLD_APPLIANCES,
    LED_LIGHTING,
    THERMOSTAT_ADJUST,
    UNPLUG_DEVICES,
];

/// An immutable entry in the action log.
///
/// `action_type` is deliberately an open string: unknown badge criteria fall
/// back to matching it verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Action {
    pub id: Uuid,
    pub user_id: Uuid,
    pub action_type: String,
    pub action_data: Value,
    pub created_at: DateTime<Utc>,
}

/// An action that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAction {
    pub action_type: String,
    #[serde(default)]
    pub action_data: Value,
}

impl NewAction {
    pub fn new(action_type: impl Into<String>, action_data: Value) -> Self {
        Self {
            action_type: action_type.into(),
            action_data,
        }
    }

    /// Rejects blank tags and payloads that are neither objects nor null.
    pub fn validate(&self) -> Result<(), String> {
        if self.action_type.trim().is_empty() {
            return Err("action_type must not be empty".to_string());
        }
        if !(self.action_data.is_object() || self.action_data.is_null()) {
            return Err("action_data must be a JSON object".to_string());
        }
        Ok(())
    }
}
