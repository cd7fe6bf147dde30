use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Catalog entry. `criteria_type` picks the evaluation strategy and
/// `criteria_value` is its threshold.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Badge {
    pub id: Uuid,
    pub key: String,
    pub name: String,
    pub description: String,
    pub criteria_type: String,
    pub criteria_value: i32,
    pub category: String,
    /// Bonus added to the ledger when the badge is granted.
    pub points: i32,
}

/// A badge joined with the moment the user earned it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EarnedBadge {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub badge: Badge,
    pub earned_at: DateTime<Utc>,
}
