use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A player. `points` only ever grows, and only through ledger writes made
/// by the store's transactional batches.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub country: Option<String>,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}
