use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationType {
    Auto,
    Photo,
    Link,
    Quiz,
}

impl FromStr for VerificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "photo" => Ok(Self::Photo),
            "link" => Ok(Self::Link),
            "quiz" => Ok(Self::Quiz),
            other => Err(format!("unknown verification type '{other}'")),
        }
    }
}

impl fmt::Display for VerificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Photo => "photo",
            Self::Link => "link",
            Self::Quiz => "quiz",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub points: i32,
    pub verification_type: String,
    pub periodicity: String,
    /// Stored for the client; submissions do not enforce it.
    pub max_per_period: i32,
}

impl Challenge {
    pub fn verification(&self) -> Result<VerificationType, String> {
        self.verification_type.parse()
    }
}

pub const STATUS_APPROVED: &str = "approved";

/// Append-only submission record. Several rows per (user, challenge) are allowed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserChallenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub challenge_id: Uuid,
    pub status: String,
    pub proof: Option<String>,
    pub completed_at: DateTime<Utc>,
}
