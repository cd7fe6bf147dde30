use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::challenges::classify::derive_action_type;
use crate::errors::AppError;
use crate::models::action::NewAction;
use crate::models::challenge::{Challenge, UserChallenge, VerificationType};
use crate::store::{ChallengeSubmission, ProgressStore};

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub status: String,
    pub points_earned: i64,
    pub submission: UserChallenge,
    pub action_type: String,
}

/// Shape check on the proof. Only `link` challenges are checked: the proof
/// must start with `http`. Blank proofs are treated as absent.
pub fn validate_proof(
    verification: VerificationType,
    proof: Option<&str>,
) -> Result<Option<String>, AppError> {
    let proof = proof.map(str::trim).filter(|p| !p.is_empty());

    if verification == VerificationType::Link && !proof.is_some_and(|p| p.starts_with("http")) {
        return Err(AppError::Validation(
            "Link challenges require a proof URL starting with http".to_string(),
        ));
    }

    Ok(proof.map(str::to_string))
}

/// Accepts a challenge submission: records an approved row, credits the
/// challenge points and logs the derived action, as one batch.
///
/// Badges are not re-evaluated here; the caller triggers that separately.
/// `max_per_period` is not enforced, so repeat submissions each earn points.
pub async fn submit_challenge(
    store: &dyn ProgressStore,
    user_id: Uuid,
    challenge_id: Uuid,
    proof: Option<&str>,
    now: DateTime<Utc>,
) -> Result<SubmissionResult, AppError> {
    let challenge: Challenge = store
        .find_challenge(challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Challenge {challenge_id} not found")))?;

    let verification = challenge
        .verification()
        .map_err(|e| AppError::Internal(anyhow!("Challenge {challenge_id}: {e}")))?;
    let proof = validate_proof(verification, proof)?;

    let action_type = derive_action_type(&challenge.title);
    let action = NewAction::new(
        action_type,
        json!({
            "challenge_id": challenge.id,
            "title": challenge.title,
            "category": challenge.category,
            "points": challenge.points,
        }),
    );

    let submission = store
        .apply_challenge_submission(ChallengeSubmission {
            user_id,
            challenge: &challenge,
            proof: proof.as_deref(),
            action,
            submitted_at: now,
        })
        .await?;

    info!(
        "User {user_id} completed challenge '{}' (+{} points, action '{action_type}')",
        challenge.title, challenge.points
    );

    Ok(SubmissionResult {
        status: submission.status.clone(),
        points_earned: challenge.points as i64,
        submission,
        action_type: action_type.to_string(),
    })
}
