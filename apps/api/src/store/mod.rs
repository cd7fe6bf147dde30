//! Persistence seam for the progression engine.
//!
//! Every engine operation talks to an `Arc<dyn ProgressStore>` carried in
//! `AppState`. Production uses [`PgStore`]; unit tests use the in-memory store.
//!
//! Each mutating method is one all-or-nothing batch, serialized per user, so
//! concurrent submissions for the same user cannot read a stale score or
//! double-award points.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::action::{Action, NewAction};
use crate::models::badge::{Badge, EarnedBadge};
use crate::models::challenge::{Challenge, UserChallenge};
use crate::models::quiz::{Quiz, QuizAttempt};
use crate::models::user::User;
use crate::quiz::scoring::{GradedAttempt, Resolution};

pub use postgres::PgStore;

/// Everything the challenge pipeline writes for one accepted submission.
pub struct ChallengeSubmission<'a> {
    pub user_id: Uuid,
    pub challenge: &'a Challenge,
    pub proof: Option<&'a str>,
    pub action: NewAction,
    pub submitted_at: DateTime<Utc>,
}

/// What the add-if-improved primitive did with a graded attempt.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub points_awarded: i64,
    pub best_score: i32,
    pub first_attempt: bool,
    pub improved: bool,
}

impl AttemptOutcome {
    pub(crate) fn new(
        previous_best: Option<i32>,
        graded: GradedAttempt,
        resolution: Resolution,
    ) -> Self {
        let best_score = match previous_best {
            Some(best) if !resolution.store => best,
            _ => graded.score,
        };
        Self {
            points_awarded: resolution.points_awarded,
            best_score,
            first_attempt: previous_best.is_none(),
            improved: resolution.store && previous_best.is_some(),
        }
    }
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    // ── Users / points ledger ──────────────────────────────────────────────

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    /// Users ordered by points descending, optionally restricted to a country.
    async fn leaderboard(&self, country: Option<&str>, limit: i64) -> Result<Vec<User>, AppError>;

    // ── Action log ─────────────────────────────────────────────────────────

    async fn append_action(
        &self,
        user_id: Uuid,
        action: &NewAction,
        at: DateTime<Utc>,
    ) -> Result<Action, AppError>;

    /// The user's full history, oldest first.
    async fn list_actions(&self, user_id: Uuid) -> Result<Vec<Action>, AppError>;

    // ── Badges ─────────────────────────────────────────────────────────────

    async fn badge_catalog(&self) -> Result<Vec<Badge>, AppError>;

    async fn earned_badges(&self, user_id: Uuid) -> Result<Vec<EarnedBadge>, AppError>;

    /// Inserts the given badges for the user, skipping any already held, and
    /// adds the bonus points of the rows actually inserted. Returns only the
    /// newly inserted badges.
    async fn grant_badges(
        &self,
        user_id: Uuid,
        badges: &[Badge],
        at: DateTime<Utc>,
    ) -> Result<Vec<EarnedBadge>, AppError>;

    // ── Quizzes ────────────────────────────────────────────────────────────

    /// The progression chain ordered by `order_index`.
    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError>;

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError>;

    async fn quiz_attempts(&self, user_id: Uuid) -> Result<Vec<QuizAttempt>, AppError>;

    /// Compares the graded attempt with the stored best under the user's
    /// lock, updates the row and the ledger when it improves, and appends a
    /// `quiz_complete` action in the same batch.
    async fn apply_quiz_attempt(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        graded: GradedAttempt,
        at: DateTime<Utc>,
    ) -> Result<AttemptOutcome, AppError>;

    // ── Challenges ─────────────────────────────────────────────────────────

    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError>;

    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, AppError>;

    /// Appends the submission row, credits the challenge points and logs the
    /// derived action as one batch.
    async fn apply_challenge_submission(
        &self,
        submission: ChallengeSubmission<'_>,
    ) -> Result<UserChallenge, AppError>;

    /// Submission history, newest first.
    async fn user_challenges(&self, user_id: Uuid) -> Result<Vec<UserChallenge>, AppError>;
}

pub(crate) fn user_not_found(user_id: Uuid) -> AppError {
    AppError::NotFound(format!("User {user_id} not found"))
}
