use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::quiz::QuizView;
use crate::quiz::gate::{compute_gate, GateConfig, QuizStatus};
use crate::quiz::scoring::grade;
use crate::store::{user_not_found, ProgressStore};

#[derive(Debug, Clone, Serialize)]
pub struct QuizSubmissionResult {
    pub quiz_id: Uuid,
    pub score: i32,
    pub total: i32,
    pub points_awarded: i64,
    pub best_score: i32,
    pub first_attempt: bool,
    pub improved: bool,
    /// Always true: there is no failing grade that withholds progression.
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizListing {
    pub quiz: QuizView,
    pub status: QuizStatus,
    pub unlocks_in_ms: Option<i64>,
    pub best_score: Option<i32>,
}

/// Grades a submission and applies the add-if-improved award.
///
/// The gate is informational: a locked quiz can still be submitted.
pub async fn submit_quiz(
    store: &dyn ProgressStore,
    user_id: Uuid,
    quiz_id: Uuid,
    answers: &[i64],
    now: DateTime<Utc>,
) -> Result<QuizSubmissionResult, AppError> {
    let quiz = store
        .find_quiz(quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Quiz {quiz_id} not found")))?;

    let graded = grade(&quiz.questions, answers);
    let outcome = store.apply_quiz_attempt(user_id, quiz_id, graded, now).await?;

    if outcome.points_awarded > 0 || outcome.first_attempt || outcome.improved {
        info!(
            "User {user_id} scored {}/{} on '{}' (+{} points, best {})",
            graded.score, graded.total, quiz.title, outcome.points_awarded, outcome.best_score
        );
    } else {
        debug!(
            "User {user_id} scored {}/{} on '{}', no improvement over {}",
            graded.score, graded.total, quiz.title, outcome.best_score
        );
    }

    Ok(QuizSubmissionResult {
        quiz_id,
        score: graded.score,
        total: graded.total,
        points_awarded: outcome.points_awarded,
        best_score: outcome.best_score,
        first_attempt: outcome.first_attempt,
        improved: outcome.improved,
        completed: true,
    })
}

/// The whole chain with this user's gate state, in order.
pub async fn list_quizzes_for_user(
    store: &dyn ProgressStore,
    user_id: Uuid,
    now: DateTime<Utc>,
    gate: &GateConfig,
) -> Result<Vec<QuizListing>, AppError> {
    if store.find_user(user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }

    let chain = store.list_quizzes().await?;
    let attempts = store.quiz_attempts(user_id).await?;
    let entries = compute_gate(&chain, &attempts, now, gate);

    Ok(chain
        .iter()
        .zip(entries)
        .map(|(quiz, entry)| QuizListing {
            quiz: QuizView::from(quiz),
            status: entry.status,
            unlocks_in_ms: entry.unlocks_in_ms,
            best_score: attempts
                .iter()
                .find(|a| a.quiz_id == quiz.id)
                .map(|a| a.best_score),
        })
        .collect())
}
