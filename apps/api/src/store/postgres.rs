//! PostgreSQL implementation of [`ProgressStore`].
//!
//! Every mutating batch runs in one transaction that starts by locking the
//! user's `users` row (`SELECT ... FOR UPDATE`). Writes for one user are
//! therefore serialized, the quiz improvement check cannot race, and a
//! failure anywhere rolls the whole batch back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::action::{Action, NewAction};
use crate::models::badge::{Badge, EarnedBadge};
use crate::models::challenge::{Challenge, UserChallenge, STATUS_APPROVED};
use crate::models::quiz::{Quiz, QuizAttempt};
use crate::models::user::User;
use crate::quiz::scoring::{completion_action, resolve_attempt, GradedAttempt};
use crate::store::{user_not_found, AttemptOutcome, ChallengeSubmission, ProgressStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Takes the per-user write lock. Fails with `NotFound` for unknown users.
async fn lock_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> Result<i64, AppError> {
    let points: Option<i64> =
        sqlx::query_scalar("SELECT points FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
    points.ok_or_else(|| user_not_found(user_id))
}

async fn credit_points(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    delta: i64,
) -> Result<(), AppError> {
    if delta == 0 {
        return Ok(());
    }
    sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
        .bind(user_id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn insert_action(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    action: &NewAction,
    at: DateTime<Utc>,
) -> Result<Action, AppError> {
    Ok(sqlx::query_as::<_, Action>(
        r#"
        INSERT INTO actions (id, user_id, action_type, action_data, created_at)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, action_type, action_data, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&action.action_type)
    .bind(&action.action_data)
    .bind(at)
    .fetch_one(&mut **tx)
    .await?)
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn leaderboard(&self, country: Option<&str>, limit: i64) -> Result<Vec<User>, AppError> {
        Ok(sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE $1::text IS NULL OR country = $1
            ORDER BY points DESC, id ASC
            LIMIT $2
            "#,
        )
        .bind(country)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn append_action(
        &self,
        user_id: Uuid,
        action: &NewAction,
        at: DateTime<Utc>,
    ) -> Result<Action, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;
        let row = insert_action(&mut tx, user_id, action, at).await?;
        tx.commit().await?;
        Ok(row)
    }

    async fn list_actions(&self, user_id: Uuid) -> Result<Vec<Action>, AppError> {
        Ok(sqlx::query_as::<_, Action>(
            "SELECT * FROM actions WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn badge_catalog(&self) -> Result<Vec<Badge>, AppError> {
        Ok(
            sqlx::query_as::<_, Badge>("SELECT * FROM badges ORDER BY category, key")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn earned_badges(&self, user_id: Uuid) -> Result<Vec<EarnedBadge>, AppError> {
        Ok(sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT b.id, b.key, b.name, b.description, b.criteria_type,
                   b.criteria_value, b.category, b.points, ub.earned_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY ub.earned_at ASC, b.key ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn grant_badges(
        &self,
        user_id: Uuid,
        badges: &[Badge],
        at: DateTime<Utc>,
    ) -> Result<Vec<EarnedBadge>, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        let mut granted = Vec::new();
        for badge in badges {
            let inserted: Option<DateTime<Utc>> = sqlx::query_scalar(
                r#"
                INSERT INTO user_badges (user_id, badge_id, earned_at)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, badge_id) DO NOTHING
                RETURNING earned_at
                "#,
            )
            .bind(user_id)
            .bind(badge.id)
            .bind(at)
            .fetch_optional(&mut *tx)
            .await?;

            match inserted {
                Some(earned_at) => granted.push(EarnedBadge {
                    badge: badge.clone(),
                    earned_at,
                }),
                None => debug!("Badge '{}' already held by user {user_id}", badge.key),
            }
        }

        let bonus: i64 = granted.iter().map(|e| e.badge.points as i64).sum();
        credit_points(&mut tx, user_id, bonus).await?;
        tx.commit().await?;
        Ok(granted)
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        Ok(
            sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes ORDER BY order_index ASC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError> {
        Ok(sqlx::query_as::<_, Quiz>("SELECT * FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn quiz_attempts(&self, user_id: Uuid) -> Result<Vec<QuizAttempt>, AppError> {
        Ok(
            sqlx::query_as::<_, QuizAttempt>("SELECT * FROM user_quizzes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn apply_quiz_attempt(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        graded: GradedAttempt,
        at: DateTime<Utc>,
    ) -> Result<AttemptOutcome, AppError> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        let previous = sqlx::query_as::<_, QuizAttempt>(
            "SELECT * FROM user_quizzes WHERE user_id = $1 AND quiz_id = $2",
        )
        .bind(user_id)
        .bind(quiz_id)
        .fetch_optional(&mut *tx)
        .await?;

        let resolution = resolve_attempt(previous.as_ref(), graded);

        if resolution.store {
            sqlx::query(
                r#"
                INSERT INTO user_quizzes (user_id, quiz_id, best_score, total, completed_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (user_id, quiz_id) DO UPDATE
                SET best_score = EXCLUDED.best_score,
                    total = EXCLUDED.total,
                    completed_at = EXCLUDED.completed_at
                "#,
            )
            .bind(user_id)
            .bind(quiz_id)
            .bind(graded.score)
            .bind(graded.total)
            .bind(at)
            .execute(&mut *tx)
            .await?;
        }

        credit_points(&mut tx, user_id, resolution.points_awarded).await?;
        insert_action(&mut tx, user_id, &completion_action(quiz_id, graded), at).await?;
        tx.commit().await?;

        Ok(AttemptOutcome::new(
            previous.map(|p| p.best_score),
            graded,
            resolution,
        ))
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError> {
        Ok(
            sqlx::query_as::<_, Challenge>("SELECT * FROM challenges ORDER BY category, title")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, AppError> {
        Ok(
            sqlx::query_as::<_, Challenge>("SELECT * FROM challenges WHERE id = $1")
                .bind(challenge_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn apply_challenge_submission(
        &self,
        submission: ChallengeSubmission<'_>,
    ) -> Result<UserChallenge, AppError> {
        let ChallengeSubmission {
            user_id,
            challenge,
            proof,
            action,
            submitted_at,
        } = submission;

        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        let row = sqlx::query_as::<_, UserChallenge>(
            r#"
            INSERT INTO user_challenges (id, user_id, challenge_id, status, proof, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(challenge.id)
        .bind(STATUS_APPROVED)
        .bind(proof)
        .bind(submitted_at)
        .fetch_one(&mut *tx)
        .await?;

        credit_points(&mut tx, user_id, challenge.points as i64).await?;
        insert_action(&mut tx, user_id, &action, submitted_at).await?;
        tx.commit().await?;

        Ok(row)
    }

    async fn user_challenges(&self, user_id: Uuid) -> Result<Vec<UserChallenge>, AppError> {
        Ok(sqlx::query_as::<_, UserChallenge>(
            "SELECT * FROM user_challenges WHERE user_id = $1 ORDER BY completed_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
