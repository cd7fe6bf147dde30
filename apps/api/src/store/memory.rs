//! In-memory `ProgressStore` for unit tests.
//!
//! A single mutex guards all tables, so every batch is atomic and per-user
//! serialization holds trivially.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::action::{Action, NewAction};
use crate::models::badge::{Badge, EarnedBadge};
use crate::models::challenge::{Challenge, UserChallenge, STATUS_APPROVED};
use crate::models::quiz::{Quiz, QuizAttempt};
use crate::models::user::User;
use crate::quiz::scoring::{completion_action, resolve_attempt, GradedAttempt};
use crate::store::{user_not_found, AttemptOutcome, ChallengeSubmission, ProgressStore};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    actions: Vec<Action>,
    badges: Vec<Badge>,
    user_badges: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    quizzes: Vec<Quiz>,
    attempts: HashMap<(Uuid, Uuid), QuizAttempt>,
    challenges: Vec<Challenge>,
    user_challenges: Vec<UserChallenge>,
}

impl Tables {
    fn user_mut(&mut self, user_id: Uuid) -> Result<&mut User, AppError> {
        self.users
            .get_mut(&user_id)
            .ok_or_else(|| user_not_found(user_id))
    }

    fn push_action(&mut self, user_id: Uuid, action: &NewAction, at: DateTime<Utc>) -> Action {
        let row = Action {
            id: Uuid::new_v4(),
            user_id,
            action_type: action.action_type.clone(),
            action_data: action.action_data.clone(),
            created_at: at,
        };
        self.actions.push(row.clone());
        row
    }

    fn earned(&self, user_id: Uuid) -> Vec<EarnedBadge> {
        self.user_badges
            .iter()
            .filter(|(u, _, _)| *u == user_id)
            .filter_map(|(_, badge_id, earned_at)| {
                self.badges
                    .iter()
                    .find(|b| b.id == *badge_id)
                    .map(|badge| EarnedBadge {
                        badge: badge.clone(),
                        earned_at: *earned_at,
                    })
            })
            .collect()
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) -> User {
        self.tables.lock().unwrap().users.insert(user.id, user.clone());
        user
    }

    pub fn add_badge(&self, badge: Badge) -> Badge {
        self.tables.lock().unwrap().badges.push(badge.clone());
        badge
    }

    pub fn add_quiz(&self, quiz: Quiz) -> Quiz {
        self.tables.lock().unwrap().quizzes.push(quiz.clone());
        quiz
    }

    pub fn add_challenge(&self, challenge: Challenge) -> Challenge {
        self.tables.lock().unwrap().challenges.push(challenge.clone());
        challenge
    }

    pub fn action_count(&self, user_id: Uuid) -> usize {
        let tables = self.tables.lock().unwrap();
        tables.actions.iter().filter(|a| a.user_id == user_id).count()
    }

    pub fn attempt(&self, user_id: Uuid, quiz_id: Uuid) -> Option<QuizAttempt> {
        let tables = self.tables.lock().unwrap();
        tables.attempts.get(&(user_id, quiz_id)).cloned()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables.lock().unwrap().users.get(&user_id).cloned())
    }

    async fn leaderboard(&self, country: Option<&str>, limit: i64) -> Result<Vec<User>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut users: Vec<User> = tables
            .users
            .values()
            .filter(|u| country.map_or(true, |c| u.country.as_deref() == Some(c)))
            .cloned()
            .collect();
        users.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));
        users.truncate(limit.max(0) as usize);
        Ok(users)
    }

    async fn append_action(
        &self,
        user_id: Uuid,
        action: &NewAction,
        at: DateTime<Utc>,
    ) -> Result<Action, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user_mut(user_id)?;
        Ok(tables.push_action(user_id, action, at))
    }

    async fn list_actions(&self, user_id: Uuid) -> Result<Vec<Action>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut actions: Vec<Action> = tables
            .actions
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        actions.sort_by_key(|a| a.created_at);
        Ok(actions)
    }

    async fn badge_catalog(&self) -> Result<Vec<Badge>, AppError> {
        Ok(self.tables.lock().unwrap().badges.clone())
    }

    async fn earned_badges(&self, user_id: Uuid) -> Result<Vec<EarnedBadge>, AppError> {
        Ok(self.tables.lock().unwrap().earned(user_id))
    }

    async fn grant_badges(
        &self,
        user_id: Uuid,
        badges: &[Badge],
        at: DateTime<Utc>,
    ) -> Result<Vec<EarnedBadge>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user_mut(user_id)?;

        let mut granted = Vec::new();
        for badge in badges {
            let held = tables
                .user_badges
                .iter()
                .any(|(u, b, _)| *u == user_id && *b == badge.id);
            if held {
                continue;
            }
            tables.user_badges.push((user_id, badge.id, at));
            granted.push(EarnedBadge {
                badge: badge.clone(),
                earned_at: at,
            });
        }

        let bonus: i64 = granted.iter().map(|e| e.badge.points as i64).sum();
        tables.user_mut(user_id)?.points += bonus;
        Ok(granted)
    }

    async fn list_quizzes(&self) -> Result<Vec<Quiz>, AppError> {
        let mut quizzes = self.tables.lock().unwrap().quizzes.clone();
        quizzes.sort_by_key(|q| q.order_index);
        Ok(quizzes)
    }

    async fn find_quiz(&self, quiz_id: Uuid) -> Result<Option<Quiz>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.quizzes.iter().find(|q| q.id == quiz_id).cloned())
    }

    async fn quiz_attempts(&self, user_id: Uuid) -> Result<Vec<QuizAttempt>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .attempts
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn apply_quiz_attempt(
        &self,
        user_id: Uuid,
        quiz_id: Uuid,
        graded: GradedAttempt,
        at: DateTime<Utc>,
    ) -> Result<AttemptOutcome, AppError> {
        let mut tables = self.tables.lock().unwrap();
        tables.user_mut(user_id)?;

        let previous = tables.attempts.get(&(user_id, quiz_id)).cloned();
        let resolution = resolve_attempt(previous.as_ref(), graded);

        if resolution.store {
            tables.attempts.insert(
                (user_id, quiz_id),
                QuizAttempt {
                    user_id,
                    quiz_id,
                    best_score: graded.score,
                    total: graded.total,
                    completed_at: at,
                },
            );
        }
        tables.user_mut(user_id)?.points += resolution.points_awarded;
        tables.push_action(user_id, &completion_action(quiz_id, graded), at);

        Ok(AttemptOutcome::new(
            previous.map(|p| p.best_score),
            graded,
            resolution,
        ))
    }

    async fn list_challenges(&self) -> Result<Vec<Challenge>, AppError> {
        Ok(self.tables.lock().unwrap().challenges.clone())
    }

    async fn find_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.challenges.iter().find(|c| c.id == challenge_id).cloned())
    }

    async fn apply_challenge_submission(
        &self,
        submission: ChallengeSubmission<'_>,
    ) -> Result<UserChallenge, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let user = tables.user_mut(submission.user_id)?;
        user.points += submission.challenge.points as i64;

        let row = UserChallenge {
            id: Uuid::new_v4(),
            user_id: submission.user_id,
            challenge_id: submission.challenge.id,
            status: STATUS_APPROVED.to_string(),
            proof: submission.proof.map(str::to_string),
            completed_at: submission.submitted_at,
        };
        tables.user_challenges.push(row.clone());
        tables.push_action(submission.user_id, &submission.action, submission.submitted_at);
        Ok(row)
    }

    async fn user_challenges(&self, user_id: Uuid) -> Result<Vec<UserChallenge>, AppError> {
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<UserChallenge> = tables
            .user_challenges
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(rows)
    }
}

/// Builders for catalog and user rows used across the test modules.
pub mod fixtures {
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    use crate::models::badge::Badge;
    use crate::models::challenge::Challenge;
    use crate::models::quiz::{Question, Quiz};
    use crate::models::user::User;

    pub fn user(display_name: &str, country: &str) -> User {
        User {
            id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            country: Some(country.to_string()),
            points: 0,
            created_at: Utc::now(),
        }
    }

    pub fn badge(key: &str, criteria_type: &str, criteria_value: i32, points: i32) -> Badge {
        Badge {
            id: Uuid::new_v4(),
            key: key.to_string(),
            name: key.replace('_', " "),
            description: String::new(),
            criteria_type: criteria_type.to_string(),
            criteria_value,
            category: "general".to_string(),
            points,
        }
    }

    /// A quiz whose correct answer to question `i` is option `i % 3`.
    pub fn quiz(title: &str, order_index: i32, question_count: usize) -> Quiz {
        let questions = (0..question_count)
            .map(|i| Question {
                prompt: format!("{title} question {i}"),
                options: vec!["a".into(), "b".into(), "c".into()],
                correct_option_index: i % 3,
            })
            .collect();
        Quiz {
            id: Uuid::new_v4(),
            title: title.to_string(),
            order_index,
            questions: Json(questions),
        }
    }

    /// Answers to [`quiz`] with exactly `correct` right answers.
    pub fn answers(question_count: usize, correct: usize) -> Vec<i64> {
        (0..question_count)
            .map(|i| {
                let right = (i % 3) as i64;
                if i < correct {
                    right
                } else {
                    (right + 1) % 3
                }
            })
            .collect()
    }

    pub fn challenge(title: &str, points: i32, verification_type: &str) -> Challenge {
        Challenge {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            category: "home".to_string(),
            points,
            verification_type: verification_type.to_string(),
            periodicity: "once".to_string(),
            max_per_period: 1,
        }
    }
}
