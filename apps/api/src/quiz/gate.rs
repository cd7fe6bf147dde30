//! Progression gate: a linear, time-delayed unlock chain over the ordered quizzes.
//!
//! State is derived at read time from the user's attempt rows:
//! - a quiz with an attempt row is `completed`, regardless of timing;
//! - the opening quiz is `unlocked`;
//! - any other quiz is `locked` while its predecessor is not completed;
//! - the first `delay_free_steps` quizzes after the opening one unlock as
//!   soon as the predecessor is completed;
//! - every later quiz unlocks once `unlock_interval` has elapsed since the
//!   most recent completion anywhere in the chain.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::quiz::{Quiz, QuizAttempt};

pub const DEFAULT_UNLOCK_INTERVAL_HOURS: i64 = 96;

#[derive(Debug, Clone, Copy)]
pub struct GateConfig {
    pub unlock_interval: Duration,
    pub delay_free_steps: usize,
}

impl GateConfig {
    pub fn from_hours(hours: i64) -> Self {
        Self {
            unlock_interval: Duration::hours(hours),
            delay_free_steps: 1,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::from_hours(DEFAULT_UNLOCK_INTERVAL_HOURS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Locked,
    Unlocked,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateEntry {
    pub quiz_id: Uuid,
    pub status: QuizStatus,
    /// Milliseconds until the timer releases this quiz. Only set when the
    /// predecessor is done and the interval is still running.
    pub unlocks_in_ms: Option<i64>,
}

/// Computes the gate state of every quiz in `chain` (which must already be
/// ordered by `order_index`) for one user.
pub fn compute_gate(
    chain: &[Quiz],
    attempts: &[QuizAttempt],
    now: DateTime<Utc>,
    config: &GateConfig,
) -> Vec<GateEntry> {
    let completions: HashMap<Uuid, DateTime<Utc>> = attempts
        .iter()
        .map(|a| (a.quiz_id, a.completed_at))
        .collect();

    let latest_completion = chain
        .iter()
        .filter_map(|q| completions.get(&q.id))
        .max()
        .copied();

    chain
        .iter()
        .enumerate()
        .map(|(position, quiz)| {
            let (status, unlocks_in_ms) = if completions.contains_key(&quiz.id) {
                (QuizStatus::Completed, None)
            } else if position == 0 {
                (QuizStatus::Unlocked, None)
            } else if !completions.contains_key(&chain[position - 1].id) {
                (QuizStatus::Locked, None)
            } else if position <= config.delay_free_steps {
                (QuizStatus::Unlocked, None)
            } else {
                timer_status(latest_completion, now, config.unlock_interval)
            };

            GateEntry {
                quiz_id: quiz.id,
                status,
                unlocks_in_ms,
            }
        })
        .collect()
}

fn timer_status(
    latest_completion: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    interval: Duration,
) -> (QuizStatus, Option<i64>) {
    // The predecessor is completed, so a latest completion always exists.
    let Some(latest) = latest_completion else {
        return (QuizStatus::Unlocked, None);
    };
    let ready_at = latest + interval;
    if now >= ready_at {
        (QuizStatus::Unlocked, None)
    } else {
        (QuizStatus::Locked, Some((ready_at - now).num_milliseconds()))
    }
}
