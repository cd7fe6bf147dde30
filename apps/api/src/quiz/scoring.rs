//! Grading and the tiered improvement award.
//!
//! Tier by score fraction `f = score / total`:
//! `f == 1.0 → 100`, `0.5 ≤ f < 1.0 → 50`, `0 < f < 0.5 → 25`, `f == 0 → 0`.
//! A repeat attempt earns only the difference between the new tier and the
//! tier of the stored best.

use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::models::action::{NewAction, QUIZ_COMPLETE};
use crate::models::quiz::{Question, QuizAttempt};

pub const TIER_PERFECT: i64 = 100;
pub const TIER_HALF: i64 = 50;
pub const TIER_PARTIAL: i64 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradedAttempt {
    pub score: i32,
    pub total: i32,
}

/// Counts answers whose index equals the stored correct option.
/// Missing answers (short arrays) and negative indexes never match; extra
/// answers beyond the last question are ignored.
pub fn grade(questions: &[Question], answers: &[i64]) -> GradedAttempt {
    let score = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| {
            answers
                .get(*i)
                .and_then(|a| usize::try_from(*a).ok())
                .is_some_and(|a| a == q.correct_option_index)
        })
        .count();

    GradedAttempt {
        score: score as i32,
        total: questions.len() as i32,
    }
}

/// Point tier for a score, computed in integers so the 0.5 boundary is exact.
pub fn tier(score: i32, total: i32) -> i64 {
    if total <= 0 || score <= 0 {
        return 0;
    }
    if score >= total {
        TIER_PERFECT
    } else if 2 * score >= total {
        TIER_HALF
    } else {
        TIER_PARTIAL
    }
}

/// Decision taken for a graded attempt against the stored best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub points_awarded: i64,
    /// Whether the stored row must be written (insert or overwrite).
    pub store: bool,
}

/// First attempt: store it and award the full tier.
/// Later attempts: only a higher tier is stored, awarding
/// `tier(new) - tier(old)`. Anything else leaves the stored row untouched,
/// so its `completed_at` keeps driving the gate.
pub fn resolve_attempt(previous: Option<&QuizAttempt>, graded: GradedAttempt) -> Resolution {
    let Some(previous) = previous else {
        return Resolution {
            points_awarded: tier(graded.score, graded.total),
            store: true,
        };
    };

    let old_tier = tier(previous.best_score, previous.total);
    let new_tier = tier(graded.score, graded.total);
    if new_tier <= old_tier {
        return Resolution {
            points_awarded: 0,
            store: false,
        };
    }

    Resolution {
        points_awarded: new_tier - old_tier,
        store: true,
    }
}

/// The action logged for every graded submission; badge criteria read it.
pub fn completion_action(quiz_id: Uuid, graded: GradedAttempt) -> NewAction {
    NewAction::new(
        QUIZ_COMPLETE,
        json!({
            "quiz_id": quiz_id,
            "score": graded.score,
            "total": graded.total,
        }),
    )
}
