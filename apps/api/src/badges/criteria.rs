//! Badge criteria registry.
//!
//! `criteria_type` arrives from the catalog as an open string. It is parsed
//! once into [`Criteria`], a closed set of strategies, each a pure function
//! of the user's action history. Tags outside the registry keep working
//! through [`Criteria::Unknown`], which checks for an action of that exact type.

use std::collections::HashSet;

use crate::models::action::{
    Action, CLEAN_FRIDGE, FORUM_POST, FORUM_REPLY, HOME_ACTION_TYPES, NO_OLD_APPLIANCES,
    QUIZ_COMPLETE,
};

/// Normalized score (out of 10) a quiz completion needs to count as "high".
pub const HIGH_SCORE_THRESHOLD: i64 = 8;

const FORUM_CONTRIBUTION_TYPES: &[&str] = &[FORUM_POST, FORUM_REPLY];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criteria {
    /// Distinct quizzes completed reaches the threshold.
    QuizCount,
    /// Count of forum posts and replies reaches the threshold.
    ForumContributions,
    /// Distinct quizzes with a completion scoring ≥ 8/10 reaches the threshold.
    QuizHighScoreCount,
    /// One action of the given type exists; the threshold is ignored.
    Performed(&'static str),
    /// Distinct household action types performed reaches the threshold.
    HomeGeneral,
    /// Placeholders that are never earned automatically.
    ModuleCompleteAll,
    ManualAward,
    /// Unregistered tag: earned once an action with that exact type exists.
    Unknown(String),
}

impl Criteria {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "quiz_count" => Self::QuizCount,
            "forum_contributions" => Self::ForumContributions,
            "quiz_high_score_count" => Self::QuizHighScoreCount,
            "action_clean_fridge" => Self::Performed(CLEAN_FRIDGE),
            "action_no_old_appliances" => Self::Performed(NO_OLD_APPLIANCES),
            "action_home_general" => Self::HomeGeneral,
            "module_complete_all" => Self::ModuleCompleteAll,
            "manual_award" => Self::ManualAward,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Whether `history` satisfies this criterion at `threshold`.
    ///
    /// Count thresholds below 1 are raised to 1 so that no badge is handed
    /// out for zero activity.
    pub fn is_met(&self, threshold: i32, history: &[Action]) -> bool {
        let threshold = threshold.max(1) as usize;
        match self {
            Self::QuizCount => {
                distinct_quizzes(history.iter().filter(|a| a.action_type == QUIZ_COMPLETE))
                    >= threshold
            }
            Self::ForumContributions => count_of(history, FORUM_CONTRIBUTION_TYPES) >= threshold,
            Self::QuizHighScoreCount => {
                distinct_quizzes(
                    history
                        .iter()
                        .filter(|a| a.action_type == QUIZ_COMPLETE && is_high_score(a)),
                ) >= threshold
            }
            Self::Performed(action_type) => count_of(history, &[*action_type]) >= 1,
            Self::HomeGeneral => {
                let distinct: HashSet<&str> = history
                    .iter()
                    .map(|a| a.action_type.as_str())
                    .filter(|t| HOME_ACTION_TYPES.contains(t))
                    .collect();
                distinct.len() >= threshold
            }
            Self::ModuleCompleteAll | Self::ManualAward => false,
            Self::Unknown(tag) => history.iter().any(|a| a.action_type == *tag),
        }
    }
}

fn count_of(history: &[Action], types: &[&str]) -> usize {
    history
        .iter()
        .filter(|a| types.contains(&a.action_type.as_str()))
        .count()
}

/// Counts quiz completions once per `quiz_id`, so retakes add nothing.
/// Completions recorded without a `quiz_id` each count on their own.
fn distinct_quizzes<'a>(completions: impl Iterator<Item = &'a Action>) -> usize {
    let mut seen = HashSet::new();
    let mut unkeyed = 0;
    for action in completions {
        match action.action_data.get("quiz_id") {
            Some(quiz_id) => {
                seen.insert(quiz_id.to_string());
            }
            None => unkeyed += 1,
        }
    }
    seen.len() + unkeyed
}

/// Reads `score` (and `total`, when present) from a quiz completion payload
/// and checks it against [`HIGH_SCORE_THRESHOLD`] on a 10-point scale.
/// Without a usable `total` the score is taken to be out of 10 already.
fn is_high_score(action: &Action) -> bool {
    let data = &action.action_data;
    let Some(score) = data.get("score").and_then(|v| v.as_f64()) else {
        return false;
    };
    let normalized = match data.get("total").and_then(|v| v.as_f64()) {
        Some(total) if total > 0.0 => score * 10.0 / total,
        _ => score,
    };
    normalized >= HIGH_SCORE_THRESHOLD as f64
}
