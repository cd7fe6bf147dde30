use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option_index: usize,
}

/// A quiz in the globally ordered progression chain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub questions: Json<Vec<Question>>,
}

/// One row per (user, quiz): the best score so far and when it was reached.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizAttempt {
    pub user_id: Uuid,
    pub quiz_id: Uuid,
    pub best_score: i32,
    pub total: i32,
    pub completed_at: DateTime<Utc>,
}

/// Client-facing question without the answer key.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizView {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub questions: Vec<QuestionView>,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title.clone(),
            order_index: quiz.order_index,
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionView {
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}
