pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{actions, badges, challenges, ledger, quiz};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Challenges
        .route(
            "/api/v1/challenges",
            get(challenges::handlers::handle_list_challenges),
        )
        .route(
            "/api/v1/challenges/history",
            get(challenges::handlers::handle_challenge_history),
        )
        .route(
            "/api/v1/challenges/:id/submit",
            post(challenges::handlers::handle_submit_challenge),
        )
        // Quizzes
        .route("/api/v1/quizzes", get(quiz::handlers::handle_list_quizzes))
        .route(
            "/api/v1/quizzes/:id/submit",
            post(quiz::handlers::handle_submit_quiz),
        )
        // Actions and badges
        .route(
            "/api/v1/actions",
            post(actions::handlers::handle_record_action),
        )
        .route("/api/v1/badges", get(badges::handlers::handle_user_badges))
        .route(
            "/api/v1/badges/catalog",
            get(badges::handlers::handle_badge_catalog),
        )
        // Ledger
        .route(
            "/api/v1/users/:id",
            get(ledger::handlers::handle_user_profile),
        )
        .route(
            "/api/v1/leaderboard",
            get(ledger::handlers::handle_leaderboard),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::models::action::NewAction;
    use crate::models::user::User;
    use crate::store::memory::{fixtures, MemoryStore};
    use crate::store::ProgressStore;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://unused".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            db_max_connections: 1,
            unlock_interval_hours: 96,
            leaderboard_limit: 20,
        }
    }

    fn app() -> (Router, Arc<MemoryStore>, User) {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user(fixtures::user("mara", "PT"));
        store.add_badge(fixtures::badge("cold_guardian", "action_clean_fridge", 1, 10));
        let state = AppState::new(store.clone(), test_config());
        (build_router(state), store, user)
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app();
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_record_action_returns_new_badges() {
        let (app, _, user) = app();
        let request = post_json(
            "/api/v1/actions",
            json!({"user_id": user.id, "action_type": "clean_fridge"}),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["points_awarded"], 10);
        assert_eq!(body["new_badges"][0]["key"], "cold_guardian");
    }

    #[tokio::test]
    async fn test_unknown_quiz_maps_to_404() {
        let (app, _, user) = app();
        let uri = format!("/api/v1/quizzes/{}/submit", Uuid::new_v4());
        let response = app
            .oneshot(post_json(&uri, json!({"user_id": user.id, "answers": [0]})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_link_challenge_without_url_is_400() {
        let (app, store, user) = app();
        let challenge = store.add_challenge(fixtures::challenge("Share an article", 30, "link"));
        let uri = format!("/api/v1/challenges/{}/submit", challenge.id);
        let response = app
            .oneshot(post_json(&uri, json!({"user_id": user.id, "proof": "not a url"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.action_count(user.id), 0);
    }

    #[tokio::test]
    async fn test_user_badges_runs_evaluation() {
        let (app, store, user) = app();
        let action = NewAction::new("clean_fridge", json!({}));
        store
            .append_action(user.id, &action, chrono::Utc::now())
            .await
            .unwrap();

        let uri = format!("/api/v1/badges?user_id={}", user.id);
        let response = app.oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
        assert_eq!(body[0]["key"], "cold_guardian");
    }
}
