use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::badges::criteria::Criteria;
use crate::errors::AppError;
use crate::models::action::Action;
use crate::models::badge::{Badge, EarnedBadge};
use crate::store::{user_not_found, ProgressStore};

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub new_badges: Vec<EarnedBadge>,
    pub points_awarded: i64,
}

/// Catalog badges the user does not hold yet whose criteria the history meets.
pub fn pending_badges<'a>(
    catalog: &'a [Badge],
    already_earned: &HashSet<Uuid>,
    history: &[Action],
) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|badge| !already_earned.contains(&badge.id))
        .filter(|badge| Criteria::from_tag(&badge.criteria_type).is_met(badge.criteria_value, history))
        .collect()
}

/// Runs one evaluation pass for a user and persists any newly earned badges.
///
/// Idempotent: held badges are skipped before any strategy runs, and the
/// store's insert ignores rows that appeared concurrently. Badges are never
/// revoked.
pub async fn evaluate(
    store: &dyn ProgressStore,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<EvaluationOutcome, AppError> {
    if store.find_user(user_id).await?.is_none() {
        return Err(user_not_found(user_id));
    }

    let catalog = store.badge_catalog().await?;
    let earned: HashSet<Uuid> = store
        .earned_badges(user_id)
        .await?
        .into_iter()
        .map(|e| e.badge.id)
        .collect();
    let history = store.list_actions(user_id).await?;

    let pending: Vec<Badge> = pending_badges(&catalog, &earned, &history)
        .into_iter()
        .cloned()
        .collect();

    if pending.is_empty() {
        debug!("No new badges for user {user_id} ({} held)", earned.len());
        return Ok(EvaluationOutcome {
            new_badges: vec![],
            points_awarded: 0,
        });
    }

    let new_badges = store.grant_badges(user_id, &pending, now).await?;
    let points_awarded: i64 = new_badges.iter().map(|e| e.badge.points as i64).sum();

    for earned in &new_badges {
        info!("User {user_id} earned badge '{}'", earned.badge.key);
    }

    Ok(EvaluationOutcome {
        new_badges,
        points_awarded,
    })
}
