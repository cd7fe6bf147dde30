use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::User;
use crate::store::{user_not_found, ProgressStore};

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub points: i64,
    pub badge_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: Uuid,
    pub display_name: String,
    pub country: Option<String>,
    pub points: i64,
    pub rank: u32,
}

pub async fn user_profile(store: &dyn ProgressStore, user_id: Uuid) -> Result<UserProfile, AppError> {
    let user = store
        .find_user(user_id)
        .await?
        .ok_or_else(|| user_not_found(user_id))?;
    let badge_count = store.earned_badges(user_id).await?.len();

    Ok(UserProfile {
        points: user.points,
        user,
        badge_count,
    })
}

/// Top users by points, optionally within one country.
/// Equal points share a rank; the next rank skips accordingly (1, 1, 3).
pub async fn leaderboard(
    store: &dyn ProgressStore,
    country: Option<&str>,
    limit: i64,
) -> Result<Vec<LeaderboardEntry>, AppError> {
    let country = country.map(str::trim).filter(|c| !c.is_empty());
    let users = store.leaderboard(country, limit).await?;
    Ok(rank(users))
}

fn rank(users: Vec<User>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(users.len());
    for (position, user) in users.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(prev) if prev.points == user.points => prev.rank,
            _ => position as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            user_id: user.id,
            display_name: user.display_name,
            country: user.country,
            points: user.points,
            rank,
        });
    }
    entries
}
