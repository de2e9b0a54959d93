//! Catalog, leaderboard, and profile endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sensei_common::constants::{CATEGORIES, DEFAULT_LEADERBOARD_LIMIT, DIFFICULTY_LEVELS};
use sensei_common::{AchievementInfo, LeaderboardEntry, SenseiError, UserStats};

use crate::achievements;
use crate::routes::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct CategoriesResponse {
    categories: &'static [&'static str],
}

pub async fn get_categories() -> Json<CategoriesResponse> {
    Json(CategoriesResponse {
        categories: CATEGORIES,
    })
}

#[derive(Serialize)]
pub struct DifficultyLevelsResponse {
    difficulty_levels: &'static [&'static str],
}

pub async fn get_difficulty_levels() -> Json<DifficultyLevelsResponse> {
    Json(DifficultyLevelsResponse {
        difficulty_levels: DIFFICULTY_LEVELS,
    })
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    limit: Option<u32>,
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    leaderboard: Vec<LeaderboardEntry>,
}

pub async fn get_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT).clamp(1, 100);
    let leaderboard = state.progress.leaderboard(limit).await?;
    Ok(Json(LeaderboardResponse { leaderboard }))
}

#[derive(Deserialize)]
pub struct UserStatsQuery {
    user_id: String,
}

pub async fn get_user_stats(
    State(state): State<AppState>,
    Query(query): Query<UserStatsQuery>,
) -> Result<Json<UserStats>, ApiError> {
    if query.user_id.trim().is_empty() {
        return Err(SenseiError::Validation("user_id is required".into()).into());
    }

    let stats = state
        .progress
        .user_stats(&query.user_id)
        .await?
        .ok_or_else(|| SenseiError::NotFound(format!("no such user: {}", query.user_id)))?;

    Ok(Json(stats))
}

#[derive(Serialize)]
pub struct AchievementsResponse {
    achievements: Vec<AchievementInfo>,
}

/// Full achievement catalog, in display order
pub async fn get_achievements() -> Json<AchievementsResponse> {
    Json(AchievementsResponse {
        achievements: achievements::CATALOG.iter().map(|a| a.info()).collect(),
    })
}
