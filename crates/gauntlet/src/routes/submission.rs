//! Answer submission: judge the answer, then record the outcome.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use sensei_common::{AchievementInfo, SenseiError};

use crate::generator;
use crate::progress::{self, SubmissionRequest};
use crate::routes::challenge::require_session;
use crate::routes::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubmitRequest {
    user_id: String,
    username: Option<String>,
    challenge_token: String,
    user_answer: String,

    /// Attempt count for this challenge, including this one
    attempts: Option<u32>,

    /// Unix timestamp of when the player started, for the time bonus
    start_time: Option<f64>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    success: bool,
    feedback: String,
    points: i64,
    time_taken: Option<f64>,
    achievements: Vec<AchievementInfo>,
}

/// Judge a submitted answer and, on a correct verdict, credit points and
/// achievements atomically.
pub async fn submit_answer(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    if request.user_id.trim().is_empty() {
        return Err(SenseiError::Validation("user_id is required".into()).into());
    }
    if request.user_answer.trim().is_empty() {
        return Err(SenseiError::Validation("user_answer is required".into()).into());
    }

    let mut redis = state.redis.clone();
    let session = require_session(&state, &mut redis, &request.challenge_token).await?;

    let now = Utc::now();
    let time_taken = request
        .start_time
        .map(|start| (now.timestamp() as f64 - start).max(0.0));

    let verdict = state
        .generator
        .judge(&session.challenge, &request.user_answer)
        .await?;
    let completed = generator::verdict_is_correct(&verdict);

    // The session is authoritative for what was actually played
    let submission = SubmissionRequest {
        user_id: request.user_id.clone(),
        username: request
            .username
            .unwrap_or_else(|| request.user_id.clone()),
        category: session.category.clone(),
        difficulty: session.difficulty,
        challenge: session.challenge.clone(),
        user_answer: request.user_answer.clone(),
        attempts: request.attempts.unwrap_or(1),
        time_taken,
        completed,
    };

    let outcome = progress::process_submission(
        &state.progress,
        &submission,
        now.date_naive(),
        now.timestamp(),
    )
    .await?;

    if completed {
        // Progress is already committed; a stuck session only wastes a key
        if let Err(err) = state.sessions.remove(&mut redis, &request.challenge_token).await {
            tracing::warn!(error = %err, "Failed to remove solved challenge session");
        }
    }

    Ok(Json(SubmitResponse {
        success: outcome.success,
        feedback: verdict,
        points: outcome.points,
        time_taken,
        achievements: outcome.achievements,
    }))
}
