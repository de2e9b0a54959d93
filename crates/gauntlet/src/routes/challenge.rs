//! Challenge lifecycle endpoints: generation, hints, solution, and quick
//! flag checks.
//!
//! State lives in Redis sessions keyed by the token returned from
//! `generate_ctf`. Hints and the solution are generated lazily and cached
//! back into the session so repeat requests do not hit the upstream model.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use sensei_common::constants::CATEGORIES;
use sensei_common::{Difficulty, SenseiError};

use crate::generator::{self, ChallengeSession};
use crate::routes::ApiError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct GenerateQuery {
    difficulty: Option<String>,
    category: Option<String>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    challenge_token: String,
    category: String,
    difficulty: String,
    challenge: String,
    expires_in_secs: u64,
}

pub async fn generate_ctf(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let difficulty = Difficulty::from_label(query.difficulty.as_deref().unwrap_or("Beginner"));
    let category = canonical_category(query.category.as_deref().unwrap_or("Miscellaneous"))?;

    let challenge = state
        .generator
        .generate_challenge(difficulty, category)
        .await?;

    let mut redis = state.redis.clone();
    let token = state
        .sessions
        .create(&mut redis, difficulty, category.to_string(), challenge.clone())
        .await?;

    Ok(Json(GenerateResponse {
        challenge_token: token,
        category: category.to_string(),
        difficulty: difficulty.label().to_string(),
        challenge,
        expires_in_secs: state.sessions.ttl_secs(),
    }))
}

#[derive(Deserialize)]
pub struct SessionQuery {
    challenge_token: String,
}

#[derive(Serialize)]
pub struct HintResponse {
    hints: Vec<String>,
}

/// Hints for the current challenge, generated on first request
pub async fn get_hint(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<HintResponse>, ApiError> {
    let mut redis = state.redis.clone();
    let mut session = require_session(&state, &mut redis, &query.challenge_token).await?;

    if session.hints.is_empty() {
        session.hints = state.generator.hints_for(&session.challenge).await?;
        state
            .sessions
            .save(&mut redis, &query.challenge_token, &session)
            .await?;
    }

    Ok(Json(HintResponse {
        hints: session.hints,
    }))
}

#[derive(Serialize)]
pub struct SolutionResponse {
    solution: String,
}

/// Solution walkthrough, generated on first request
pub async fn get_solution(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<SolutionResponse>, ApiError> {
    let mut redis = state.redis.clone();
    let mut session = require_session(&state, &mut redis, &query.challenge_token).await?;

    let solution = match session.solution.take() {
        Some(solution) => solution,
        None => {
            let solution = state.generator.solution_for(&session.challenge).await?;
            session.solution = Some(solution.clone());
            state
                .sessions
                .save(&mut redis, &query.challenge_token, &session)
                .await?;
            solution
        }
    };

    Ok(Json(SolutionResponse { solution }))
}

#[derive(Deserialize)]
pub struct CheckFlagRequest {
    challenge_token: String,
    answer: String,
}

#[derive(Serialize)]
pub struct CheckFlagResponse {
    correct: bool,
    feedback: String,
}

/// Judge an answer without recording progress.
///
/// The session stays open either way so the player can keep trying or
/// follow up with `submit_answer`.
pub async fn check_flag(
    State(state): State<AppState>,
    Json(request): Json<CheckFlagRequest>,
) -> Result<Json<CheckFlagResponse>, ApiError> {
    if request.answer.trim().is_empty() {
        return Err(SenseiError::Validation("answer is required".into()).into());
    }

    let mut redis = state.redis.clone();
    let session = require_session(&state, &mut redis, &request.challenge_token).await?;

    let verdict = state
        .generator
        .judge(&session.challenge, &request.answer)
        .await?;

    Ok(Json(CheckFlagResponse {
        correct: generator::verdict_is_correct(&verdict),
        feedback: verdict,
    }))
}

pub(super) async fn require_session(
    state: &AppState,
    redis: &mut redis::aio::ConnectionManager,
    token: &str,
) -> Result<ChallengeSession, SenseiError> {
    state
        .sessions
        .fetch(redis, token)
        .await?
        .ok_or_else(|| SenseiError::Session("unknown or expired challenge token".into()))
}

fn canonical_category(requested: &str) -> Result<&'static str, SenseiError> {
    CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(requested.trim()))
        .copied()
        .ok_or_else(|| SenseiError::Validation(format!("unknown category: {requested}")))
}
