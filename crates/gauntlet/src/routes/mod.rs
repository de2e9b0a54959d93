//! HTTP route handlers for Gauntlet.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use sensei_common::SenseiError;

use crate::state::AppState;

mod challenge;
mod health;
mod stats;
mod submission;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.storage.request_timeout_secs);

    Router::new()
        // Health & Status
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))

        // Challenge lifecycle
        .route("/get_categories", get(stats::get_categories))
        .route("/get_difficulty_levels", get(stats::get_difficulty_levels))
        .route("/generate_ctf", get(challenge::generate_ctf))
        .route("/get_hint", get(challenge::get_hint))
        .route("/get_solution", get(challenge::get_solution))
        .route("/check_flag", post(challenge::check_flag))

        // Scoring & progress
        .route("/submit_answer", post(submission::submit_answer))
        .route("/get_leaderboard", get(stats::get_leaderboard))
        .route("/get_user_stats", get(stats::get_user_stats))
        .route("/get_achievements", get(stats::get_achievements))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CorsLayer::permissive())

        // Add shared state
        .with_state(state)
}

/// Error reply shape shared by all handlers
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

/// Wrapper converting [`SenseiError`] into an HTTP response
pub struct ApiError(pub SenseiError);

impl From<SenseiError> for ApiError {
    fn from(err: SenseiError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            retryable: self.0.is_retryable(),
        };

        (status, Json(body)).into_response()
    }
}
