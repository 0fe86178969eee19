//! REST endpoints for the onboarding flow and the details form.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use super::manager::OnboardingManager;
use super::model::OnboardingEvent;
use crate::api::error_response;
use crate::auth::bearer_token;
use crate::config::Redirects;
use crate::profile::RawProfileFields;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub manager: Arc<OnboardingManager>,
    pub redirects: Arc<Redirects>,
}

impl OnboardingRouteState {
    fn respond<T: serde::Serialize>(&self, result: Result<T, crate::error::Error>) -> Response {
        match result {
            Ok(body) => (StatusCode::OK, Json(body)).into_response(),
            Err(e) => error_response(&e, &self.redirects),
        }
    }
}

/// POST /api/onboarding/enter
///
/// Starts a fresh flow at `welcome`.
async fn enter(State(state): State<OnboardingRouteState>, headers: HeaderMap) -> Response {
    let result = state.manager.enter(bearer_token(&headers)).await;
    state.respond(result)
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>, headers: HeaderMap) -> Response {
    let result = state.manager.status(bearer_token(&headers)).await;
    state.respond(result)
}

/// POST /api/onboarding/events
async fn post_event(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    Json(event): Json<OnboardingEvent>,
) -> Response {
    let result = state.manager.dispatch(bearer_token(&headers), event).await;
    state.respond(result)
}

/// POST /api/onboarding/photo
///
/// The raw request body is the image.
async fn upload_photo(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let result = state
        .manager
        .attach_photo(bearer_token(&headers), &body)
        .await;
    state.respond(result)
}

/// DELETE /api/onboarding
async fn abandon(State(state): State<OnboardingRouteState>, headers: HeaderMap) -> Response {
    let result = state
        .manager
        .abandon(bearer_token(&headers))
        .await
        .map(|abandoned| serde_json::json!({ "abandoned": abandoned }));
    state.respond(result)
}

/// POST /api/profile/details
async fn save_details(
    State(state): State<OnboardingRouteState>,
    headers: HeaderMap,
    Json(raw): Json<RawProfileFields>,
) -> Response {
    let result = state
        .manager
        .save_details(bearer_token(&headers), &raw)
        .await;
    state.respond(result)
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding", delete(abandon))
        .route("/api/onboarding/enter", post(enter))
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/events", post(post_event))
        .route("/api/onboarding/photo", post(upload_photo))
        .route("/api/profile/details", post(save_details))
        .with_state(state)
}
