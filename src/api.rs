//! HTTP surface: router assembly, health check and error mapping.

use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::auth::{AccessGate, DbSessions};
use crate::config::Redirects;
use crate::error::{AccessError, DatabaseError, Error, OnboardingError, PhotoError};
use crate::notify::Notifier;
use crate::onboarding::{OnboardingManager, OnboardingRouteState, onboarding_routes};
use crate::photos::PhotoStore;
use crate::profile::ValidationMode;
use crate::store::Database;
use crate::tracker::{NutritionTracker, TrackerRouteState, tracker_routes};

/// Wire the services over a database and build the router.
pub fn build_app(
    db: Arc<dyn Database>,
    photos: Arc<dyn PhotoStore>,
    notifier: Arc<dyn Notifier>,
    mode: ValidationMode,
    redirects: Redirects,
) -> Router {
    let sessions = Arc::new(DbSessions::new(Arc::clone(&db)));
    let gate = AccessGate::new(sessions, Arc::clone(&db));
    let manager = Arc::new(OnboardingManager::new(
        Arc::clone(&db),
        gate.clone(),
        photos,
        notifier,
        mode,
    ));
    let tracker = NutritionTracker::new(db, gate);
    router(manager, tracker, redirects)
}

/// Build the full application router.
pub fn router(
    manager: Arc<OnboardingManager>,
    tracker: NutritionTracker,
    redirects: Redirects,
) -> Router {
    let redirects = Arc::new(redirects);

    Router::new()
        .route("/health", get(health))
        .merge(onboarding_routes(OnboardingRouteState {
            manager,
            redirects: Arc::clone(&redirects),
        }))
        .merge(tracker_routes(TrackerRouteState { tracker, redirects }))
        .layer(CorsLayer::permissive())
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "fitin-planner"
    }))
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Map a service error to a JSON response.
///
/// Access failures carry a `redirect`; validation failures list every
/// message under `errors`.
pub fn error_response(err: &Error, redirects: &Redirects) -> Response {
    let message = err.to_string();
    match err {
        Error::Unauthorized(AccessError::NoSession) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": message, "redirect": redirects.sign_in})),
        )
            .into_response(),
        Error::Unauthorized(AccessError::PlanRequired { .. }) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": message, "redirect": redirects.free_tracker})),
        )
            .into_response(),
        Error::Validation(e) => unprocessable(vec![e.to_string()]),
        Error::Onboarding(OnboardingError::Invalid(errors)) => {
            unprocessable(errors.iter().map(ToString::to_string).collect())
        }
        Error::Onboarding(e) => {
            (StatusCode::CONFLICT, Json(json!({"error": e.to_string()}))).into_response()
        }
        Error::Photo(PhotoError::Empty) => unprocessable(vec![message]),
        Error::Database(DatabaseError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, Json(json!({"error": message}))).into_response()
        }
        Error::Database(_) | Error::Photo(_) => {
            error!(error = %err, "Request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

fn unprocessable(errors: Vec<String>) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "error": errors.first().cloned().unwrap_or_default(),
            "errors": errors,
        })),
    )
        .into_response()
}
