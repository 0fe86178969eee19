//! REST endpoints for the nutrition tracker dashboard.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use super::model::RawMeal;
use super::service::NutritionTracker;
use crate::api::error_response;
use crate::auth::bearer_token;
use crate::config::Redirects;

/// Shared state for tracker routes.
#[derive(Clone)]
pub struct TrackerRouteState {
    pub tracker: NutritionTracker,
    pub redirects: Arc<Redirects>,
}

#[derive(Deserialize)]
struct SummaryQuery {
    date: Option<NaiveDate>,
}

async fn summary(
    State(state): State<TrackerRouteState>,
    headers: HeaderMap,
    Query(query): Query<SummaryQuery>,
) -> Response {
    match state.tracker.summary(bearer_token(&headers), query.date).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => error_response(&e, &state.redirects),
    }
}

async fn log_meal(
    State(state): State<TrackerRouteState>,
    headers: HeaderMap,
    Json(raw): Json<RawMeal>,
) -> Response {
    match state.tracker.log_meal(bearer_token(&headers), raw).await {
        Ok(meal) => (StatusCode::CREATED, Json(meal)).into_response(),
        Err(e) => error_response(&e, &state.redirects),
    }
}

async fn delete_meal(
    State(state): State<TrackerRouteState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let Ok(meal_id) = Uuid::parse_str(&id) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid meal ID"})),
        )
            .into_response();
    };

    match state.tracker.delete_meal(bearer_token(&headers), meal_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(serde_json::json!({"status": "deleted"})),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Meal not found"})),
        )
            .into_response(),
        Err(e) => error_response(&e, &state.redirects),
    }
}

/// Build the tracker REST routes.
pub fn tracker_routes(state: TrackerRouteState) -> Router {
    Router::new()
        .route("/api/tracker/summary", get(summary))
        .route("/api/tracker/meals", post(log_meal))
        .route("/api/tracker/meals/{id}", delete(delete_meal))
        .with_state(state)
}
