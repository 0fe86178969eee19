//! Integration tests for the onboarding and tracker REST API.
//!
//! Each test spins up an Axum server on a random port backed by an
//! in-memory database and exercises the real HTTP contract with reqwest.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use fitin_planner::api::build_app;
use fitin_planner::config::Redirects;
use fitin_planner::notify::NoticeBuffer;
use fitin_planner::photos::LocalPhotoStore;
use fitin_planner::profile::ValidationMode;
use fitin_planner::store::{Database, LibSqlBackend, PlanType};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

struct TestServer {
    base: String,
    client: Client,
    db: Arc<dyn Database>,
    notices: Arc<NoticeBuffer>,
    _photos: tempfile::TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth("tok")
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth("tok")
            .send()
            .await
            .unwrap();
        let status = resp.status();
        (status, resp.json().await.unwrap())
    }

    async fn event(&self, event: Value) -> (StatusCode, Value) {
        self.post("/api/onboarding/events", event).await
    }
}

/// Start a server with user `u1` signed in as `tok` on the given plan.
async fn start_server(plan: Option<PlanType>, mode: ValidationMode) -> TestServer {
    let db: Arc<dyn Database> = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    db.create_session("tok", "u1", Utc::now() + chrono::Duration::hours(1))
        .await
        .unwrap();
    if let Some(plan) = plan {
        db.set_plan_type("u1", plan).await.unwrap();
    }

    let photos_dir = tempfile::tempdir().unwrap();
    let notices = Arc::new(NoticeBuffer::new());
    let app = build_app(
        Arc::clone(&db),
        Arc::new(LocalPhotoStore::new(photos_dir.path())),
        notices.clone(),
        mode,
        Redirects::default(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        base: format!("http://127.0.0.1:{port}"),
        client: Client::new(),
        db,
        notices,
        _photos: photos_dir,
    }
}

fn reference_calculator() -> Value {
    json!({
        "type": "submit_calculator",
        "height": "175",
        "weight": "70",
        "age": "25",
        "gender": "male",
        "activity_level": "moderate"
    })
}

#[tokio::test]
async fn health_check() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(None, ValidationMode::FailFast).await;
        let resp = server.client.get(server.url("/health")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn full_onboarding_flow_reaches_tracker() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(Some(PlanType::Paid), ValidationMode::FailFast).await;

        let (status, body) = server.post("/api/onboarding/enter", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "welcome");

        let (status, body) = server.event(json!({"type": "acknowledge"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["step"], "calculator");

        let (status, body) = server.event(reference_calculator()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["step"], "goal");
        assert_eq!(body["status"]["calorie_target"], 2594);
        assert_eq!(body["status"]["goal_preview"]["bulk"], 2983);

        let (status, body) = server.event(json!({"type": "select_goal", "goal": "cut"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["step"], "photo");
        assert_eq!(body["status"]["calorie_target"], 2075);

        let resp = server
            .client
            .post(server.url("/api/onboarding/photo"))
            .bearer_auth("tok")
            .body(vec![0xFF, 0xD8, 0xFF, 0xE0])
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let (status, body) = server.event(json!({"type": "submit_photo"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["step"], "community");

        let (status, body) = server.event(json!({"type": "join_community"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["step"], "tracker");
        assert_eq!(body["status"]["completed"], true);
        assert_eq!(body["notice"]["message"], "Welcome to the FitIn community!");

        let stored = server.db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.plan.unwrap().target, 2075);
        assert!(stored.photo.is_some());

        let (status, body) = server.get("/api/onboarding/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "tracker");

        let (status, _) = server.event(json!({"type": "acknowledge"})).await;
        assert_eq!(status, StatusCode::CONFLICT);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn submitting_photo_without_upload_is_rejected() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(Some(PlanType::Paid), ValidationMode::FailFast).await;
        server.post("/api/onboarding/enter", json!({})).await;
        server.event(json!({"type": "acknowledge"})).await;
        server.event(reference_calculator()).await;
        server.event(json!({"type": "select_goal", "goal": "cut"})).await;
        server.notices.drain();

        let (status, body) = server.event(json!({"type": "submit_photo"})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("photo"));

        let (_, body) = server.get("/api/onboarding/status").await;
        assert_eq!(body["step"], "photo");
        assert_eq!(server.notices.drain().len(), 1);

        let resp = server
            .client
            .post(server.url("/api/onboarding/photo"))
            .bearer_auth("tok")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn aggregate_mode_reports_every_field() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(Some(PlanType::Paid), ValidationMode::Aggregate).await;
        server.post("/api/onboarding/enter", json!({})).await;
        server.event(json!({"type": "acknowledge"})).await;

        let (status, body) = server
            .event(json!({
                "type": "submit_calculator",
                "height": "99",
                "weight": "abc",
                "age": "101",
                "gender": "other"
            }))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"].as_array().unwrap().len(), 4);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn access_failures_redirect() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(Some(PlanType::Free), ValidationMode::FailFast).await;

        let resp = server
            .client
            .post(server.url("/api/onboarding/enter"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["redirect"], "/auth");

        let (status, body) = server.post("/api/onboarding/enter", json!({})).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["redirect"], "/nutrition-tracker");

        let (status, _) = server.get("/api/tracker/summary").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn details_form_saves_profile() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(None, ValidationMode::FailFast).await;

        let (status, body) = server
            .post(
                "/api/profile/details",
                json!({"height": "165", "weight": "58", "age": "29.9", "goal": "fat-loss"}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["age"], 29);
        assert_eq!(body["goal"], "cut");
        assert_eq!(body["gender"], "male");

        let stored = server.db.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(stored.profile.height, 165.0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn tracker_logs_meals_against_target() {
    timeout(TEST_TIMEOUT, async {
        let server = start_server(Some(PlanType::Paid), ValidationMode::FailFast).await;

        let (status, _) = server.get("/api/tracker/summary").await;
        assert_eq!(status, StatusCode::CONFLICT);

        server.post("/api/onboarding/enter", json!({})).await;
        server.event(json!({"type": "acknowledge"})).await;
        server.event(reference_calculator()).await;
        server.event(json!({"type": "select_goal", "goal": "bulk"})).await;
        server
            .event(json!({"type": "attach_photo", "photo": "external-ref"}))
            .await;
        server.event(json!({"type": "submit_photo"})).await;
        server.event(json!({"type": "join_community"})).await;

        let (status, meal) = server
            .post(
                "/api/tracker/meals",
                json!({"meal_type": "lunch", "calories": 650, "description": "rice bowl", "date": "2026-04-02"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(meal["meal_type"], "lunch");

        let (status, body) = server.get("/api/tracker/summary?date=2026-04-02").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["target"], 2983);
        assert_eq!(body["consumed"], 650);
        assert_eq!(body["remaining"], 2333);
        assert_eq!(body["meals"][1]["label"], "Lunch");

        let id = meal["id"].as_str().unwrap();
        let resp = server
            .client
            .delete(server.url(&format!("/api/tracker/meals/{id}")))
            .bearer_auth("tok")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = server
            .client
            .delete(server.url(&format!("/api/tracker/meals/{id}")))
            .bearer_auth("tok")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let (status, _) = server
            .post("/api/tracker/meals", json!({"meal_type": "brunch", "calories": 300}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    })
    .await
    .expect("test timed out");
}
