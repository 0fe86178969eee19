//! Unified `Database` trait: single async interface for all persistence.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Session;
use crate::calories::CaloriePlan;
use crate::error::DatabaseError;
use crate::photos::PhotoRef;
use crate::profile::ProfileInput;
use crate::tracker::model::MealEntry;

/// Subscription tier of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Paid,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted profile with the plan committed at the end of onboarding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredProfile {
    pub user_id: String,
    pub profile: ProfileInput,
    /// None until onboarding reaches the tracker.
    pub plan: Option<CaloriePlan>,
    pub photo: Option<PhotoRef>,
    pub updated_at: DateTime<Utc>,
}

/// Backend-agnostic database trait covering sessions, plans, profiles and meals.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Sessions ────────────────────────────────────────────────────

    /// Record a session token. Issuing tokens happens outside this service.
    async fn create_session(
        &self,
        token: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;

    /// Look up a session by token, expired or not.
    async fn get_session(&self, token: &str) -> Result<Option<Session>, DatabaseError>;

    // ── Plans ───────────────────────────────────────────────────────

    /// The user's plan tier, or None if the user has no plan row.
    async fn fetch_plan_type(&self, user_id: &str) -> Result<Option<PlanType>, DatabaseError>;

    async fn set_plan_type(&self, user_id: &str, plan: PlanType) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Insert or update the profile fields. An existing calorie plan is kept.
    async fn save_profile(&self, user_id: &str, profile: &ProfileInput)
    -> Result<(), DatabaseError>;

    /// Write the profile together with its calorie plan and photo.
    ///
    /// Atomic: either the whole record is stored or nothing changes.
    async fn save_onboarding(
        &self,
        user_id: &str,
        profile: &ProfileInput,
        plan: &CaloriePlan,
        photo: Option<&PhotoRef>,
    ) -> Result<(), DatabaseError>;

    async fn get_profile(&self, user_id: &str) -> Result<Option<StoredProfile>, DatabaseError>;

    // ── Meals ───────────────────────────────────────────────────────

    async fn insert_meal(&self, meal: &MealEntry) -> Result<(), DatabaseError>;

    /// Meals logged by a user on a date, oldest first.
    async fn list_meals(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> Result<Vec<MealEntry>, DatabaseError>;

    /// Delete one of the user's meals. Returns false if it did not exist.
    async fn delete_meal(&self, user_id: &str, id: Uuid) -> Result<bool, DatabaseError>;
}
