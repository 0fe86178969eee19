//! Premium nutrition tracker: meal logging against the stored calorie plan.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{AccessGate, Session};
use crate::calories::CaloriePlan;
use crate::error::{Error, OnboardingError};
use crate::store::Database;

use super::model::{DailySummary, MealEntry, RawMeal};

/// Meal log operations for premium users who finished onboarding.
#[derive(Clone)]
pub struct NutritionTracker {
    db: Arc<dyn Database>,
    gate: AccessGate,
}

impl NutritionTracker {
    pub fn new(db: Arc<dyn Database>, gate: AccessGate) -> Self {
        Self { db, gate }
    }

    /// Premium session plus the plan committed at the end of onboarding.
    async fn authorize(&self, token: Option<&str>) -> Result<(Session, CaloriePlan), Error> {
        let session = self.gate.premium(token).await?;
        let plan = self
            .db
            .get_profile(&session.user_id)
            .await?
            .and_then(|stored| stored.plan);
        match plan {
            Some(plan) => Ok((session, plan)),
            None => Err(OnboardingError::NotStarted {
                user_id: session.user_id,
            }
            .into()),
        }
    }

    /// The day's totals. `date` defaults to today (UTC).
    pub async fn summary(
        &self,
        token: Option<&str>,
        date: Option<NaiveDate>,
    ) -> Result<DailySummary, Error> {
        let (session, plan) = self.authorize(token).await?;
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let meals = self.db.list_meals(&session.user_id, date).await?;
        debug!(user_id = %session.user_id, %date, meals = meals.len(), "Daily summary");
        Ok(DailySummary::build(date, &plan, &meals))
    }

    pub async fn log_meal(&self, token: Option<&str>, raw: RawMeal) -> Result<MealEntry, Error> {
        let (session, _plan) = self.authorize(token).await?;
        let meal = MealEntry::from_raw(&session.user_id, raw, Utc::now().date_naive())?;
        self.db.insert_meal(&meal).await?;
        info!(
            user_id = %session.user_id,
            meal_type = %meal.meal_type,
            calories = meal.calories,
            "Meal logged"
        );
        Ok(meal)
    }

    /// Returns false if the meal does not exist or belongs to someone else.
    pub async fn delete_meal(&self, token: Option<&str>, id: Uuid) -> Result<bool, Error> {
        let (session, _plan) = self.authorize(token).await?;
        let deleted = self.db.delete_meal(&session.user_id, id).await?;
        if deleted {
            info!(user_id = %session.user_id, %id, "Meal deleted");
        }
        Ok(deleted)
    }
}
