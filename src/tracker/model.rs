//! Meal log and daily summary models for the nutrition tracker.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calories::{CalorieGoal, CaloriePlan, Kcal};
use crate::error::ValidationError;
use crate::profile::validator::check_bounds;
use crate::profile::{Bounds, Choice, parse_choice};

/// Accepted calories for a single logged meal.
pub const MEAL_KCAL: Bounds = Bounds::new(1.0, 10_000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snacks,
}

impl MealType {
    /// Dashboard order.
    pub const ALL: [MealType; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Snacks];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snacks => "snacks",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Snacks => "Snacks",
        }
    }
}

impl Choice for MealType {
    const FIELD: &'static str = "meal_type";
    const ALLOWED: &'static [&'static str] = &["breakfast", "lunch", "dinner", "snacks"];

    fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for MealType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Meal as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMeal {
    pub meal_type: String,
    pub calories: i64,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// A logged meal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealEntry {
    pub id: Uuid,
    pub user_id: String,
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub calories: Kcal,
    pub logged_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl MealEntry {
    /// Validate a submitted meal. `today` fills in a missing date.
    pub fn from_raw(user_id: &str, raw: RawMeal, today: NaiveDate) -> Result<Self, ValidationError> {
        let meal_type = parse_choice::<MealType>(&raw.meal_type)?;
        let calories = check_bounds("calories", raw.calories as f64, MEAL_KCAL)? as Kcal;
        let description = raw
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            meal_type,
            description,
            calories,
            logged_on: raw.date.unwrap_or(today),
            created_at: Utc::now(),
        })
    }
}

/// Calories logged for one meal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MealTotal {
    pub meal_type: MealType,
    pub label: &'static str,
    pub calories: Kcal,
}

/// One day of the dashboard: what was eaten against the plan's target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub goal: CalorieGoal,
    pub target: Kcal,
    pub consumed: Kcal,
    /// Negative once the target is exceeded.
    pub remaining: i64,
    pub meals: Vec<MealTotal>,
}

impl DailySummary {
    pub fn build(date: NaiveDate, plan: &CaloriePlan, entries: &[MealEntry]) -> Self {
        let meals: Vec<MealTotal> = MealType::ALL
            .iter()
            .map(|meal_type| MealTotal {
                meal_type: *meal_type,
                label: meal_type.label(),
                calories: entries
                    .iter()
                    .filter(|e| e.logged_on == date && e.meal_type == *meal_type)
                    .map(|e| e.calories)
                    .sum(),
            })
            .collect();
        let consumed: Kcal = meals.iter().map(|m| m.calories).sum();

        Self {
            date,
            goal: plan.goal,
            target: plan.target,
            consumed,
            remaining: i64::from(plan.target) - i64::from(consumed),
            meals,
        }
    }
}
