//! Nutrition tracker: the dashboard users land on after onboarding.

pub mod model;
pub mod routes;
pub mod service;

pub use model::{DailySummary, MealEntry, MealTotal, MealType, RawMeal};
pub use routes::{TrackerRouteState, tracker_routes};
pub use service::NutritionTracker;
