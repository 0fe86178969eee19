//! Calorie target derivation.

pub mod formula;
pub mod goal;

pub use formula::{Kcal, activity_multiplier, bmr, compute_maintenance};
pub use goal::{CalorieGoal, CaloriePlan, GoalPreview, apply_goal};
