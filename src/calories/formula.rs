//! Maintenance calories via the Mifflin-St Jeor equation.
//!
//! Reference: Mifflin, M.D., et al. (1990). A new predictive equation for
//! resting energy expenditure. American Journal of Clinical Nutrition,
//! 51(2), 241-247.

use crate::profile::{ActivityLevel, Gender, ProfileInput};

/// Kilocalories per day.
pub type Kcal = u32;

const WEIGHT_COEF: f64 = 10.0;
const HEIGHT_COEF: f64 = 6.25;
const AGE_COEF: f64 = 5.0;
const MALE_CONSTANT: f64 = 5.0;
const FEMALE_CONSTANT: f64 = -161.0;

/// Basal metabolic rate in kcal/day, unrounded.
pub fn bmr(weight_kg: f64, height_cm: f64, age_years: u32, gender: Gender) -> f64 {
    let base = WEIGHT_COEF * weight_kg + HEIGHT_COEF * height_cm - AGE_COEF * f64::from(age_years);
    match gender {
        Gender::Male => base + MALE_CONSTANT,
        Gender::Female => base + FEMALE_CONSTANT,
    }
}

/// TDEE multiplier for an activity level.
pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.20,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.90,
    }
}

/// Estimated daily intake that keeps body weight stable.
///
/// Rounds to the nearest integer, ties away from zero. Inputs are expected
/// to be validated; a negative product saturates to zero.
pub fn compute_maintenance(
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    gender: Gender,
    activity_level: ActivityLevel,
) -> Kcal {
    let tdee = bmr(weight_kg, height_cm, age_years, gender) * activity_multiplier(activity_level);
    tdee.round() as Kcal
}

impl ProfileInput {
    /// Maintenance calories for this profile.
    pub fn maintenance_calories(&self) -> Kcal {
        compute_maintenance(
            self.weight,
            self.height,
            self.age,
            self.gender,
            self.activity_level,
        )
    }
}
