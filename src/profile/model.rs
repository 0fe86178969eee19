//! Biometric profile data models.

use serde::{Deserialize, Serialize};

use crate::calories::CalorieGoal;

/// Biological sex used by the BMR formula.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-reported activity level.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub const ALL: [ActivityLevel; 5] = [
        Self::Sedentary,
        Self::Light,
        Self::Moderate,
        Self::Active,
        Self::VeryActive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very-active",
        }
    }
}

impl std::fmt::Display for ActivityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body-composition goal stored on the profile.
///
/// Wider than [`CalorieGoal`]: the details form offers `muscle-gain`, which
/// plans like a bulk.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ProfileGoal {
    #[default]
    MuscleGain,
    #[serde(alias = "fat-loss")]
    Cut,
    Bulk,
    Maintenance,
}

impl ProfileGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MuscleGain => "muscle-gain",
            Self::Cut => "cut",
            Self::Bulk => "bulk",
            Self::Maintenance => "maintenance",
        }
    }

    /// The calorie adjustment this goal plans with.
    pub fn calorie_goal(&self) -> CalorieGoal {
        match self {
            Self::MuscleGain | Self::Bulk => CalorieGoal::Bulk,
            Self::Cut => CalorieGoal::Cut,
            Self::Maintenance => CalorieGoal::Maintain,
        }
    }
}

impl From<CalorieGoal> for ProfileGoal {
    fn from(goal: CalorieGoal) -> Self {
        match goal {
            CalorieGoal::Cut => Self::Cut,
            CalorieGoal::Maintain => Self::Maintenance,
            CalorieGoal::Bulk => Self::Bulk,
        }
    }
}

impl std::fmt::Display for ProfileGoal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form fields exactly as the user typed them.
///
/// Numbers arrive as strings; enumerated fields are optional and fall back
/// to their defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawProfileFields {
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub weight: String,
    #[serde(default)]
    pub age: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
}

impl RawProfileFields {
    /// Convenience constructor for the three numeric fields.
    pub fn new(height: impl Into<String>, weight: impl Into<String>, age: impl Into<String>) -> Self {
        Self {
            height: height.into(),
            weight: weight.into(),
            age: age.into(),
            ..Default::default()
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_activity_level(mut self, level: impl Into<String>) -> Self {
        self.activity_level = Some(level.into());
        self
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }
}

/// A validated profile. Only the validator builds these from user input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileInput {
    /// Height in centimetres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Age in whole years.
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal: ProfileGoal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_serde_uses_form_literals() {
        let level: ActivityLevel = serde_json::from_str("\"very-active\"").unwrap();
        assert_eq!(level, ActivityLevel::VeryActive);

        let goal: ProfileGoal = serde_json::from_str("\"muscle-gain\"").unwrap();
        assert_eq!(goal, ProfileGoal::MuscleGain);

        let alias: ProfileGoal = serde_json::from_str("\"fat-loss\"").unwrap();
        assert_eq!(alias, ProfileGoal::Cut);

        let gender: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(gender, Gender::Female);
    }

    #[test]
    fn display_matches_serde() {
        for level in ActivityLevel::ALL {
            let json = serde_json::to_string(&level).unwrap();
            assert_eq!(format!("\"{level}\""), json);
        }
    }

    #[test]
    fn profile_goal_maps_to_calorie_goal() {
        assert_eq!(ProfileGoal::MuscleGain.calorie_goal(), CalorieGoal::Bulk);
        assert_eq!(ProfileGoal::Bulk.calorie_goal(), CalorieGoal::Bulk);
        assert_eq!(ProfileGoal::Cut.calorie_goal(), CalorieGoal::Cut);
        assert_eq!(ProfileGoal::Maintenance.calorie_goal(), CalorieGoal::Maintain);

        assert_eq!(ProfileGoal::from(CalorieGoal::Maintain), ProfileGoal::Maintenance);
        assert_eq!(ProfileGoal::from(CalorieGoal::Cut), ProfileGoal::Cut);
    }

    #[test]
    fn raw_fields_accept_missing_optionals() {
        let raw: RawProfileFields =
            serde_json::from_str(r#"{"height":"175","weight":"70","age":"25"}"#).unwrap();
        assert_eq!(raw, RawProfileFields::new("175", "70", "25"));
        assert!(raw.gender.is_none());
        assert!(raw.goal.is_none());
    }
}
